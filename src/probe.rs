//! API Connectivity Probe
//!
//! Issues a single short request against the Messages API to verify that the
//! configured credential works, then prices the call and hands it to the
//! history store. Every failure mode (transport error, timeout, non-200
//! status) is a recoverable `Err` - the caller reports it and the rest of
//! the run proceeds.

use crate::config::ProbeConfig;
use crate::pricing::pricing;
use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROBE_PROMPT: &str = "Reply 'ok' in one word.";
const PROBE_MAX_TOKENS: u32 = 50;

/// Outcome of a successful probe call.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub model: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub cost: f64,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: ResponseUsage,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

pub struct ApiProbe {
    client: reqwest::Client,
    config: ProbeConfig,
}

impl ApiProbe {
    pub fn new(config: ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Run the probe once. Requires a configured API key; callers should
    /// check [`Config::probe_enabled`](crate::config::Config::probe_enabled)
    /// first.
    pub async fn run(&self) -> Result<ProbeResult> {
        if self.config.api_key.is_empty() {
            return Err(anyhow!("API key not configured"));
        }

        let body = json!({
            "model": self.config.model,
            "max_tokens": PROBE_MAX_TOKENS,
            "messages": [{"role": "user", "content": PROBE_PROMPT}],
        });

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(anyhow!("HTTP {}: {}", status.as_u16(), details));
        }

        let parsed: MessagesResponse = response.json().await?;
        let model = parsed.model.unwrap_or_else(|| self.config.model.clone());
        let tokens_in = parsed.usage.input_tokens;
        let tokens_out = parsed.usage.output_tokens;
        let cost = pricing().io_cost(&model, tokens_in, tokens_out);

        debug!(%model, tokens_in, tokens_out, cost, "probe call succeeded");

        Ok(ProbeResult {
            model,
            tokens_in,
            tokens_out,
            cost,
        })
    }
}
