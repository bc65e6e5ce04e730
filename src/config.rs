//! Configuration system
//!
//! Centralized configuration with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Connectivity probe configuration
    pub probe: ProbeConfig,

    /// Paths configuration
    pub paths: PathsConfig,

    /// Subscription plan (display only, never affects parsing)
    pub plan: Plan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Anthropic API key; empty disables the probe entirely. Not read from
    /// the config file, only from the environment.
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub claude_home: PathBuf,
    pub history_file: PathBuf,
    pub log_directory: PathBuf,
}

/// Recognized Claude subscription plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Max,
    Max200,
}

impl Plan {
    /// Parse a plan selector, defaulting to `Max` for unset or
    /// unrecognized values.
    pub fn from_selector(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "free" => Plan::Free,
            "pro" => Plan::Pro,
            "max" => Plan::Max,
            "max200" => Plan::Max200,
            _ => Plan::Max,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Pro => "Pro",
            Plan::Max => "Max $100",
            Plan::Max200 => "Max $200",
        }
    }

    /// Monthly price in USD.
    pub fn monthly_price(&self) -> f64 {
        match self {
            Plan::Free => 0.0,
            Plan::Pro => 20.0,
            Plan::Max => 100.0,
            Plan::Max200 => 200.0,
        }
    }

    pub fn quota_description(&self) -> &'static str {
        match self {
            Plan::Free => "Limited",
            Plan::Pro => "5x more than Free",
            Plan::Max => "5x more than Pro",
            Plan::Max200 => "20x more than Pro, effectively unlimited",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let claude_home = home.join(".claude");
        Self {
            logging: LoggingConfig {
                level: "ERROR".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            probe: ProbeConfig {
                api_key: String::new(),
                model: "claude-sonnet-4-20250514".to_string(),
                timeout_secs: 30,
            },
            paths: PathsConfig {
                history_file: claude_home.join("usage_history.json"),
                claude_home,
                log_directory: PathBuf::from("logs"),
            },
            plan: Plan::Max,
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file if it exists
        let config_paths = [
            PathBuf::from("claude-tracker.toml"),
            PathBuf::from(".claude-tracker.toml"),
            dirs::config_dir()
                .map(|d| d.join("claude-tracker").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Probe overrides
        if let Ok(val) = env::var("ANTHROPIC_API_KEY") {
            self.probe.api_key = val;
        }
        if let Ok(val) = env::var("CLAUDE_TRACKER_PROBE_MODEL") {
            self.probe.model = val;
        }
        if let Ok(val) = env::var("CLAUDE_TRACKER_PROBE_TIMEOUT_SECS") {
            self.probe.timeout_secs = val
                .parse()
                .context("Invalid CLAUDE_TRACKER_PROBE_TIMEOUT_SECS")?;
        }

        // Plan override
        if let Ok(val) = env::var("CLAUDE_PLAN") {
            self.plan = Plan::from_selector(&val);
        }

        // Path overrides
        if let Ok(val) = env::var("CLAUDE_HOME") {
            self.paths.claude_home = PathBuf::from(&val);
            self.paths.history_file = PathBuf::from(val).join("usage_history.json");
        }
        if let Ok(val) = env::var("CLAUDE_TRACKER_HISTORY_FILE") {
            self.paths.history_file = PathBuf::from(val);
        }
        if let Ok(val) = env::var("CLAUDE_TRACKER_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.probe.timeout_secs == 0 {
            return Err(anyhow::anyhow!("Probe timeout must be greater than 0"));
        }

        if self.probe.model.is_empty() {
            return Err(anyhow::anyhow!("Probe model must not be empty"));
        }

        Ok(())
    }

    /// Whether the connectivity probe can run at all.
    pub fn probe_enabled(&self) -> bool {
        !self.probe.api_key.is_empty()
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().expect("Failed to load configuration"))
}
