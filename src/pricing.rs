//! Static pricing table: USD per million tokens, keyed by model identifier.
//!
//! Rates snapshot from the published API price list (January 2026). The
//! reserved `default` key backs cost estimation for models the table does
//! not know; looking up an unknown model is not an error.

use std::collections::HashMap;
use std::sync::OnceLock;

pub const DEFAULT_MODEL_KEY: &str = "default";

/// Per-model rates in USD per million tokens.
#[derive(Debug, Clone, Copy)]
pub struct ModelPricing {
    pub input: f64,
    pub output: f64,
    pub cache_read: f64,
    pub cache_write: f64,
}

pub struct PricingTable {
    entries: HashMap<String, ModelPricing>,
}

impl PricingTable {
    /// Build the built-in table. Invariant: always contains the
    /// `default` entry.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        let mut add = |model: &str, input, output, cache_read, cache_write| {
            entries.insert(
                model.to_string(),
                ModelPricing { input, output, cache_read, cache_write },
            );
        };

        add("claude-opus-4-5-20251101", 15.00, 75.00, 1.50, 18.75);
        add("claude-sonnet-4-20250514", 3.00, 15.00, 0.30, 3.75);
        add("claude-3-5-sonnet", 3.00, 15.00, 0.30, 3.75);
        add("claude-3-5-haiku", 0.80, 4.00, 0.08, 1.00);
        add("claude-3-opus", 15.00, 75.00, 1.50, 18.75);
        add(DEFAULT_MODEL_KEY, 3.00, 15.00, 0.30, 3.75);

        Self { entries }
    }

    /// Rates for `model_key`, falling back to the `default` entry.
    pub fn for_model(&self, model_key: &str) -> &ModelPricing {
        self.entries
            .get(model_key)
            .unwrap_or_else(|| &self.entries[DEFAULT_MODEL_KEY])
    }

    pub fn contains(&self, model_key: &str) -> bool {
        self.entries.contains_key(model_key)
    }

    /// Model keys excluding the `default` fallback, sorted for display.
    pub fn model_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .entries
            .keys()
            .map(String::as_str)
            .filter(|k| *k != DEFAULT_MODEL_KEY)
            .collect();
        keys.sort();
        keys
    }

    /// Cost of a single input/output pair under this table, used when
    /// recording the probe's API call. Cache categories are zero there.
    pub fn io_cost(&self, model_key: &str, tokens_in: u64, tokens_out: u64) -> f64 {
        let rates = self.for_model(model_key);
        (tokens_in as f64 / 1_000_000.0) * rates.input
            + (tokens_out as f64 / 1_000_000.0) * rates.output
    }
}

static PRICING: OnceLock<PricingTable> = OnceLock::new();

/// Process-wide pricing table, initialized once.
pub fn pricing() -> &'static PricingTable {
    PRICING.get_or_init(PricingTable::builtin)
}
