//! Cost derivation: tokens in, dollars out. Pure functions, no I/O.

use crate::models::{CostBreakdown, TokenBundle};
use crate::pricing::PricingTable;

const TOKENS_PER_MILLION: f64 = 1_000_000.0;

pub struct CostCalculator;

impl CostCalculator {
    /// Estimate the USD cost of a token bundle under `model_key`'s rates.
    ///
    /// An unknown model key uses the table's `default` entry; every
    /// component and the total are non-negative for non-negative inputs.
    pub fn cost_for_tokens(
        bundle: &TokenBundle,
        model_key: &str,
        table: &PricingTable,
    ) -> CostBreakdown {
        let rates = table.for_model(model_key);

        let input_cost = (bundle.input_tokens as f64 / TOKENS_PER_MILLION) * rates.input;
        let output_cost = (bundle.output_tokens as f64 / TOKENS_PER_MILLION) * rates.output;
        let cache_read_cost =
            (bundle.cache_read_tokens as f64 / TOKENS_PER_MILLION) * rates.cache_read;
        let cache_write_cost =
            (bundle.cache_write_tokens as f64 / TOKENS_PER_MILLION) * rates.cache_write;

        CostBreakdown {
            input_cost,
            output_cost,
            cache_read_cost,
            cache_write_cost,
            total_cost: input_cost + output_cost + cache_read_cost + cache_write_cost,
            model_key: model_key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingTable;

    #[test]
    fn test_cost_per_million_components() {
        let table = PricingTable::builtin();
        let bundle = TokenBundle {
            input_tokens: 1_000_000,
            output_tokens: 1_000_000,
            cache_read_tokens: 0,
            cache_write_tokens: 0,
        };
        let cost = CostCalculator::cost_for_tokens(&bundle, "claude-sonnet-4-20250514", &table);
        assert_eq!(cost.input_cost, 3.00);
        assert_eq!(cost.output_cost, 15.00);
        assert_eq!(cost.cache_read_cost, 0.0);
        assert_eq!(cost.cache_write_cost, 0.0);
        assert_eq!(cost.total_cost, 18.00);
    }

    #[test]
    fn test_total_is_sum_of_components() {
        let table = PricingTable::builtin();
        let bundle = TokenBundle {
            input_tokens: 123_456,
            output_tokens: 654_321,
            cache_read_tokens: 42_000,
            cache_write_tokens: 17_500,
        };
        let cost = CostCalculator::cost_for_tokens(&bundle, "claude-3-5-haiku", &table);
        let sum = cost.input_cost + cost.output_cost + cost.cache_read_cost + cost.cache_write_cost;
        assert!((cost.total_cost - sum).abs() < f64::EPSILON);
        assert!(cost.total_cost >= 0.0);
    }

    #[test]
    fn test_unknown_model_uses_default_rates() {
        let table = PricingTable::builtin();
        let bundle = TokenBundle {
            input_tokens: 2_000_000,
            ..Default::default()
        };
        let cost = CostCalculator::cost_for_tokens(&bundle, "no-such-model", &table);
        // Default entry prices input at $3.00 per million.
        assert_eq!(cost.input_cost, 6.00);
        assert_eq!(cost.model_key, "no-such-model");
    }

    #[test]
    fn test_zero_bundle_costs_nothing() {
        let table = PricingTable::builtin();
        let cost =
            CostCalculator::cost_for_tokens(&TokenBundle::default(), "claude-3-opus", &table);
        assert_eq!(cost.total_cost, 0.0);
    }
}
