//! Cost estimation for metered LLM providers.
//!
//! Token-based pricing used in two places: the remote backend reports the
//! actual cost of its calls, and the router prices what a remote call *would*
//! have cost when a local answer was good enough (the saving).
//!
//! ## Pricing Strategy
//!
//! - **Input tokens**: Charged at per-1K-token rate for prompt/context
//! - **Output tokens**: Charged at per-1K-token rate for completion
//! - **Total cost**: `(input_tokens/1000 * input_rate) + (output_tokens/1000 * output_rate)`
//!
//! All amounts are rounded to 6 decimal places (micro-dollars).
//!
//! ## Example
//!
//! ```rust
//! use frugal::agent::pricing::PricingTable;
//!
//! let pricing = PricingTable::new();
//! let cost = pricing.estimate_cost("gpt-4o", 1000, 500);
//! assert_eq!(cost, Some(0.0125)); // $0.005/1K input + $0.015/1K output
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Pricing for a specific model (input and output rates).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Input (prompt) cost in USD per 1K tokens.
    pub input_price_per_1k: f64,

    /// Output (completion) cost in USD per 1K tokens.
    pub output_price_per_1k: f64,
}

impl ModelPricing {
    /// GPT-4o rates, the reference used for savings when nothing else is configured.
    pub const GPT_4O: ModelPricing = ModelPricing {
        input_price_per_1k: 0.005,
        output_price_per_1k: 0.015,
    };

    /// Cost of a call with the given token counts, rounded to 6 decimals.
    pub fn estimate(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let input_cost = (input_tokens as f64 / 1000.0) * self.input_price_per_1k;
        let output_cost = (output_tokens as f64 / 1000.0) * self.output_price_per_1k;
        round_usd(input_cost + output_cost)
    }
}

impl Default for ModelPricing {
    fn default() -> Self {
        Self::GPT_4O
    }
}

/// Round a USD amount to 6 decimal places.
pub fn round_usd(amount: f64) -> f64 {
    (amount * 1_000_000.0).round() / 1_000_000.0
}

/// Pricing table for the supported remote models.
///
/// Pricing data is hardcoded and must be updated manually when the
/// provider changes its rates (https://openai.com/pricing).
#[derive(Debug, Clone)]
pub struct PricingTable {
    prices: Arc<HashMap<String, ModelPricing>>,
}

impl PricingTable {
    pub fn new() -> Self {
        let mut prices = HashMap::new();

        prices.insert("gpt-4o".to_string(), ModelPricing::GPT_4O);
        prices.insert(
            "gpt-4o-mini".to_string(),
            ModelPricing {
                input_price_per_1k: 0.00015,
                output_price_per_1k: 0.0006,
            },
        );
        prices.insert(
            "gpt-4-turbo".to_string(),
            ModelPricing {
                input_price_per_1k: 0.01,
                output_price_per_1k: 0.03,
            },
        );
        prices.insert(
            "gpt-4".to_string(),
            ModelPricing {
                input_price_per_1k: 0.03,
                output_price_per_1k: 0.06,
            },
        );
        prices.insert(
            "gpt-3.5-turbo".to_string(),
            ModelPricing {
                input_price_per_1k: 0.0005,
                output_price_per_1k: 0.0015,
            },
        );

        Self {
            prices: Arc::new(prices),
        }
    }

    /// Estimate cost for a model based on token counts.
    ///
    /// Returns `None` if the model is not in the pricing table.
    pub fn estimate_cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> Option<f64> {
        self.prices
            .get(model)
            .map(|pricing| pricing.estimate(input_tokens, output_tokens))
    }

    pub fn has_pricing(&self, model: &str) -> bool {
        self.prices.contains_key(model)
    }

    pub fn get_pricing(&self, model: &str) -> Option<ModelPricing> {
        self.prices.get(model).copied()
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpt4o_pricing() {
        let pricing = PricingTable::new();

        // (1000/1000)*0.005 + (500/1000)*0.015 = 0.005 + 0.0075
        assert_eq!(pricing.estimate_cost("gpt-4o", 1000, 500), Some(0.0125));
    }

    #[test]
    fn test_gpt35_pricing() {
        let pricing = PricingTable::new();

        // (2000/1000)*0.0005 + (1000/1000)*0.0015 = 0.001 + 0.0015
        assert_eq!(pricing.estimate_cost("gpt-3.5-turbo", 2000, 1000), Some(0.0025));
    }

    #[test]
    fn test_unknown_model() {
        let pricing = PricingTable::new();
        assert_eq!(pricing.estimate_cost("unknown-model", 1000, 500), None);
        assert!(!pricing.has_pricing("unknown-model"));
    }

    #[test]
    fn test_estimate_rounds_to_six_decimals() {
        // 7 input tokens: 0.000035, 3 output tokens: 0.000045
        assert_eq!(ModelPricing::GPT_4O.estimate(7, 3), 0.00008);
        // 1 input token at gpt-4o-mini is 1.5e-7, below a micro-dollar
        let mini = PricingTable::new().get_pricing("gpt-4o-mini").unwrap();
        assert_eq!(mini.estimate(1, 0), 0.0);
    }

    #[test]
    fn test_zero_tokens_cost_nothing() {
        assert_eq!(ModelPricing::default().estimate(0, 0), 0.0);
    }
}
