//! Routing configuration

use serde::{Deserialize, Serialize};

use crate::agent::pricing::ModelPricing;
use crate::config::error::ConfigError;

/// Token budgets per difficulty tier and verifier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub easy_max_tokens: u32,
    pub medium_max_tokens: u32,
    pub hard_max_tokens: u32,
    /// Cosine similarity below which an answer is off-topic
    pub relevance_fail: f64,
    /// Cosine similarity below which a hard-query answer is noted as suspicious
    pub relevance_warn: f64,
    /// Rates used to price the remote call a local answer avoided
    pub reference_pricing: ModelPricing,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            easy_max_tokens: 128,
            medium_max_tokens: 256,
            hard_max_tokens: 512,
            relevance_fail: 0.60,
            relevance_warn: 0.70,
            reference_pricing: ModelPricing::GPT_4O,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.easy_max_tokens == 0 {
            return Err(ConfigError::Validation {
                field: "routing.easy_max_tokens".to_string(),
                message: "token budget must be non-zero".to_string(),
            });
        }
        if self.medium_max_tokens < self.easy_max_tokens {
            return Err(ConfigError::Validation {
                field: "routing.medium_max_tokens".to_string(),
                message: "must be at least routing.easy_max_tokens".to_string(),
            });
        }
        if self.hard_max_tokens < self.medium_max_tokens {
            return Err(ConfigError::Validation {
                field: "routing.hard_max_tokens".to_string(),
                message: "must be at least routing.medium_max_tokens".to_string(),
            });
        }

        for (field, value) in [
            ("routing.relevance_fail", self.relevance_fail),
            ("routing.relevance_warn", self.relevance_warn),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation {
                    field: field.to_string(),
                    message: format!("must be within [0, 1], got {}", value),
                });
            }
        }
        if self.relevance_fail > self.relevance_warn {
            return Err(ConfigError::Validation {
                field: "routing.relevance_fail".to_string(),
                message: "must not exceed routing.relevance_warn".to_string(),
            });
        }

        let pricing = &self.reference_pricing;
        if pricing.input_price_per_1k < 0.0 || pricing.output_price_per_1k < 0.0 {
            return Err(ConfigError::Validation {
                field: "routing.reference_pricing".to_string(),
                message: "prices must be non-negative".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing_config_defaults() {
        let config = RoutingConfig::default();
        assert_eq!(config.easy_max_tokens, 128);
        assert_eq!(config.medium_max_tokens, 256);
        assert_eq!(config.hard_max_tokens, 512);
        assert_eq!(config.relevance_fail, 0.60);
        assert_eq!(config.relevance_warn, 0.70);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_budget() {
        let config = RoutingConfig {
            easy_max_tokens: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "routing.easy_max_tokens"
        ));
    }

    #[test]
    fn rejects_budgets_shrinking_with_difficulty() {
        let config = RoutingConfig {
            hard_max_tokens: 64,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "routing.hard_max_tokens"
        ));
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let config = RoutingConfig {
            relevance_warn: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_fail_above_warn() {
        let config = RoutingConfig {
            relevance_fail: 0.8,
            relevance_warn: 0.7,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "routing.relevance_fail"
        ));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: RoutingConfig = toml::from_str("easy_max_tokens = 96").unwrap();
        assert_eq!(config.easy_max_tokens, 96);
        assert_eq!(config.medium_max_tokens, 256);
        assert_eq!(config.reference_pricing, ModelPricing::GPT_4O);
    }
}
