//! Configuration module for the frugal router
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`FRUGAL_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use frugal::config::FrugalConfig;
//!
//! let config = FrugalConfig::default();
//! assert_eq!(config.routing.easy_max_tokens, 128);
//! assert!(config.remote.is_none());
//!
//! let toml = r#"
//! [routing]
//! medium_max_tokens = 300
//! "#;
//! let config: FrugalConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.routing.medium_max_tokens, 300);
//! ```

pub mod backend;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod routing;

pub use backend::{EmbeddingsConfig, LocalBackendConfig, RemoteBackendConfig};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use metrics::MetricsConfig;
pub use routing::RoutingConfig;

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Commented example written by `frugal config init`
pub const EXAMPLE_CONFIG: &str = include_str!("../../frugal.example.toml");

/// Unified configuration for the router and its backends.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FrugalConfig {
    /// Local llama.cpp server
    pub local: LocalBackendConfig,
    /// Remote API. `None` disables escalation and hard-query routing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteBackendConfig>,
    /// Embedding provider for semantic relevance checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<EmbeddingsConfig>,
    pub routing: RoutingConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

impl FrugalConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply `FRUGAL_*` environment variable overrides.
    /// Invalid values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(level) = std::env::var("FRUGAL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("FRUGAL_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }
        if let Ok(url) = std::env::var("FRUGAL_LOCAL_URL") {
            self.local.url = url;
        }
        if let Ok(dir) = std::env::var("FRUGAL_METRICS_DIR") {
            self.metrics.log_dir = dir.into();
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("local.url", &self.local.url)?;
        require_non_empty("local.model", &self.local.model)?;

        if let Some(remote) = &self.remote {
            require_non_empty("remote.url", &remote.url)?;
            require_non_empty("remote.model", &remote.model)?;
            if let Some(pricing) = &remote.pricing {
                if pricing.input_price_per_1k < 0.0 || pricing.output_price_per_1k < 0.0 {
                    return Err(ConfigError::Validation {
                        field: "remote.pricing".to_string(),
                        message: "prices must be non-negative".to_string(),
                    });
                }
            }
        }

        if let Some(embeddings) = &self.embeddings {
            require_non_empty("embeddings.url", &embeddings.url)?;
            require_non_empty("embeddings.model", &embeddings.model)?;
        }

        self.routing.validate()
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: field.to_string(),
            message: "cannot be empty".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_frugal_config_defaults() {
        let config = FrugalConfig::default();
        assert_eq!(config.local.url, "http://localhost:8080");
        assert!(config.remote.is_none());
        assert!(config.embeddings.is_none());
        assert!(config.metrics.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_parse_example_file() {
        let config: FrugalConfig = toml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        let remote = config.remote.expect("example configures a remote");
        assert_eq!(remote.model, "gpt-4o");
        assert_eq!(remote.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
    }

    #[test]
    fn test_config_load_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            temp.path(),
            "[local]\nurl = \"http://gpu-box:8080\"\n\n[remote]\napi_key = \"sk-test\"\n",
        )
        .unwrap();

        let config = FrugalConfig::load(Some(temp.path())).unwrap();
        assert_eq!(config.local.url, "http://gpu-box:8080");
        assert_eq!(config.local.model, "phi-2.Q4_K_M.gguf");
        assert_eq!(
            config.remote.and_then(|r| r.api_key).as_deref(),
            Some("sk-test")
        );
    }

    #[test]
    fn test_config_missing_file_error() {
        let result = FrugalConfig::load(Some(Path::new("/nonexistent/frugal.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_config_invalid_toml_is_parse_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[routing\neasy_max_tokens = ").unwrap();
        let result = FrugalConfig::load(Some(temp.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_env_override_local_url() {
        std::env::set_var("FRUGAL_LOCAL_URL", "http://127.0.0.1:9090");
        let config = FrugalConfig::default().with_env_overrides();
        std::env::remove_var("FRUGAL_LOCAL_URL");

        assert_eq!(config.local.url, "http://127.0.0.1:9090");
    }

    #[test]
    fn test_config_env_override_metrics_dir() {
        std::env::set_var("FRUGAL_METRICS_DIR", "/tmp/frugal-metrics");
        let config = FrugalConfig::default().with_env_overrides();
        std::env::remove_var("FRUGAL_METRICS_DIR");

        assert_eq!(config.metrics.log_dir, Path::new("/tmp/frugal-metrics"));
    }

    #[test]
    fn test_config_env_override_log_format() {
        std::env::set_var("FRUGAL_LOG_FORMAT", "json");
        let config = FrugalConfig::default().with_env_overrides();
        std::env::remove_var("FRUGAL_LOG_FORMAT");

        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_validate_rejects_empty_remote_model() {
        let config = FrugalConfig {
            remote: Some(RemoteBackendConfig {
                model: "  ".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "remote.model"
        ));
    }

    #[test]
    fn test_validate_propagates_routing_errors() {
        let mut config = FrugalConfig::default();
        config.routing.relevance_fail = -0.1;
        assert!(config.validate().is_err());
    }
}
