//! Backend configuration

use crate::agent::pricing::ModelPricing;
use serde::{Deserialize, Serialize};

/// Local llama.cpp server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalBackendConfig {
    pub name: String,
    pub url: String,
    pub model: String,
    pub device: String,
    pub timeout_secs: u64,
}

impl Default for LocalBackendConfig {
    fn default() -> Self {
        Self {
            name: "local".to_string(),
            url: "http://localhost:8080".to_string(),
            model: "phi-2.Q4_K_M.gguf".to_string(),
            device: "metal/cpu".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Remote OpenAI-compatible API. Absent section means no remote backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteBackendConfig {
    #[serde(default = "default_remote_name")]
    pub name: String,
    #[serde(default = "default_openai_url")]
    pub url: String,
    #[serde(default = "default_remote_model")]
    pub model: String,
    /// Literal API key. Prefer `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Name of the environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
    /// Overrides the built-in pricing table for this model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<ModelPricing>,
}

impl Default for RemoteBackendConfig {
    fn default() -> Self {
        Self {
            name: default_remote_name(),
            url: default_openai_url(),
            model: default_remote_model(),
            api_key: None,
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            timeout_secs: default_remote_timeout(),
            pricing: None,
        }
    }
}

/// Embedding provider for semantic relevance. Absent section disables it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_openai_url")]
    pub url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
}

fn default_remote_name() -> String {
    "remote".to_string()
}

fn default_openai_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_remote_model() -> String {
    "gpt-4o".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_remote_timeout() -> u64 {
    120
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_section_fills_defaults() {
        let remote: RemoteBackendConfig = toml::from_str(r#"api_key_env = "MY_KEY""#).unwrap();
        assert_eq!(remote.url, "https://api.openai.com");
        assert_eq!(remote.model, "gpt-4o");
        assert_eq!(remote.api_key_env.as_deref(), Some("MY_KEY"));
        assert!(remote.pricing.is_none());
    }

    #[test]
    fn remote_pricing_override_parses() {
        let remote: RemoteBackendConfig = toml::from_str(
            r#"
            model = "my-finetune"
            api_key = "sk-inline"
            pricing = { input_price_per_1k = 0.002, output_price_per_1k = 0.008 }
            "#,
        )
        .unwrap();
        let pricing = remote.pricing.unwrap();
        assert_eq!(pricing.input_price_per_1k, 0.002);
        assert_eq!(pricing.output_price_per_1k, 0.008);
    }

    #[test]
    fn local_defaults() {
        let local = LocalBackendConfig::default();
        assert_eq!(local.url, "http://localhost:8080");
        assert_eq!(local.device, "metal/cpu");
    }
}
