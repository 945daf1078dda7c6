//! Builds backend trait objects from configuration.

use super::{
    pricing::{ModelPricing, PricingTable},
    AgentError, EmbeddingProvider, GenerationBackend, LlamaCppBackend, OpenAIBackend,
    OpenAIEmbedder,
};
use crate::config::{EmbeddingsConfig, LocalBackendConfig, RemoteBackendConfig};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Resolve an API key: a literal `api_key` wins, otherwise `api_key_env` is read once.
///
/// `section` names the config section for error messages.
pub fn resolve_api_key(
    section: &str,
    api_key: Option<&str>,
    api_key_env: Option<&str>,
) -> Result<String, AgentError> {
    if let Some(key) = api_key {
        return Ok(key.to_string());
    }

    match api_key_env {
        Some(env_var) => std::env::var(env_var).map_err(|e| {
            AgentError::Configuration(format!(
                "[{}] failed to read API key from env var '{}': {}",
                section, env_var, e
            ))
        }),
        None => Err(AgentError::Configuration(format!(
            "[{}] requires 'api_key' or 'api_key_env'",
            section
        ))),
    }
}

/// Create the local llama.cpp backend.
pub fn create_local(
    config: &LocalBackendConfig,
    client: Arc<Client>,
) -> Arc<dyn GenerationBackend> {
    Arc::new(
        LlamaCppBackend::new(
            config.name.clone(),
            config.url.clone(),
            config.model.clone(),
            config.device.clone(),
            client,
        )
        .with_timeout(Duration::from_secs(config.timeout_secs)),
    )
}

/// Create the remote backend.
///
/// Pricing comes from the configured override, then the built-in table,
/// then gpt-4o rates.
pub fn create_remote(
    config: &RemoteBackendConfig,
    client: Arc<Client>,
) -> Result<Arc<dyn GenerationBackend>, AgentError> {
    let api_key = resolve_api_key(
        "remote",
        config.api_key.as_deref(),
        config.api_key_env.as_deref(),
    )?;

    let pricing = config
        .pricing
        .or_else(|| PricingTable::new().get_pricing(&config.model))
        .unwrap_or(ModelPricing::GPT_4O);

    Ok(Arc::new(
        OpenAIBackend::new(
            config.name.clone(),
            config.url.clone(),
            config.model.clone(),
            api_key,
            pricing,
            client,
        )
        .with_timeout(Duration::from_secs(config.timeout_secs)),
    ))
}

pub fn create_embedder(
    config: &EmbeddingsConfig,
    client: Arc<Client>,
) -> Result<Arc<dyn EmbeddingProvider>, AgentError> {
    let api_key = resolve_api_key(
        "embeddings",
        config.api_key.as_deref(),
        config.api_key_env.as_deref(),
    )?;

    Ok(Arc::new(OpenAIEmbedder::new(
        config.url.clone(),
        config.model.clone(),
        api_key,
        client,
    )))
}
