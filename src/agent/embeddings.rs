//! Embedding providers for semantic relevance checks.
//!
//! Embeddings are optional. The verifier holds an
//! `Option<Arc<dyn EmbeddingProvider>>` and treats both a missing provider and
//! a failing `embed` call as "unavailable", falling back to lexical checks.

use super::AgentError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Converts text into a dense vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + 'static {
    /// Generate the embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError>;

    /// Embedding model name, for logging.
    fn model(&self) -> &str;
}

/// OpenAI `/v1/embeddings` provider (defaults to `text-embedding-3-small`).
pub struct OpenAIEmbedder {
    base_url: String,
    model: String,
    api_key: String,
    client: Arc<Client>,
}

impl OpenAIEmbedder {
    pub fn new(base_url: String, model: String, api_key: String, client: Arc<Client>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            client,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingObject>,
}

#[derive(Deserialize)]
struct EmbeddingObject {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AgentError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| AgentError::from_send(e, 30_000))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgentError::Upstream {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AgentError::InvalidResponse(format!("Failed to parse embedding response: {}", e))
        })?;

        body.data
            .into_iter()
            .next()
            .map(|obj| obj.embedding)
            .ok_or_else(|| AgentError::InvalidResponse("Embedding response has no data".to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
