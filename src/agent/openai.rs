//! OpenAI remote backend implementation.

use super::pricing::ModelPricing;
use super::{AgentError, GenerationBackend, GenerationResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// OpenAI chat-completions backend (the expensive, metered model).
///
/// - Generation via POST /v1/chat/completions with Bearer token
/// - Deterministic sampling (`temperature = 0`)
/// - Reports actual USD cost from the returned token usage
pub struct OpenAIBackend {
    /// Human-readable name
    name: String,
    /// Base URL (e.g., "https://api.openai.com")
    base_url: String,
    /// Model to request (e.g., "gpt-4o")
    model: String,
    /// API key for Bearer authentication
    api_key: String,
    /// Rates used to price each call
    pricing: ModelPricing,
    /// Per-request deadline
    timeout: Duration,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

impl OpenAIBackend {
    pub fn new(
        name: String,
        base_url: String,
        model: String,
        api_key: String,
        pricing: ModelPricing,
        client: Arc<Client>,
    ) -> Self {
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
            pricing,
            timeout: Duration::from_secs(120),
            client,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[async_trait]
impl GenerationBackend for OpenAIBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<GenerationResult, AgentError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let timeout_ms = self.timeout.as_millis() as u64;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: 0.0,
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AgentError::from_send(e, timeout_ms))?;

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

        let completion: ChatResponse = response.json().await.map_err(|e| {
            AgentError::InvalidResponse(format!("Failed to parse completion response: {}", e))
        })?;

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                AgentError::InvalidResponse("Completion response has no choices".to_string())
            })?;

        let usage = completion.usage.ok_or_else(|| {
            AgentError::InvalidResponse("Completion response has no usage".to_string())
        })?;

        let cost = self
            .pricing
            .estimate(usage.prompt_tokens, usage.completion_tokens);

        tracing::debug!(
            backend = %self.name,
            model = %self.model,
            input_tokens = usage.prompt_tokens,
            output_tokens = usage.completion_tokens,
            cost_usd = cost,
            latency_ms,
            "Remote completion finished"
        );

        Ok(GenerationResult {
            text: text.trim().to_string(),
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            latency_ms,
            model: self.model.clone(),
            device: "openai_api".to_string(),
            cost_usd: Some(cost),
        })
    }
}
