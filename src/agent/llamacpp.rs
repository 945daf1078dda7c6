//! llama.cpp local backend implementation.
//!
//! Talks to a `llama-server` process (quantized GGUF model, Metal or CPU) over
//! its OpenAI-compatible `/v1/completions` endpoint. Small base models tend to
//! ramble into exercises and code, so the prompt is wrapped in a short
//! instruction and generation is cut at a fixed set of stop sequences.

use super::{AgentError, GenerationBackend, GenerationResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sequences that end generation before the model drifts off-topic.
const STOP_SEQUENCES: &[&str] = &[
    "\n\nExercise",
    "\n\nQuestion",
    "\n\nProblem",
    "\nExercise",
    "\n\n```",
    "\n```",
    "\ndef ",
    "\nclass ",
    "\nimport ",
    "\nfrom ",
    "<|endoftext|>",
];

/// Returned when the model produced nothing but code.
const FALLBACK_ANSWER: &str = "I apologize, but I couldn't generate a proper response. \
     Please try rephrasing your question.";

/// Local llama.cpp backend (the cheap, unmetered model).
pub struct LlamaCppBackend {
    /// Human-readable name
    name: String,
    /// Base URL of llama-server (e.g., "http://localhost:8080")
    base_url: String,
    /// Model identifier reported in results (usually the GGUF file name)
    model: String,
    /// Device label reported in results
    device: String,
    /// Per-request deadline
    timeout: Duration,
    /// Shared HTTP client for connection pooling
    client: Arc<Client>,
}

impl LlamaCppBackend {
    pub fn new(
        name: String,
        base_url: String,
        model: String,
        device: String,
        client: Arc<Client>,
    ) -> Self {
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            device,
            timeout: Duration::from_secs(120),
            client,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    stop: &'static [&'static str],
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
    usage: CompletionUsage,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Deserialize)]
struct CompletionUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Wrap a raw query in the instruction template used for base models.
fn format_prompt(prompt: &str) -> String {
    format!(
        "Answer the following question concisely:\n\n{}\n\nAnswer:",
        prompt
    )
}

fn is_code_line(line: &str) -> bool {
    ["def ", "class ", "import ", "from ", "@", "#"]
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Trim the completion and strip leading code the model emitted instead of prose.
pub(crate) fn clean_completion(raw: &str) -> String {
    let text = raw.trim();

    if !(text.starts_with("def ") || text.starts_with("class ") || text.starts_with("import ")) {
        return text.to_string();
    }

    let lines: Vec<&str> = text.lines().collect();
    let first_prose = lines.iter().position(|line| {
        let stripped = line.trim();
        !stripped.is_empty()
            && !is_code_line(stripped)
            && !line.starts_with("    ")
            && !line.starts_with('\t')
    });

    match first_prose {
        Some(idx) => lines[idx..].join("\n").trim().to_string(),
        None => FALLBACK_ANSWER.to_string(),
    }
}

#[async_trait]
impl GenerationBackend for LlamaCppBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<GenerationResult, AgentError> {
        let url = format!("{}/v1/completions", self.base_url);
        let timeout_ms = self.timeout.as_millis() as u64;

        let request = CompletionRequest {
            model: &self.model,
            prompt: format_prompt(prompt),
            max_tokens,
            temperature: 0.0,
            stop: STOP_SEQUENCES,
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&url)
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

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            AgentError::InvalidResponse(format!("Failed to parse completion response: {}", e))
        })?;

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let raw = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| {
                AgentError::InvalidResponse("Completion response has no choices".to_string())
            })?;

        tracing::debug!(
            backend = %self.name,
            input_tokens = completion.usage.prompt_tokens,
            output_tokens = completion.usage.completion_tokens,
            max_tokens,
            latency_ms,
            "Local completion finished"
        );

        Ok(GenerationResult {
            text: clean_completion(&raw),
            input_tokens: completion.usage.prompt_tokens,
            output_tokens: completion.usage.completion_tokens,
            latency_ms,
            model: self.model.clone(),
            device: self.device.clone(),
            cost_usd: None,
        })
    }
}
