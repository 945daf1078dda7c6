//! Shared test utilities for frugal integration tests.
//!
//! Provides scripted generation backends, fixed-vector embedders and
//! config builders pointed at mock HTTP servers.

#![allow(dead_code)]

use async_trait::async_trait;
use frugal::agent::{AgentError, EmbeddingProvider, GenerationBackend, GenerationResult};
use frugal::config::{EmbeddingsConfig, FrugalConfig, RemoteBackendConfig};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// =============================================================================
// Well-Known Test Queries
// =============================================================================

/// Scores 0.075 (easy)
pub const EASY_QUERY: &str = "What is Python?";

/// Scores 0.345 (medium)
pub const MEDIUM_QUERY: &str = "Explain the difference between Python and Java";

/// Scores 0.6 (hard, keyword floor)
pub const HARD_QUERY: &str = "Prove that the halting problem is undecidable";

/// Input tokens reported by every scripted reply
pub const SCRIPTED_INPUT_TOKENS: u32 = 1000;

/// Latency reported by every scripted reply
pub const SCRIPTED_LATENCY_MS: f64 = 10.0;

// =============================================================================
// Scripted Generation Backend
// =============================================================================

/// Backend that replays queued `(text, output_tokens)` replies in order.
///
/// Records every budget it was called with. An exhausted script is an
/// `InvalidResponse` error so an unexpected extra call fails loudly.
pub struct ScriptedBackend {
    name: String,
    replies: Mutex<VecDeque<(String, u32)>>,
    budgets: Mutex<Vec<u32>>,
    cost_usd: Option<f64>,
}

impl ScriptedBackend {
    pub fn local(replies: &[(&str, u32)]) -> Arc<Self> {
        Arc::new(Self::build("scripted-local", replies, None))
    }

    pub fn remote(replies: &[(&str, u32)], cost_usd: f64) -> Arc<Self> {
        Arc::new(Self::build("scripted-remote", replies, Some(cost_usd)))
    }

    fn build(name: &str, replies: &[(&str, u32)], cost_usd: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            replies: Mutex::new(
                replies
                    .iter()
                    .map(|(text, tokens)| (text.to_string(), *tokens))
                    .collect(),
            ),
            budgets: Mutex::new(Vec::new()),
            cost_usd,
        }
    }

    pub fn calls(&self) -> usize {
        self.budgets.lock().unwrap().len()
    }

    pub fn budgets(&self) -> Vec<u32> {
        self.budgets.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(
        &self,
        _prompt: &str,
        max_tokens: u32,
    ) -> Result<GenerationResult, AgentError> {
        self.budgets.lock().unwrap().push(max_tokens);
        let (text, output_tokens) = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::InvalidResponse("script exhausted".to_string()))?;

        Ok(GenerationResult {
            text,
            input_tokens: SCRIPTED_INPUT_TOKENS,
            output_tokens,
            latency_ms: SCRIPTED_LATENCY_MS,
            model: self.name.clone(),
            device: "test".to_string(),
            cost_usd: self.cost_usd,
        })
    }
}

/// Backend that always fails with the given upstream status.
pub struct FailingBackend {
    pub status: u16,
}

#[async_trait]
impl GenerationBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _max_tokens: u32,
    ) -> Result<GenerationResult, AgentError> {
        Err(AgentError::Upstream {
            status: self.status,
            message: "backend down".to_string(),
        })
    }
}

// =============================================================================
// Embedders
// =============================================================================

/// Embeds the first text it sees as `first` and every later text as `rest`.
///
/// The verifier embeds the query before the answer, so `first` is the query
/// vector and `rest` the answer vector.
pub struct TwoVectorEmbedder {
    first: Vec<f32>,
    rest: Vec<f32>,
    calls: AtomicUsize,
}

impl TwoVectorEmbedder {
    pub fn new(first: Vec<f32>, rest: Vec<f32>) -> Arc<Self> {
        Arc::new(Self {
            first,
            rest,
            calls: AtomicUsize::new(0),
        })
    }

    /// Query and answer vectors with cosine similarity `similarity`.
    pub fn with_similarity(similarity: f32) -> Arc<Self> {
        let orthogonal = (1.0 - similarity * similarity).max(0.0).sqrt();
        Self::new(vec![1.0, 0.0], vec![similarity, orthogonal])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for TwoVectorEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, AgentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(if n % 2 == 0 {
            self.first.clone()
        } else {
            self.rest.clone()
        })
    }

    fn model(&self) -> &str {
        "two-vector"
    }
}

// =============================================================================
// Config Builders
// =============================================================================

/// Config whose local backend points at `local_url`, with no remote.
pub fn local_only_config(local_url: &str) -> FrugalConfig {
    let mut config = FrugalConfig::default();
    config.local.url = local_url.to_string();
    config.remote = None;
    config.embeddings = None;
    config
}

/// Config with local and remote backends on mock servers, keyed inline.
pub fn config_with_remote(local_url: &str, remote_url: &str) -> FrugalConfig {
    let mut config = local_only_config(local_url);
    config.remote = Some(RemoteBackendConfig {
        url: remote_url.to_string(),
        api_key: Some("sk-test".to_string()),
        api_key_env: None,
        ..Default::default()
    });
    config
}

/// Embeddings section on a mock server, keyed inline.
pub fn embeddings_config(url: &str) -> EmbeddingsConfig {
    EmbeddingsConfig {
        url: url.to_string(),
        model: "text-embedding-3-small".to_string(),
        api_key: Some("sk-test".to_string()),
        api_key_env: None,
    }
}
