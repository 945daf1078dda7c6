//! Backend agent abstraction layer.
//!
//! This module provides the `GenerationBackend` and `EmbeddingProvider` traits
//! that hide backend-specific HTTP protocols from the router, plus the concrete
//! llama.cpp (local) and OpenAI (remote) implementations.

use async_trait::async_trait;

pub mod embeddings;
pub mod error;
pub mod factory;
pub mod llamacpp;
pub mod openai;
pub mod pricing;
pub mod types;

// Re-export key types for convenience
pub use embeddings::{EmbeddingProvider, OpenAIEmbedder};
pub use error::AgentError;
pub use llamacpp::LlamaCppBackend;
pub use openai::OpenAIBackend;
pub use types::GenerationResult;

/// Unified interface for text-generation backends.
///
/// The router only ever needs one operation from a backend: turn a prompt into
/// text under a token budget. Local and remote models implement this same
/// trait and are held as `Arc<dyn GenerationBackend>`.
///
/// # Object Safety
///
/// This trait is object-safe. All async methods use `async_trait` for
/// compatibility with trait objects.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: one backend instance is shared by
/// every concurrent `route()` call.
#[async_trait]
pub trait GenerationBackend: Send + Sync + 'static {
    /// Human-readable name for logging (e.g., "llama.cpp on localhost").
    fn name(&self) -> &str;

    /// Generate a completion for `prompt` producing at most `max_tokens` tokens.
    ///
    /// # Returns
    ///
    /// - `Ok(GenerationResult)` on success
    /// - `Err(AgentError::Upstream)` if backend returned error (4xx, 5xx)
    /// - `Err(AgentError::Network)` if connection failed
    /// - `Err(AgentError::Timeout)` if request exceeded deadline
    /// - `Err(AgentError::InvalidResponse)` if response doesn't match the expected format
    async fn generate(&self, prompt: &str, max_tokens: u32)
        -> Result<GenerationResult, AgentError>;
}
