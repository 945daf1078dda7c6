//! Supporting types for agent operations.

use serde::{Deserialize, Serialize};

/// Output of a single backend `generate` call.
///
/// Owned by the call that produced it until the router attaches routing
/// metadata and hands it to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated text, already trimmed.
    pub text: String,

    /// Prompt tokens as reported by the backend.
    pub input_tokens: u32,

    /// Completion tokens as reported by the backend.
    pub output_tokens: u32,

    /// Wall-clock latency of the call in milliseconds.
    pub latency_ms: f64,

    /// Model identifier (e.g., "gpt-4o", "phi-2.Q4_K_M.gguf").
    pub model: String,

    /// Where inference ran (e.g., "metal/cpu", "openai_api").
    pub device: String,

    /// Actual USD cost. Present only for metered backends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
}

impl GenerationResult {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GenerationResult {
        GenerationResult {
            text: "Python is a programming language.".to_string(),
            input_tokens: 12,
            output_tokens: 8,
            latency_ms: 42.5,
            model: "phi-2".to_string(),
            device: "metal/cpu".to_string(),
            cost_usd: None,
        }
    }

    #[test]
    fn total_tokens_sums_input_and_output() {
        assert_eq!(sample().total_tokens(), 20);
    }

    #[test]
    fn unmetered_result_omits_cost_field() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("cost_usd").is_none());
        assert_eq!(json["device"], "metal/cpu");
    }
}
