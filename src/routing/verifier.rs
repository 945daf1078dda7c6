//! Response verification.
//!
//! Decides whether a generated answer is acceptable or should be repaired
//! (regenerated with a larger budget) or escalated. Three checks run
//! independently:
//!
//! 1. **Truncation**: the budget was exhausted and the text stops on a
//!    dangling word. List-style queries are exempt.
//! 2. **Uncertainty**: hedging phrases anywhere in the answer.
//! 3. **Relevance** (difficulty >= 0.3 only): lexical keyword coverage, then
//!    embedding similarity when an [`EmbeddingProvider`] is available.
//!
//! Truncation and uncertainty are fatal. Low relevance alone never fails a
//! medium or hard query.

use crate::agent::EmbeddingProvider;
use crate::config::RoutingConfig;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

use super::difficulty::{EASY_CEILING, HARD_THRESHOLD};

const UNCERTAINTY_PHRASES: &[&str] = &[
    "i'm not sure",
    "i am not sure",
    "cannot determine",
    "not enough information",
    "unclear",
    "it depends",
    "might be",
    "may be",
];

const DANGLING_ENDINGS: &[&str] = &[
    " by",
    " which",
    " that",
    " because",
    " such as",
    " including",
    " like",
    " for example",
    " and",
    " or",
    " but",
    " with",
    " from",
    " to",
    " in",
    " on",
    " at",
    " of",
    " the",
    " a",
    " an",
    " is",
    " are",
    " was",
    " were",
    " has",
    " have",
    " can",
    " could",
    " should",
    " would",
    " will",
    " may",
    " might",
];

const LIST_PREFIXES: &[&str] = &["list", "name", "give", "mention"];

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "for", "with", "from", "that", "this", "what", "how", "why",
];

/// Characters of the answer that are embedded for the similarity check.
const EMBED_PREFIX_CHARS: usize = 500;

/// Why a verdict flagged an answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerificationReason {
    Truncated,
    Uncertain,
    /// Answer mentions too few of the query's keywords
    LowCoverage,
    /// Similarity below the fail threshold (medium queries)
    LowSimilarity { similarity: f64 },
    /// Similarity below the warn threshold on a hard query; never fails
    AdvisorySimilarity { similarity: f64 },
}

impl fmt::Display for VerificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationReason::Truncated => f.write_str("truncated"),
            VerificationReason::Uncertain => f.write_str("uncertainty"),
            VerificationReason::LowCoverage => f.write_str("low_relevance (basic coverage failed)"),
            VerificationReason::LowSimilarity { similarity } => {
                write!(f, "low_relevance (similarity: {:.3})", similarity)
            }
            VerificationReason::AdvisorySimilarity { similarity } => {
                write!(f, "low_relevance (similarity: {:.3}, advisory)", similarity)
            }
        }
    }
}

impl Serialize for VerificationReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of verifying one answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationVerdict {
    pub passed: bool,
    /// Distinct reasons, in check order
    pub reasons: Vec<VerificationReason>,
    pub truncated: bool,
    pub uncertain: bool,
    pub low_relevance: bool,
    /// Query/answer cosine similarity, when it was computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl VerificationVerdict {
    /// A failure that a larger token budget can fix.
    pub fn is_truncation_only(&self) -> bool {
        self.truncated && !self.uncertain
    }

    /// Reasons joined for display, e.g. `"truncated, uncertainty"`.
    pub fn reason_summary(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Verifies answers, optionally using embeddings for semantic relevance.
#[derive(Clone)]
pub struct ResponseVerifier {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    relevance_fail: f64,
    relevance_warn: f64,
}

impl Default for ResponseVerifier {
    fn default() -> Self {
        let routing = RoutingConfig::default();
        Self {
            embedder: None,
            relevance_fail: routing.relevance_fail,
            relevance_warn: routing.relevance_warn,
        }
    }
}

impl ResponseVerifier {
    /// Verifier without embeddings: relevance is lexical only.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(
        config: &RoutingConfig,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Self {
        Self {
            embedder,
            relevance_fail: config.relevance_fail,
            relevance_warn: config.relevance_warn,
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn has_embeddings(&self) -> bool {
        self.embedder.is_some()
    }

    /// Verify `answer`, generated with `output_tokens` out of a `max_tokens` budget.
    ///
    /// Relevance is only checked when `query` is given and `difficulty >= 0.3`.
    pub async fn verify(
        &self,
        answer: &str,
        output_tokens: u32,
        max_tokens: u32,
        query: Option<&str>,
        difficulty: f64,
    ) -> VerificationVerdict {
        let mut reasons = Vec::new();

        let list_query = query.map(is_list_query).unwrap_or(false);
        let truncated =
            output_tokens >= max_tokens && is_semantically_incomplete(answer) && !list_query;
        if truncated {
            reasons.push(VerificationReason::Truncated);
        }

        let uncertain = has_uncertainty(answer);
        if uncertain {
            reasons.push(VerificationReason::Uncertain);
        }

        let mut low_relevance = false;
        let mut similarity = None;
        if let Some(query) = query.filter(|_| difficulty >= EASY_CEILING) {
            if !basic_coverage(query, answer) {
                low_relevance = true;
                reasons.push(VerificationReason::LowCoverage);
            } else if let Some(sim) = self.similarity(query, answer).await {
                similarity = Some(sim);
                if difficulty < HARD_THRESHOLD {
                    if sim < self.relevance_fail {
                        low_relevance = true;
                        reasons.push(VerificationReason::LowSimilarity { similarity: sim });
                    }
                } else if sim < self.relevance_warn {
                    reasons.push(VerificationReason::AdvisorySimilarity { similarity: sim });
                }
            }
        }

        let passed = if truncated || uncertain {
            false
        } else if low_relevance {
            difficulty >= EASY_CEILING
        } else {
            true
        };

        VerificationVerdict {
            passed,
            reasons,
            truncated,
            uncertain,
            low_relevance,
            similarity,
        }
    }

    /// Cosine similarity of query and answer prefix, or `None` when
    /// embeddings are unavailable or fail.
    async fn similarity(&self, query: &str, answer: &str) -> Option<f64> {
        let embedder = self.embedder.as_ref()?;

        let prefix: String = answer.chars().take(EMBED_PREFIX_CHARS).collect();
        let query_vec = match embedder.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(model = embedder.model(), error = %e, "Query embedding failed, skipping similarity check");
                return None;
            }
        };
        let answer_vec = match embedder.embed(&prefix).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(model = embedder.model(), error = %e, "Answer embedding failed, skipping similarity check");
                return None;
            }
        };

        let sim = cosine_similarity(&query_vec, &answer_vec);
        if sim.is_none() {
            tracing::warn!(
                query_dims = query_vec.len(),
                answer_dims = answer_vec.len(),
                "Embedding dimensions differ, skipping similarity check"
            );
        }
        sim
    }
}

/// Cosine similarity; 0.0 when either vector has zero norm, `None` on length mismatch.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        return None;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

fn is_list_query(query: &str) -> bool {
    let lower = query.trim().to_lowercase();
    LIST_PREFIXES.iter().any(|p| lower.starts_with(p))
}

fn is_semantically_incomplete(answer: &str) -> bool {
    let text = answer.trim().to_lowercase();
    if text.ends_with(['.', '!', '?']) {
        return false;
    }
    DANGLING_ENDINGS.iter().any(|ending| text.ends_with(ending))
}

fn has_uncertainty(answer: &str) -> bool {
    let lower = answer.to_lowercase();
    UNCERTAINTY_PHRASES.iter().any(|p| lower.contains(p))
}

fn coverage_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > 3 && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Cheap lexical check: the answer must mention at least
/// `max(1, keywords / 3)` of the query's keywords.
fn basic_coverage(query: &str, answer: &str) -> bool {
    let keywords = coverage_keywords(query);
    if keywords.is_empty() {
        return true;
    }

    let answer = answer.to_lowercase();
    let hits = keywords.iter().filter(|k| answer.contains(k.as_str())).count();
    hits >= (keywords.len() / 3).max(1)
}
