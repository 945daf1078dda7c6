//! Cost-aware routing between a local and a remote backend
//!
//! Each query is scored by the [`DifficultyEstimator`], mapped to a
//! [`DifficultyTier`] and token budget, then run through a small state
//! machine:
//!
//! ```text
//! Start ─┬─ easy/medium ─> LocalAttempt ─> Verified ─┬─ passed ───────────────> Done (local | repaired)
//!        │                      ^                    ├─ truncated, no repair ─> LocalAttempt (budget x2)
//!        │                      └────────────────────┘
//!        │                                           ├─ easy ─────────────────> Done (local, note)
//!        │                                           ├─ medium + remote ──────> Remote (escalated)
//!        │                                           └─ medium, no remote ────> Done (degraded, note)
//!        └─ hard ──────────────────────────────────────────────────────────────> Remote (remote)
//! ```
//!
//! The local backend is called at most twice and the remote backend at most
//! once per query. Backend errors propagate unchanged.

use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use serde::Serialize;
use tracing::Instrument;

pub mod difficulty;
pub mod error;
pub mod verifier;

pub use difficulty::{DifficultyBreakdown, DifficultyEstimator, DifficultyTier};
pub use error::RoutingError;
pub use verifier::{ResponseVerifier, VerificationReason, VerificationVerdict};

use crate::agent::pricing::ModelPricing;
use crate::agent::{factory, AgentError, GenerationBackend, GenerationResult};
use crate::config::{FrugalConfig, RoutingConfig};
use crate::logging::{content_preview, generate_request_id};

/// Regenerations allowed after a truncation-only failure
const MAX_REPAIRS: u32 = 1;

/// How a response was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    /// Local answer accepted on the first attempt
    Local,
    /// Local answer accepted after a larger-budget regeneration
    Repaired,
    /// Local answer failed verification, remote answer returned
    Escalated,
    /// Hard query sent straight to the remote backend
    Remote,
}

impl RoutingDecision {
    pub const ALL: [RoutingDecision; 4] = [
        RoutingDecision::Local,
        RoutingDecision::Repaired,
        RoutingDecision::Escalated,
        RoutingDecision::Remote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingDecision::Local => "local",
            RoutingDecision::Repaired => "repaired",
            RoutingDecision::Escalated => "escalated",
            RoutingDecision::Remote => "remote",
        }
    }

    /// Whether the returned text came from the local backend
    pub fn is_local(&self) -> bool {
        matches!(self, RoutingDecision::Local | RoutingDecision::Repaired)
    }
}

impl std::fmt::Display for RoutingDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token budget per difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudgets {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl TokenBudgets {
    pub fn for_tier(&self, tier: DifficultyTier) -> u32 {
        match tier {
            DifficultyTier::Easy => self.easy,
            DifficultyTier::Medium => self.medium,
            DifficultyTier::Hard => self.hard,
        }
    }
}

impl Default for TokenBudgets {
    fn default() -> Self {
        Self::from(&RoutingConfig::default())
    }
}

impl From<&RoutingConfig> for TokenBudgets {
    fn from(config: &RoutingConfig) -> Self {
        Self {
            easy: config.easy_max_tokens,
            medium: config.medium_max_tokens,
            hard: config.hard_max_tokens,
        }
    }
}

/// A generation result enriched with routing metadata
#[derive(Debug, Clone, Serialize)]
pub struct RoutedResponse {
    pub request_id: String,
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Latency of the call whose text is returned
    pub latency_ms: f64,
    pub model: String,
    pub device: String,
    pub difficulty: f64,
    pub tier: DifficultyTier,
    pub routing_decision: RoutingDecision,
    /// Actual spend: remote cost for escalated/remote, 0.0 otherwise
    pub cost_usd: f64,
    /// Reference cost avoided by answering locally
    pub cost_saved_usd: f64,
    /// Verdict on the returned text
    pub verification: VerificationVerdict,
    pub local_attempts: u32,
    pub remote_calls: u32,
    /// Budget of the final call
    pub max_tokens: u32,
    /// Sum of latencies over every backend call made
    pub total_latency_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RoutedResponse {
    pub fn total_tokens(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

enum RouteState {
    Start,
    LocalAttempt {
        budget: u32,
        repairs: u32,
    },
    Verified {
        attempt: GenerationResult,
        verdict: VerificationVerdict,
        budget: u32,
        repairs: u32,
    },
    Remote {
        budget: u32,
        decision: RoutingDecision,
        note: Option<String>,
    },
    Done(Outcome),
}

struct Outcome {
    result: GenerationResult,
    verdict: VerificationVerdict,
    decision: RoutingDecision,
    budget: u32,
    /// Count the reference cost as saved
    saved: bool,
    note: Option<String>,
}

#[derive(Default)]
struct CallLedger {
    local_attempts: u32,
    remote_calls: u32,
    latency_ms: f64,
}

/// Routes queries between a local and an optional remote backend.
///
/// Holds no per-query state; `route` may be called concurrently.
pub struct Router {
    estimator: DifficultyEstimator,
    verifier: ResponseVerifier,
    local: Arc<dyn GenerationBackend>,
    remote: Option<Arc<dyn GenerationBackend>>,
    budgets: TokenBudgets,
    reference_pricing: ModelPricing,
    enable_content_logging: bool,
}

impl Router {
    /// Local-only router with default budgets and a lexical-only verifier.
    pub fn new(local: Arc<dyn GenerationBackend>) -> Self {
        Self {
            estimator: DifficultyEstimator::new(),
            verifier: ResponseVerifier::new(),
            local,
            remote: None,
            budgets: TokenBudgets::default(),
            reference_pricing: ModelPricing::GPT_4O,
            enable_content_logging: false,
        }
    }

    /// Build backends, embedder and verifier from configuration.
    ///
    /// `allow_remote = false` ignores a configured `[remote]` section.
    pub fn from_config(config: &FrugalConfig, allow_remote: bool) -> Result<Self, AgentError> {
        let client = Arc::new(Client::builder().build().map_err(|e| {
            AgentError::Configuration(format!("Failed to build HTTP client: {}", e))
        })?);

        let local = factory::create_local(&config.local, Arc::clone(&client));
        let embedder = config
            .embeddings
            .as_ref()
            .map(|e| factory::create_embedder(e, Arc::clone(&client)))
            .transpose()?;

        let mut router = Router::new(local)
            .with_routing_config(&config.routing)
            .with_verifier(ResponseVerifier::from_config(&config.routing, embedder))
            .with_content_logging(config.logging.enable_content_logging);

        if allow_remote {
            if let Some(remote) = &config.remote {
                router = router.with_remote(factory::create_remote(remote, client)?);
            }
        }

        Ok(router)
    }

    pub fn with_remote(mut self, remote: Arc<dyn GenerationBackend>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_verifier(mut self, verifier: ResponseVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    /// Apply budgets and reference pricing. Thresholds belong to the verifier.
    pub fn with_routing_config(mut self, config: &RoutingConfig) -> Self {
        self.budgets = TokenBudgets::from(config);
        self.reference_pricing = config.reference_pricing;
        self
    }

    pub fn with_content_logging(mut self, enabled: bool) -> Self {
        self.enable_content_logging = enabled;
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn budgets(&self) -> TokenBudgets {
        self.budgets
    }

    pub fn estimator(&self) -> &DifficultyEstimator {
        &self.estimator
    }

    /// Route one query and return the enriched result.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::RemoteUnavailable`] for a hard query without a remote backend
    /// - [`RoutingError::Backend`] when any backend call fails
    pub async fn route(&self, query: &str) -> Result<RoutedResponse, RoutingError> {
        let request_id = generate_request_id();
        let span = tracing::info_span!("route", request_id = %request_id);
        self.run(query, request_id).instrument(span).await
    }

    async fn run(&self, query: &str, request_id: String) -> Result<RoutedResponse, RoutingError> {
        let started = Instant::now();
        let breakdown = self.estimator.breakdown(query);
        let difficulty = breakdown.score;
        let tier = breakdown.tier();

        tracing::debug!(
            difficulty,
            tier = %tier,
            length = breakdown.length,
            keyword = breakdown.keyword,
            structure = breakdown.structure,
            query = content_preview(query, self.enable_content_logging),
            "Estimated query difficulty"
        );

        let mut ledger = CallLedger::default();
        let mut state = RouteState::Start;

        let outcome = loop {
            state = match state {
                RouteState::Start => {
                    let budget = self.budgets.for_tier(tier);
                    match tier {
                        DifficultyTier::Hard => RouteState::Remote {
                            budget,
                            decision: RoutingDecision::Remote,
                            note: None,
                        },
                        DifficultyTier::Easy | DifficultyTier::Medium => {
                            RouteState::LocalAttempt { budget, repairs: 0 }
                        }
                    }
                }

                RouteState::LocalAttempt { budget, repairs } => {
                    let attempt = self.local.generate(query, budget).await?;
                    ledger.local_attempts += 1;
                    ledger.latency_ms += attempt.latency_ms;

                    let verdict = self
                        .verifier
                        .verify(
                            &attempt.text,
                            attempt.output_tokens,
                            budget,
                            Some(query),
                            difficulty,
                        )
                        .await;

                    tracing::debug!(
                        backend = self.local.name(),
                        budget,
                        output_tokens = attempt.output_tokens,
                        passed = verdict.passed,
                        reasons = %verdict.reason_summary(),
                        "Local attempt verified"
                    );

                    RouteState::Verified {
                        attempt,
                        verdict,
                        budget,
                        repairs,
                    }
                }

                RouteState::Verified {
                    attempt,
                    verdict,
                    budget,
                    repairs,
                } => {
                    let local_decision = if repairs > 0 {
                        RoutingDecision::Repaired
                    } else {
                        RoutingDecision::Local
                    };

                    if verdict.passed {
                        RouteState::Done(Outcome {
                            result: attempt,
                            verdict,
                            decision: local_decision,
                            budget,
                            saved: true,
                            note: None,
                        })
                    } else if verdict.is_truncation_only() && repairs < MAX_REPAIRS {
                        let next_budget = budget.saturating_mul(2);
                        metrics::counter!("frugal_local_repairs_total").increment(1);
                        tracing::info!(
                            from = budget,
                            to = next_budget,
                            "Local answer truncated, regenerating with larger budget"
                        );
                        RouteState::LocalAttempt {
                            budget: next_budget,
                            repairs: repairs + 1,
                        }
                    } else if tier == DifficultyTier::Easy {
                        let note = format!("verification failed: {}", verdict.reason_summary());
                        tracing::info!(%note, "Keeping local answer for easy query");
                        RouteState::Done(Outcome {
                            result: attempt,
                            verdict,
                            decision: local_decision,
                            budget,
                            saved: true,
                            note: Some(note),
                        })
                    } else if self.remote.is_some() {
                        tracing::info!(
                            reasons = %verdict.reason_summary(),
                            budget,
                            "Escalating to remote backend"
                        );
                        RouteState::Remote {
                            budget,
                            decision: RoutingDecision::Escalated,
                            note: Some(format!(
                                "escalated after local verification failed: {}",
                                verdict.reason_summary()
                            )),
                        }
                    } else {
                        let note = format!(
                            "verification failed: {}; no remote backend configured",
                            verdict.reason_summary()
                        );
                        tracing::warn!(%note, "Returning degraded local answer");
                        RouteState::Done(Outcome {
                            result: attempt,
                            verdict,
                            decision: local_decision,
                            budget,
                            saved: false,
                            note: Some(note),
                        })
                    }
                }

                RouteState::Remote {
                    budget,
                    decision,
                    note,
                } => {
                    let remote = self
                        .remote
                        .as_ref()
                        .ok_or(RoutingError::RemoteUnavailable { difficulty })?;

                    let result = remote.generate(query, budget).await?;
                    ledger.remote_calls += 1;
                    ledger.latency_ms += result.latency_ms;

                    let verdict = self
                        .verifier
                        .verify(
                            &result.text,
                            result.output_tokens,
                            budget,
                            Some(query),
                            difficulty,
                        )
                        .await;
                    if !verdict.passed {
                        tracing::debug!(
                            backend = remote.name(),
                            reasons = %verdict.reason_summary(),
                            "Remote answer failed verification (diagnostic only)"
                        );
                    }

                    RouteState::Done(Outcome {
                        result,
                        verdict,
                        decision,
                        budget,
                        saved: false,
                        note,
                    })
                }

                RouteState::Done(outcome) => break outcome,
            };
        };

        let response = self.finish(request_id, difficulty, tier, outcome, ledger);

        metrics::counter!("frugal_routes_total", "decision" => response.routing_decision.as_str())
            .increment(1);
        metrics::histogram!("frugal_route_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        tracing::info!(
            decision = %response.routing_decision,
            difficulty,
            model = %response.model,
            local_attempts = response.local_attempts,
            remote_calls = response.remote_calls,
            cost_usd = response.cost_usd,
            cost_saved_usd = response.cost_saved_usd,
            "Query routed"
        );

        Ok(response)
    }

    fn finish(
        &self,
        request_id: String,
        difficulty: f64,
        tier: DifficultyTier,
        outcome: Outcome,
        ledger: CallLedger,
    ) -> RoutedResponse {
        let Outcome {
            result,
            verdict,
            decision,
            budget,
            saved,
            note,
        } = outcome;

        let (cost_usd, cost_saved_usd) = if decision.is_local() {
            let saved_usd = if saved {
                self.reference_pricing
                    .estimate(result.input_tokens, result.output_tokens)
            } else {
                0.0
            };
            (0.0, saved_usd)
        } else {
            (result.cost_usd.unwrap_or(0.0), 0.0)
        };

        RoutedResponse {
            request_id,
            text: result.text,
            input_tokens: result.input_tokens,
            output_tokens: result.output_tokens,
            latency_ms: result.latency_ms,
            model: result.model,
            device: result.device,
            difficulty,
            tier,
            routing_decision: decision,
            cost_usd,
            cost_saved_usd,
            verification: verdict,
            local_attempts: ledger.local_attempts,
            remote_calls: ledger.remote_calls,
            max_tokens: budget,
            total_latency_ms: ledger.latency_ms,
            note,
        }
    }
}
