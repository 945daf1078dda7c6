//! frugal - cost-aware routing between a local and a remote LLM
//!
//! Each query is scored for difficulty without calling any model. Easy and
//! medium queries go to a local llama.cpp model first; the answer is verified
//! and either accepted, regenerated with a larger token budget, or escalated
//! to a remote OpenAI-compatible model. Hard queries go to the remote model
//! directly.
//!
//! ```no_run
//! use frugal::config::FrugalConfig;
//! use frugal::routing::Router;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FrugalConfig::load(Some("frugal.toml".as_ref()))?;
//! let router = Router::from_config(&config, true)?;
//! let response = router.route("What is Python?").await?;
//! println!("{} ({})", response.text, response.routing_decision);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod routing;
