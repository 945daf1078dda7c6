//! CLI module for frugal
//!
//! # Commands
//!
//! - `estimate` - Score a query's difficulty without calling any backend
//! - `route` - Route one query and print the answer with routing metadata
//! - `batch` - Route every line of a file (or stdin) and print a summary
//! - `repl` - Interactive prompt
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! frugal estimate "Explain the difference between Python and Java"
//! frugal route "What is Python?" --json
//! frugal batch queries.txt --prometheus metrics.prom
//! ```

pub mod batch;
pub mod completions;
pub mod config;
pub mod estimate;
pub mod output;
pub mod repl;
pub mod route;
pub mod session;

pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// frugal - cost-aware LLM router
#[derive(Parser, Debug)]
#[command(
    name = "frugal",
    version,
    about = "Routes each query to a cheap local model or an expensive remote model"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate query difficulty (no backend calls)
    Estimate(EstimateArgs),
    /// Route a single query
    Route(RouteArgs),
    /// Route one query per line from a file or stdin
    Batch(BatchArgs),
    /// Interactive routing prompt
    Repl(ReplArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that talks to backends
#[derive(Args, Debug, Clone)]
pub struct RouterArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "frugal.toml")]
    pub config: PathBuf,

    /// Ignore the [remote] section (local-only routing)
    #[arg(long)]
    pub no_remote: bool,

    /// Override local llama.cpp server URL
    #[arg(long)]
    pub local_url: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct EstimateArgs {
    /// Query to score
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Configuration file for token budgets (defaults apply if missing)
    #[arg(short, long, default_value = "frugal.toml")]
    pub config: PathBuf,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// Query to route
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub router: RouterArgs,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// File with one query per line, or "-" for stdin
    pub input: PathBuf,

    /// Write Prometheus exposition of routing metrics to this path
    #[arg(long)]
    pub prometheus: Option<PathBuf>,

    /// Do not write CSV/JSON metrics files
    #[arg(long)]
    pub no_metrics: bool,

    /// Output the summary as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub router: RouterArgs,
}

#[derive(Args, Debug)]
pub struct ReplArgs {
    /// Do not write CSV/JSON metrics files
    #[arg(long)]
    pub no_metrics: bool,

    #[command(flatten)]
    pub router: RouterArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "frugal.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
