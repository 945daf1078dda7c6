//! Shared setup for commands that route queries

use crate::cli::RouterArgs;
use crate::config::{FrugalConfig, LogFormat};
use crate::metrics::{MetricsSummary, RoutingLog};
use crate::routing::{RoutedResponse, Router, RoutingError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
///
/// A missing config file falls back to defaults; a malformed one is an error.
pub fn load_config_with_overrides(
    args: &RouterArgs,
) -> Result<FrugalConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        FrugalConfig::load(Some(&args.config))?
    } else {
        FrugalConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref url) = args.local_url {
        config.local.url = url.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Initialize tracing based on configuration. Logs go to stderr.
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    if config.enable_content_logging {
        eprintln!("WARNING: Content logging is enabled. Query text will be logged.");
    }

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

/// Load config, start tracing and build the router.
pub fn bootstrap(args: &RouterArgs) -> Result<(FrugalConfig, Router), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(args)?;
    init_tracing(&config.logging)?;

    let router = Router::from_config(&config, !args.no_remote)?;
    if !router.has_remote() {
        tracing::info!("No remote backend: hard queries will fail, medium queries may degrade");
    }

    Ok((config, router))
}

/// A routing session that records every response.
pub struct Session {
    router: Router,
    log: Option<RoutingLog>,
    responses: Vec<RoutedResponse>,
}

impl Session {
    pub fn new(router: Router, log: Option<RoutingLog>) -> Self {
        Self {
            router,
            log,
            responses: Vec::new(),
        }
    }

    /// Open a session, with a metrics log unless disabled.
    pub fn open(
        config: &FrugalConfig,
        router: Router,
        no_metrics: bool,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let log = if config.metrics.enabled && !no_metrics {
            Some(RoutingLog::create(&config.metrics.log_dir)?)
        } else {
            None
        };
        Ok(Self::new(router, log))
    }

    /// Route and record one query. Failed queries are not recorded.
    pub async fn ask(&mut self, query: &str) -> Result<&RoutedResponse, RoutingError> {
        let response = self.router.route(query).await?;

        if let Some(log) = self.log.as_mut() {
            if let Err(e) = log.record(query, &response) {
                tracing::warn!(error = %e, "Failed to write metrics record");
            }
        }

        self.responses.push(response);
        Ok(&self.responses[self.responses.len() - 1])
    }

    /// Export JSON metrics (if logging) and summarize the session.
    pub fn finish(self) -> Result<MetricsSummary, Box<dyn std::error::Error>> {
        match self.log {
            Some(log) => {
                log.export_json()?;
                Ok(log.summary())
            }
            None => Ok(MetricsSummary::from_responses(&self.responses)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
