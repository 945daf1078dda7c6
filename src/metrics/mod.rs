//! # Routing Metrics
//!
//! Two outputs:
//!
//! - [`RoutingLog`]: a per-session sink that appends one CSV row per routed
//!   query to `routing_metrics_{YYYYmmdd_HHMMSS}.csv` and exports the full
//!   records to a sibling `.json` file.
//! - `metrics` facade series recorded by the router, exported in Prometheus
//!   text format by `frugal batch --prometheus`:
//!
//! **Counters:**
//! - `frugal_routes_total{decision}` - Routed queries by decision
//! - `frugal_local_repairs_total` - Larger-budget local regenerations
//!
//! **Histograms:**
//! - `frugal_route_duration_seconds` - End-to-end `route` duration

pub mod types;

pub use types::{MetricsRecord, MetricsSummary, CSV_HEADER};

use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::routing::RoutedResponse;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Metrics IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize metrics: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to install Prometheus recorder: {0}")]
    Prometheus(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> MetricsError + '_ {
    move |source| MetricsError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Append-only CSV log plus in-memory JSON accumulation for one session.
pub struct RoutingLog {
    csv_path: PathBuf,
    json_path: PathBuf,
    csv: File,
    records: Vec<MetricsRecord>,
}

impl RoutingLog {
    /// Create `routing_metrics_{now}.csv` in `dir` (created if missing) and write the header.
    pub fn create(dir: &Path) -> Result<Self, MetricsError> {
        Self::create_at(dir, Local::now())
    }

    pub fn create_at(dir: &Path, started: DateTime<Local>) -> Result<Self, MetricsError> {
        std::fs::create_dir_all(dir).map_err(io_error(dir))?;

        let stem = format!("routing_metrics_{}", started.format("%Y%m%d_%H%M%S"));
        let csv_path = dir.join(format!("{}.csv", stem));
        let json_path = dir.join(format!("{}.json", stem));

        let mut csv = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&csv_path)
            .map_err(io_error(&csv_path))?;
        if csv.metadata().map_err(io_error(&csv_path))?.len() == 0 {
            writeln!(csv, "{}", CSV_HEADER).map_err(io_error(&csv_path))?;
        }

        tracing::debug!(path = %csv_path.display(), "Routing metrics log opened");

        Ok(Self {
            csv_path,
            json_path,
            csv,
            records: Vec::new(),
        })
    }

    /// Append one routed query. The CSV row is flushed immediately.
    pub fn record(&mut self, query: &str, response: &RoutedResponse) -> Result<(), MetricsError> {
        let record = MetricsRecord::new(Local::now().to_rfc3339(), query, response);

        writeln!(self.csv, "{}", record.to_csv_row()).map_err(io_error(&self.csv_path))?;
        self.csv.flush().map_err(io_error(&self.csv_path))?;

        self.records.push(record);
        Ok(())
    }

    /// Write every record so far as a pretty-printed JSON array.
    pub fn export_json(&self) -> Result<&Path, MetricsError> {
        let json = serde_json::to_string_pretty(&self.records)?;
        std::fs::write(&self.json_path, json).map_err(io_error(&self.json_path))?;
        Ok(&self.json_path)
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary::from_responses(self.records.iter().map(|r| &r.response))
            .with_files(&self.csv_path, &self.json_path)
    }

    pub fn records(&self) -> &[MetricsRecord] {
        &self.records
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    pub fn json_path(&self) -> &Path {
        &self.json_path
    }
}

/// Install the Prometheus recorder with buckets sized for LLM round-trips (seconds).
pub fn setup_prometheus() -> Result<metrics_exporter_prometheus::PrometheusHandle, MetricsError> {
    use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};

    let duration_buckets = &[
        0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
    ];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("frugal_route_duration_seconds".to_string()),
            duration_buckets,
        )
        .map_err(|e| MetricsError::Prometheus(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Prometheus(e.to_string()))
}
