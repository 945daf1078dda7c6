//! Types for the routing metrics sink

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::agent::pricing::round_usd;

use crate::routing::RoutedResponse;

/// Characters of the query kept in a CSV row
pub const CSV_QUERY_CHARS: usize = 200;

pub const CSV_HEADER: &str = "timestamp,query,difficulty,routing_decision,model,input_tokens,output_tokens,total_tokens,latency_ms,cost_usd,cost_saved_usd,device";

/// One logged routing result: the full response plus the query and timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    pub timestamp: String,
    pub query: String,
    #[serde(flatten)]
    pub response: RoutedResponse,
}

impl MetricsRecord {
    pub fn new(timestamp: String, query: &str, response: &RoutedResponse) -> Self {
        Self {
            timestamp,
            query: query.to_string(),
            response: response.clone(),
        }
    }

    /// CSV row in [`CSV_HEADER`] order, without the trailing newline.
    pub fn to_csv_row(&self) -> String {
        let r = &self.response;
        let query = truncate_query(&self.query);
        [
            csv_field(&self.timestamp),
            csv_field(&query),
            r.difficulty.to_string(),
            r.routing_decision.as_str().to_string(),
            csv_field(&r.model),
            r.input_tokens.to_string(),
            r.output_tokens.to_string(),
            r.total_tokens().to_string(),
            r.latency_ms.to_string(),
            r.cost_usd.to_string(),
            r.cost_saved_usd.to_string(),
            csv_field(&r.device),
        ]
        .join(",")
    }
}

fn truncate_query(query: &str) -> String {
    query.chars().take(CSV_QUERY_CHARS).collect()
}

/// Quote a field when it holds a delimiter, quote or line break.
pub(crate) fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Aggregate over every response in a session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_queries: usize,
    pub routing_decisions: BTreeMap<String, usize>,
    pub total_cost_usd: f64,
    pub total_cost_saved_usd: f64,
    /// Mean latency of returned answers, 2 decimals
    pub avg_latency_ms: f64,
    pub total_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_file: Option<PathBuf>,
}

impl MetricsSummary {
    pub fn from_responses<'a>(responses: impl IntoIterator<Item = &'a RoutedResponse>) -> Self {
        let mut routing_decisions = BTreeMap::new();
        let mut total_queries = 0usize;
        let (mut cost, mut saved, mut latency, mut tokens) = (0.0, 0.0, 0.0, 0u64);

        for r in responses {
            total_queries += 1;
            *routing_decisions
                .entry(r.routing_decision.as_str().to_string())
                .or_insert(0) += 1;
            cost += r.cost_usd;
            saved += r.cost_saved_usd;
            latency += r.latency_ms;
            tokens += u64::from(r.total_tokens());
        }

        let avg_latency_ms = if total_queries > 0 {
            (latency / total_queries as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total_queries,
            routing_decisions,
            total_cost_usd: round_usd(cost),
            total_cost_saved_usd: round_usd(saved),
            avg_latency_ms,
            total_tokens: tokens,
            csv_file: None,
            json_file: None,
        }
    }

    pub fn with_files(mut self, csv_file: &Path, json_file: &Path) -> Self {
        self.csv_file = Some(csv_file.to_path_buf());
        self.json_file = Some(json_file.to_path_buf());
        self
    }

    /// Share of queries answered without the remote backend, in percent
    pub fn local_share(&self) -> f64 {
        if self.total_queries == 0 {
            return 0.0;
        }
        let local: usize = ["local", "repaired"]
            .iter()
            .filter_map(|d| self.routing_decisions.get(*d))
            .sum();
        local as f64 * 100.0 / self.total_queries as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_truncate_query_is_char_safe() {
        let query = "é".repeat(250);
        assert_eq!(truncate_query(&query).chars().count(), 200);
    }

    #[test]
    fn test_local_share() {
        let mut decisions = BTreeMap::new();
        decisions.insert("local".to_string(), 2);
        decisions.insert("repaired".to_string(), 1);
        decisions.insert("remote".to_string(), 1);
        let summary = MetricsSummary {
            total_queries: 4,
            routing_decisions: decisions,
            total_cost_usd: 0.0,
            total_cost_saved_usd: 0.0,
            avg_latency_ms: 0.0,
            total_tokens: 0,
            csv_file: None,
            json_file: None,
        };
        assert_eq!(summary.local_share(), 75.0);
    }
}
