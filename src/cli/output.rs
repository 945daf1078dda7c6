//! Output formatting helpers for CLI commands

use crate::logging::truncate_chars;
use crate::metrics::MetricsSummary;
use crate::routing::{DifficultyBreakdown, RoutedResponse, RoutingDecision, TokenBudgets};
use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// View model for `frugal estimate`
#[derive(Debug, Clone, serde::Serialize)]
pub struct EstimateView {
    pub query: String,
    pub difficulty: f64,
    pub tier: String,
    pub max_tokens: u32,
    pub initial_backend: &'static str,
    pub breakdown: DifficultyBreakdown,
}

impl EstimateView {
    pub fn new(query: &str, breakdown: DifficultyBreakdown, budgets: &TokenBudgets) -> Self {
        let tier = breakdown.tier();
        Self {
            query: query.to_string(),
            difficulty: breakdown.score,
            tier: tier.to_string(),
            max_tokens: budgets.for_tier(tier),
            initial_backend: match tier {
                crate::routing::DifficultyTier::Hard => "remote",
                _ => "local",
            },
            breakdown,
        }
    }
}

/// Colored decision label
pub fn decision_label(decision: RoutingDecision) -> ColoredString {
    match decision {
        RoutingDecision::Local => "local".green(),
        RoutingDecision::Repaired => "repaired".cyan(),
        RoutingDecision::Escalated => "escalated".yellow(),
        RoutingDecision::Remote => "remote".magenta(),
    }
}

/// Format a difficulty estimate as a table
pub fn format_estimate_table(view: &EstimateView) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Signal", "Value"]);

    let b = &view.breakdown;
    let mut floors = Vec::new();
    if b.hard_floor {
        floors.push("hard keyword (>= 0.6)");
    }
    if b.multi_part_floor {
        floors.push("multi-part phrase (>= 0.5)");
    }

    table.add_row(vec![Cell::new("length"), Cell::new(format!("{:.3}", b.length))]);
    table.add_row(vec![Cell::new("keyword"), Cell::new(format!("{:.3}", b.keyword))]);
    table.add_row(vec![Cell::new("structure"), Cell::new(format!("{:.3}", b.structure))]);
    table.add_row(vec![
        Cell::new("floors"),
        Cell::new(if floors.is_empty() {
            "-".to_string()
        } else {
            floors.join(", ")
        }),
    ]);
    table.add_row(vec![
        Cell::new("difficulty".bold().to_string()),
        Cell::new(format!("{:.3}", view.difficulty).bold().to_string()),
    ]);
    table.add_row(vec![Cell::new("tier"), Cell::new(&view.tier)]);
    table.add_row(vec![Cell::new("max_tokens"), Cell::new(view.max_tokens)]);
    table.add_row(vec![Cell::new("initial backend"), Cell::new(view.initial_backend)]);

    table.to_string()
}

/// Format a difficulty estimate as JSON
pub fn format_estimate_json(view: &EstimateView) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(view)
}

/// Answer text followed by a routing metadata table
pub fn format_routed(response: &RoutedResponse) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Decision", "Difficulty", "Model", "Tokens", "Latency", "Cost", "Saved",
    ]);
    table.add_row(vec![
        Cell::new(decision_label(response.routing_decision).to_string()),
        Cell::new(format!("{:.3} ({})", response.difficulty, response.tier)),
        Cell::new(&response.model),
        Cell::new(format!(
            "{} in / {} out",
            response.input_tokens, response.output_tokens
        )),
        Cell::new(format!("{:.0}ms", response.total_latency_ms)),
        Cell::new(format!("${:.6}", response.cost_usd)),
        Cell::new(format!("${:.6}", response.cost_saved_usd)),
    ]);

    let mut out = format!("{}\n\n{}", response.text, table);
    if !response.verification.reasons.is_empty() {
        out.push_str(&format!(
            "\n{} {}",
            "verification:".dimmed(),
            response.verification.reason_summary()
        ));
    }
    if let Some(note) = &response.note {
        out.push_str(&format!("\n{} {}", "note:".yellow(), note));
    }
    out
}

/// Format a routed response as JSON
pub fn format_routed_json(response: &RoutedResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(response)
}

/// One-line progress entry for batch and repl sessions
pub fn format_batch_line(index: usize, query: &str, response: &RoutedResponse) -> String {
    format!(
        "[{:>3}] {:<9} {:.3}  {}",
        index,
        decision_label(response.routing_decision).to_string(),
        response.difficulty,
        truncate_chars(query, 60)
    )
}

/// Format a session summary as a table
pub fn format_summary_table(summary: &MetricsSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Metric", "Value"]);

    table.add_row(vec![Cell::new("queries"), Cell::new(summary.total_queries)]);
    for (decision, count) in &summary.routing_decisions {
        table.add_row(vec![Cell::new(format!("  {}", decision)), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("answered locally"),
        Cell::new(format!("{:.1}%", summary.local_share())),
    ]);
    table.add_row(vec![
        Cell::new("total cost"),
        Cell::new(format!("${:.6}", summary.total_cost_usd)),
    ]);
    table.add_row(vec![
        Cell::new("total saved"),
        Cell::new(format!("${:.6}", summary.total_cost_saved_usd).green().to_string()),
    ]);
    table.add_row(vec![
        Cell::new("avg latency"),
        Cell::new(format!("{:.2}ms", summary.avg_latency_ms)),
    ]);
    table.add_row(vec![Cell::new("total tokens"), Cell::new(summary.total_tokens)]);
    if let Some(csv) = &summary.csv_file {
        table.add_row(vec![Cell::new("csv"), Cell::new(csv.display())]);
    }
    if let Some(json_file) = &summary.json_file {
        table.add_row(vec![Cell::new("json"), Cell::new(json_file.display())]);
    }

    table.to_string()
}

/// Format a session summary as JSON
pub fn format_summary_json(summary: &MetricsSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&json!({ "summary": summary }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{DifficultyEstimator, DifficultyTier, VerificationReason, VerificationVerdict};

    fn sample_response() -> RoutedResponse {
        RoutedResponse {
            request_id: "req-1".to_string(),
            text: "Python is a programming language.".to_string(),
            input_tokens: 17,
            output_tokens: 9,
            latency_ms: 42.0,
            model: "phi-2.Q4_K_M.gguf".to_string(),
            device: "metal/cpu".to_string(),
            difficulty: 0.075,
            tier: DifficultyTier::Easy,
            routing_decision: RoutingDecision::Local,
            cost_usd: 0.0,
            cost_saved_usd: 0.00022,
            verification: VerificationVerdict {
                passed: true,
                reasons: vec![],
                truncated: false,
                uncertain: false,
                low_relevance: false,
                similarity: None,
            },
            local_attempts: 1,
            remote_calls: 0,
            max_tokens: 128,
            total_latency_ms: 42.0,
            note: None,
        }
    }

    #[test]
    fn test_estimate_view_for_hard_query() {
        let breakdown =
            DifficultyEstimator::new().breakdown("Prove that the halting problem is undecidable");
        let view = EstimateView::new("q", breakdown, &TokenBudgets::default());
        assert_eq!(view.tier, "hard");
        assert_eq!(view.max_tokens, 512);
        assert_eq!(view.initial_backend, "remote");
    }

    #[test]
    fn test_format_estimate_json() {
        let breakdown = DifficultyEstimator::new().breakdown("What is Python?");
        let view = EstimateView::new("What is Python?", breakdown, &TokenBudgets::default());
        let parsed: serde_json::Value =
            serde_json::from_str(&format_estimate_json(&view).unwrap()).unwrap();
        assert_eq!(parsed["difficulty"], 0.075);
        assert_eq!(parsed["tier"], "easy");
        assert_eq!(parsed["max_tokens"], 128);
        assert_eq!(parsed["breakdown"]["keyword"], 0.1);
    }

    #[test]
    fn test_format_estimate_table_lists_signals() {
        let breakdown = DifficultyEstimator::new()
            .breakdown("What are the advantages and disadvantages of deep learning?");
        let view = EstimateView::new("q", breakdown, &TokenBudgets::default());
        let output = format_estimate_table(&view);
        assert!(output.contains("structure"));
        assert!(output.contains("multi-part phrase"));
        assert!(output.contains("256"));
    }

    #[test]
    fn test_format_routed_includes_text_and_note() {
        let mut response = sample_response();
        response.note = Some("verification failed: uncertainty".to_string());
        response.verification.reasons = vec![VerificationReason::Uncertain];
        let output = format_routed(&response);
        assert!(output.starts_with("Python is a programming language."));
        assert!(output.contains("phi-2.Q4_K_M.gguf"));
        assert!(output.contains("$0.000220"));
        assert!(output.contains("verification failed: uncertainty"));
    }

    #[test]
    fn test_format_routed_json() {
        let json = format_routed_json(&sample_response()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["routing_decision"], "local");
        assert_eq!(parsed["tier"], "easy");
        assert!(parsed.get("note").is_none());
    }

    #[test]
    fn test_format_summary_table() {
        let responses = vec![sample_response(), sample_response()];
        let summary = MetricsSummary::from_responses(&responses);
        let output = format_summary_table(&summary);
        assert!(output.contains("queries"));
        assert!(output.contains("100.0%"));
        assert!(output.contains("$0.000440"));
    }

    #[test]
    fn test_format_summary_json() {
        let summary = MetricsSummary::from_responses(&[sample_response()]);
        let parsed: serde_json::Value =
            serde_json::from_str(&format_summary_json(&summary).unwrap()).unwrap();
        assert_eq!(parsed["summary"]["total_queries"], 1);
        assert_eq!(parsed["summary"]["routing_decisions"]["local"], 1);
    }
}
