//! Estimate command implementation

use crate::cli::output::{format_estimate_json, format_estimate_table, EstimateView};
use crate::cli::EstimateArgs;
use crate::config::FrugalConfig;
use crate::routing::{DifficultyEstimator, TokenBudgets};

/// Handle `frugal estimate` command
pub fn handle_estimate(args: &EstimateArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = if args.config.exists() {
        FrugalConfig::load(Some(&args.config))?
    } else {
        FrugalConfig::default()
    };
    let budgets = TokenBudgets::from(&config.routing);

    let breakdown = DifficultyEstimator::new().breakdown(&args.query);
    let view = EstimateView::new(&args.query, breakdown, &budgets);

    if args.json {
        Ok(format_estimate_json(&view)?)
    } else {
        Ok(format_estimate_table(&view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_estimate_json_without_config_file() {
        let args = EstimateArgs {
            query: "Explain the difference between Python and Java".to_string(),
            json: true,
            config: PathBuf::from("/nonexistent/frugal.toml"),
        };
        let output = handle_estimate(&args).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["difficulty"], 0.345);
        assert_eq!(parsed["tier"], "medium");
        assert_eq!(parsed["max_tokens"], 256);
    }

    #[test]
    fn test_estimate_uses_configured_budgets() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "[routing]\neasy_max_tokens = 100\n").unwrap();
        let args = EstimateArgs {
            query: "What is Python?".to_string(),
            json: true,
            config: temp.path().to_path_buf(),
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&handle_estimate(&args).unwrap()).unwrap();
        assert_eq!(parsed["max_tokens"], 100);
    }
}
