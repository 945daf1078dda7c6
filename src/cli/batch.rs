//! Batch command implementation

use crate::cli::output::{format_batch_line, format_summary_json, format_summary_table};
use crate::cli::session::{bootstrap, Session};
use crate::cli::BatchArgs;
use crate::metrics::setup_prometheus;
use colored::Colorize;
use std::io::Read;
use std::path::Path;

/// Non-empty, trimmed lines of the input
pub fn parse_queries(input: &str) -> Vec<&str> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

fn read_input(path: &Path) -> std::io::Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

/// Handle `frugal batch` command
///
/// A failed query is reported and skipped; the batch continues.
pub async fn run_batch(args: BatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, router) = bootstrap(&args.router)?;

    let prometheus = match &args.prometheus {
        Some(_) => Some(setup_prometheus()?),
        None => None,
    };

    let input = read_input(&args.input)?;
    let queries = parse_queries(&input);
    let mut session = Session::open(&config, router, args.no_metrics)?;
    let mut failures = 0usize;

    for (i, query) in queries.iter().enumerate() {
        match session.ask(query).await {
            Ok(response) => eprintln!("{}", format_batch_line(i + 1, query, response)),
            Err(e) => {
                failures += 1;
                eprintln!("[{:>3}] {} {}: {}", i + 1, "error".red(), query, e);
            }
        }
    }

    let summary = session.finish()?;
    if args.json {
        println!("{}", format_summary_json(&summary)?);
    } else {
        println!("{}", format_summary_table(&summary));
        if failures > 0 {
            println!("{} {} queries failed", "!".red(), failures);
        }
    }

    if let (Some(handle), Some(path)) = (prometheus, &args.prometheus) {
        std::fs::write(path, handle.render())?;
        eprintln!("✓ Prometheus metrics written to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queries_skips_blank_lines() {
        let input = "What is Python?\n\n   \n  Define machine learning  \r\nList three languages";
        assert_eq!(
            parse_queries(input),
            vec![
                "What is Python?",
                "Define machine learning",
                "List three languages"
            ]
        );
    }

    #[test]
    fn test_read_input_from_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(temp.path(), "a\nb\n").unwrap();
        assert_eq!(read_input(temp.path()).unwrap(), "a\nb\n");
    }
}
