//! Interactive prompt

use crate::cli::output::{format_routed, format_summary_table};
use crate::cli::session::{bootstrap, Session};
use crate::cli::ReplArgs;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Input that ends the session
pub fn is_exit_command(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "quit" | "exit")
}

/// Handle `frugal repl` command. `quit`, `exit` or EOF ends the session.
pub async fn run_repl(args: ReplArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, router) = bootstrap(&args.router)?;
    let mut session = Session::open(&config, router, args.no_metrics)?;

    println!(
        "{} Type a question, or 'quit' to exit.",
        "frugal".bold().green()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".cyan());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        if is_exit_command(&line) {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        match session.ask(query).await {
            Ok(response) => println!("{}\n", format_routed(response)),
            Err(e) => eprintln!("{} {}\n", "error:".red(), e),
        }
    }

    if !session.is_empty() {
        println!("{}", format_summary_table(&session.finish()?));
    }

    Ok(())
}
