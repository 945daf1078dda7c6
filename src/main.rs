use clap::Parser;
use frugal::cli::{
    batch, estimate, handle_completions, handle_config_init, repl, route, Cli, Commands,
    ConfigCommands,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Estimate(args) => match estimate::handle_estimate(&args) {
            Ok(output) => {
                println!("{}", output);
                Ok(())
            }
            Err(e) => Err(e),
        },
        Commands::Route(args) => route::run_route(args).await,
        Commands::Batch(args) => batch::run_batch(args).await,
        Commands::Repl(args) => repl::run_repl(args).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
