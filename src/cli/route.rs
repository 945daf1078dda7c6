//! Route command implementation

use crate::cli::output::{format_routed, format_routed_json};
use crate::cli::session::bootstrap;
use crate::cli::RouteArgs;

/// Handle `frugal route` command
pub async fn run_route(args: RouteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (_config, router) = bootstrap(&args.router)?;

    let response = router.route(&args.query).await?;

    if args.json {
        println!("{}", format_routed_json(&response)?);
    } else {
        println!("{}", format_routed(&response));
    }

    Ok(())
}
