//! CLI entry point for tern.

mod cli;
mod commands;
mod output;

use clap::Parser;
use tern_observability::{init, shutdown, ObservabilityConfig};

use crate::cli::Cli;

/// Logs go to stderr and would interleave with the chat, so only errors are
/// shown unless a level is configured.
fn init_observability() {
    let mut config = ObservabilityConfig::from_env();
    if config.log_level.is_none() {
        config = config.with_log_level("error");
    }
    if let Err(e) = init(config) {
        output::warning(&format!("Observability init failed (continuing): {}", e));
    }
}

#[tokio::main]
async fn main() {
    // .env in the working directory or any parent
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    output::init(cli.output);
    init_observability();

    let result = commands::handle(cli).await;
    shutdown();

    // Exit explicitly: after Ctrl-C at the prompt the stdin reader is still
    // parked in a blocking read, which would hold up runtime shutdown.
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            output::error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}
