//! Sentiscope CLI - Command-line interface for review sentiment analysis.

use clap::Parser;
use sentiscope_batch::SessionController;
use sentiscope_cli::commands;
use sentiscope_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the session settled without a session error.
async fn run(cli: Cli) -> sentiscope_cli::Result<bool> {
    // Load config file, then let flags override it
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_overrides(&cli)?;

    let formatter = Formatter::new(config.settings.format, config.settings.color);
    let session = SessionController::from_config(&config.analyzer)?;

    let snapshot = match cli.command {
        Command::Analyze(args) => commands::execute_analyze(args, &session, &formatter).await?,
        Command::Batch(args) => commands::execute_batch(args, &session, &formatter).await?,
    };

    Ok(snapshot.error.is_none())
}
