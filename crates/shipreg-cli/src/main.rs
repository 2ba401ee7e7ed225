use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use shipreg_sync::SyncError;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match commands::run_command(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<SyncError>() {
                Some(sync) => {
                    eprintln!("{} [{}] {sync}", "error".red().bold(), sync.kind());
                    if sync.kind().is_retryable() {
                        eprintln!("{}", "this failure is transient; retrying may succeed".dimmed());
                    }
                }
                None => eprintln!("{} {e:#}", "error".red().bold()),
            }
            ExitCode::FAILURE
        }
    }
}
