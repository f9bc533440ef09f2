use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use mcp_todo_rs::cli::{Cli, Command};
use mcp_todo_rs::commands;
use mcp_todo_rs::error::ServiceResult;
use mcp_todo_rs::store::{TodoStore, resolve_store_root};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // stdout carries the MCP stream in `serve` mode, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.default_log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(message) = cli.validate() {
        eprintln!("{} {message}", "Error:".red().bold());
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "Error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ServiceResult<()> {
    let root = resolve_store_root(cli.store.store_dir.clone())?;
    let store = TodoStore::new(root).with_id_match(cli.store.id_match());
    if !matches!(cli.command, Command::Version) {
        store.initialize()?;
    }
    commands::run(cli.command, &store).await
}
