use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use expense_cli::commands::{App, Command};
use expense_cli::config::{Config, DEFAULT_CONFIG_PATH};
use expense_cli::telemetry::init_logging;

/// Record expenses and turn them into charts, CSV and PDF reports.
#[derive(Debug, Parser)]
#[command(name = "expense-cli", author, version, long_about = None)]
struct Cli {
    /// Path to config.toml
    #[arg(short, long, env = "EXPENSE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Backend URL, overrides [backend].url
    #[arg(long, env = "EXPENSE_BACKEND_URL")]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let config = Config::load(&cli.config, cli.backend_url)?;
    let app = App::new(config)?;
    app.run(cli.command).await
}
