// Leadgen CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: Watches run the library pollers; Ctrl-C discards them.

mod commands;
mod logging;
mod output;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use leadgen_poller::config::parse_error_policy;
use leadgen_poller::{HttpClient, RetryPolicy, WatchConfig};

#[derive(Parser)]
#[command(name = "leadgen")]
#[command(about = "Leadgen CLI - Inspect and follow lead-generation campaigns")]
#[command(version)]
pub struct Cli {
    /// API base URL
    #[arg(long, env = "LEADGEN_API_URL", default_value = "http://localhost:5001")]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "LEADGEN_HTTP_TIMEOUT_SECS", default_value = "30")]
    pub timeout: u64,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    /// What a watch does after a failed fetch
    #[arg(long, env = "LEADGEN_ON_ERROR", default_value = "retry", value_parser = ["pause", "stop", "retry"])]
    pub on_error: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect and watch campaigns
    Campaigns {
        #[command(subcommand)]
        command: commands::campaigns::CampaignsCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    logging::init_logging();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let client = HttpClient::new(&config.client).context("Failed to create HTTP client")?;
    let output_format = output::OutputFormat::from_str(&cli.output);

    tracing::debug!(api_url = %config.client.api_url, "Using campaign service");

    match cli.command {
        Commands::Campaigns { command } => {
            commands::campaigns::run(command, client, &config, output_format, cli.quiet).await
        }
    }
}

/// Environment defaults, overridden by command-line flags
fn build_config(cli: &Cli) -> Result<WatchConfig> {
    let mut config = WatchConfig::from_env().context("Invalid LEADGEN_* environment")?;

    config.client.api_url = cli.api_url.clone();
    config.client.request_timeout = Duration::from_secs(cli.timeout.max(1));

    let retry = match &config.error_policy {
        leadgen_poller::ErrorPolicy::Retry(retry) => retry.clone(),
        _ => RetryPolicy::exponential(),
    };
    config.error_policy = parse_error_policy(&cli.on_error, retry)
        .with_context(|| format!("Unknown --on-error value: {}", cli.on_error))?;

    Ok(config)
}
