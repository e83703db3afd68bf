//! Meridian CLI - drive the hosted modeling service from the terminal.
//!
//! The `mdn` command uploads a dataset, configures time-series
//! partitioning, runs the automated model search, and requests forecasts
//! from the selected model.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use meridian_client::ApiClient;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Meridian CLI - remote time-series modeling orchestration
#[derive(Parser, Debug)]
#[command(
    name = "mdn",
    author,
    version,
    about = "Meridian - remote time-series modeling orchestration"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Path to a TOML config file with `endpoint` and `token`
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Service endpoint (overrides MERIDIAN_ENDPOINT and the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// API token (overrides MERIDIAN_API_TOKEN and the config file)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a forecast end to end: upload, train, select, predict
    Forecast(commands::ForecastArgs),

    /// Show the leaderboard of an existing project
    Leaderboard(commands::LeaderboardArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = args.log_level.parse::<Level>().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let client = ApiClient::new(config::resolve(
        args.endpoint.clone(),
        args.token.clone(),
        args.config.as_deref(),
    )?);

    match args.command {
        Command::Forecast(forecast) => commands::forecast(&client, forecast).await,
        Command::Leaderboard(leaderboard) => commands::leaderboard(&client, leaderboard).await,
    }
}
