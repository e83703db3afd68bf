//! Command implementations and terminal rendering.

use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use meridian_abstraction::JobProgress;
use meridian_client::{
    run_forecast, ApiClient, DatetimePartitioning, ForecastPlan, Leaderboard, PredictionRow,
    Project,
};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the end-to-end forecast command.
#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Display name for the new project
    #[arg(long)]
    pub name: String,

    /// Tabular training file to upload
    #[arg(long)]
    pub training_data: PathBuf,

    /// Column to predict
    #[arg(long)]
    pub target: String,

    /// Evaluation metric for model selection (lower is better)
    #[arg(long, default_value = "RMSE")]
    pub metric: String,

    /// Datetime partition column
    #[arg(long)]
    pub datetime_column: String,

    /// Column(s) identifying independent series (repeatable)
    #[arg(long = "series-column")]
    pub series_columns: Vec<String>,

    /// Feature(s) whose future values are known at prediction time
    /// (repeatable)
    #[arg(long = "known-in-advance")]
    pub known_in_advance: Vec<String>,

    /// Tabular file with the rows to score
    #[arg(long)]
    pub prediction_data: PathBuf,

    /// Forecast point (RFC 3339 timestamp or YYYY-MM-DD)
    #[arg(long)]
    pub forecast_point: Option<String>,

    /// Deadline in seconds applied to each awaited job
    #[arg(long, default_value_t = 3600)]
    pub max_wait: u64,
}

/// Arguments for the leaderboard command.
#[derive(Args, Debug)]
pub struct LeaderboardArgs {
    /// Project identifier
    #[arg(long)]
    pub project_id: String,

    /// Metric whose cross-validation column to show
    #[arg(long, default_value = "RMSE")]
    pub metric: String,
}

/// Parses an RFC 3339 timestamp, or a bare date taken as UTC midnight.
fn parse_timestamp(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(timestamp) = value.parse::<DateTime<Utc>>() {
        return Ok(timestamp);
    }
    let date = value
        .parse::<NaiveDate>()
        .map_err(|_| anyhow::anyhow!("'{}' is not an RFC 3339 timestamp or YYYY-MM-DD", value))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("'{}' has no midnight (invalid date)", value))?;
    Ok(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

fn print_progress(progress: JobProgress) {
    println!(
        "  {} {} in progress, {} queued ({}s elapsed)",
        "working:".dimmed(),
        progress.in_progress,
        progress.queued,
        progress.elapsed.as_secs()
    );
}

/// Runs the forecast flow and prints the resulting rows.
pub async fn forecast(client: &ApiClient, args: ForecastArgs) -> anyhow::Result<()> {
    let mut partitioning = DatetimePartitioning::new(args.datetime_column)
        .time_series()
        .multiseries(args.series_columns);
    for feature in args.known_in_advance {
        partitioning = partitioning.feature_setting(feature, true);
    }

    let forecast_point = args.forecast_point.as_deref().map(parse_timestamp).transpose()?;

    let plan = ForecastPlan {
        project_name: args.name,
        training_data: args.training_data,
        target: args.target,
        metric: args.metric,
        partitioning,
        prediction_data: args.prediction_data,
        forecast_point,
        max_wait: Duration::from_secs(args.max_wait),
    };

    println!("{} {}", "Starting forecast run for".bold(), plan.project_name.bold());
    let mut on_progress = print_progress;
    let outcome = run_forecast(client, plan, Some(&mut on_progress)).await?;

    println!(
        "{} {} ({})",
        "Selected model:".green().bold(),
        outcome.model_type,
        outcome.model_id
    );
    println!("{}", render_rows(&outcome.rows));
    Ok(())
}

/// Prints the leaderboard of an existing project.
pub async fn leaderboard(client: &ApiClient, args: LeaderboardArgs) -> anyhow::Result<()> {
    let project = Project::get(client, &args.project_id).await?;
    let board = project.leaderboard(client).await?;

    println!("{} {}", "Leaderboard for".bold(), project.name().bold());
    println!("{}", render_leaderboard(&board, &args.metric));

    match board.best_by_metric(&args.metric) {
        Ok(best) => {
            println!("{} {} ({})", "Best model:".green().bold(), best.model_type, best.id);
        }
        Err(e) => println!("{} {}", "No selection:".yellow().bold(), e),
    }
    Ok(())
}

fn render_leaderboard(board: &Leaderboard, metric: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Model ID".to_string(),
        "Model Type".to_string(),
        format!("{} (CV)", metric),
    ]);
    for model in board.models() {
        table.add_row(vec![
            model.id.clone(),
            model.model_type.clone(),
            model
                .cross_validation(metric)
                .map_or_else(|| "pending".to_string(), |score| format!("{:.4}", score)),
        ]);
    }
    table
}

fn render_rows(rows: &[PredictionRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Row",
        "Series",
        "Timestamp",
        "Distance",
        "Prediction",
    ]);
    for row in rows {
        table.add_row(vec![
            row.row_id.to_string(),
            row.series_id.clone(),
            row.timestamp.to_rfc3339(),
            row.forecast_distance.to_string(),
            format!("{:.2}", row.prediction),
        ]);
    }
    table
}
