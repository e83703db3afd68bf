//! End-to-end orchestration: create → partition → train → select →
//! predict.

use chrono::{DateTime, Utc};
use meridian_abstraction::{JobProgress, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::dataset::DatasetHandle;
use crate::jobs::JobTracker;
use crate::partitioning::DatetimePartitioning;
use crate::prediction::{PredictionJob, PredictionRow};
use crate::project::Project;
use crate::transport::ApiClient;

/// Everything needed to run one forecast end to end.
#[derive(Debug, Clone)]
pub struct ForecastPlan {
    /// Display name for the new project.
    pub project_name: String,
    /// Tabular training file to upload.
    pub training_data: PathBuf,
    /// Column to predict.
    pub target: String,
    /// Evaluation metric for model selection (lower-is-better).
    pub metric: String,
    /// Time-series partitioning to attach before training.
    pub partitioning: DatetimePartitioning,
    /// Tabular file holding the rows to score.
    pub prediction_data: PathBuf,
    /// Boundary between historical context and the forecast horizon.
    pub forecast_point: Option<DateTime<Utc>>,
    /// Overall deadline applied to each awaited job.
    pub max_wait: Duration,
}

/// Result of a completed forecast run.
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    /// The created project, with target and partitioning attached.
    pub project: Project,
    /// Identifier of the selected model.
    pub model_id: String,
    /// Display name of the selected model.
    pub model_type: String,
    /// Forecast rows in server order.
    pub rows: Vec<PredictionRow>,
}

/// Runs the full sequence against the remote service.
///
/// Operations are issued sequentially; the only concurrency is the
/// suspension inside each polling await. The progress callback receives
/// sub-task counts from both the training and the prediction awaits.
///
/// # Errors
/// The first failure from any step is returned unchanged; nothing is
/// suppressed or substituted.
pub async fn run_forecast(
    client: &ApiClient,
    plan: ForecastPlan,
    mut on_progress: Option<&mut (dyn FnMut(JobProgress) + Send)>,
) -> Result<ForecastOutcome> {
    let mut project =
        Project::create(client, &plan.project_name, &plan.training_data, plan.max_wait).await?;

    let training = project
        .set_target(client, &plan.target, &plan.metric, plan.partitioning.clone())
        .await?;
    info!(project_id = %project.id(), job_id = %training.id, "Awaiting autopilot");
    JobTracker::new()
        .await_completion(client, &training, plan.max_wait, on_progress.as_deref_mut())
        .await?;

    let leaderboard = project.leaderboard(client).await?;
    let best = leaderboard.best_by_metric(&plan.metric)?;
    info!(model_id = %best.id, model_type = %best.model_type, "Selected best model");
    let (model_id, model_type) = (best.id.clone(), best.model_type.clone());

    let dataset = DatasetHandle::upload(
        client,
        project.id(),
        &plan.prediction_data,
        plan.forecast_point,
        plan.max_wait,
    )
    .await?;

    let prediction = PredictionJob::submit(client, project.id(), &model_id, &dataset.id).await?;
    let rows = prediction.await_rows(client, plan.max_wait, on_progress.as_deref_mut()).await?;
    info!(rows = rows.len(), "Forecast complete");

    Ok(ForecastOutcome { project, model_id, model_type, rows })
}
