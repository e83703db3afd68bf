//! Prediction job submission and typed result rows.

use chrono::{DateTime, Utc};
use meridian_abstraction::{JobHandle, JobKind, JobProgress, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::jobs::JobTracker;
use crate::transport::ApiClient;

/// One forecasted value, as returned by the server. Row order from the
/// server is preserved; no local re-sorting is performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRow {
    /// Foreign key into the uploaded prediction dataset.
    pub row_id: u64,
    /// The forecasted value.
    pub prediction: f64,
    /// Periods past the forecast point (>= 1).
    pub forecast_distance: i64,
    /// Boundary between historical input and the forecast horizon.
    pub forecast_point: DateTime<Utc>,
    /// Which time series the row belongs to.
    pub series_id: String,
    /// The predicted instant: forecast point plus the forecast distance
    /// in periods.
    pub timestamp: DateTime<Utc>,
}

impl PredictionRow {
    /// Checks that `timestamp` equals `forecast_point` advanced by
    /// `forecast_distance` periods of the given length.
    #[must_use]
    pub fn timestamp_is_consistent(&self, period: chrono::Duration) -> bool {
        self.forecast_point + period * i32::try_from(self.forecast_distance).unwrap_or(i32::MAX)
            == self.timestamp
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictionRequest<'a> {
    model_id: &'a str,
    dataset_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitPredictionResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    predictions: Vec<PredictionRow>,
}

/// A submitted prediction request, consumed by awaiting its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionJob {
    job: JobHandle,
}

impl PredictionJob {
    /// Submits a prediction job for `model_id` against an uploaded
    /// dataset.
    ///
    /// # Errors
    /// Transport or service failures from the submission.
    pub async fn submit(
        client: &ApiClient,
        project_id: &str,
        model_id: &str,
        dataset_id: &str,
    ) -> Result<Self> {
        info!(project_id = %project_id, model_id = %model_id, dataset_id = %dataset_id,
            "Submitting prediction job");
        let response: SubmitPredictionResponse = client
            .post_json(
                &format!("projects/{}/predictions/", project_id),
                &PredictionRequest { model_id, dataset_id },
            )
            .await?;
        Ok(Self {
            job: JobHandle {
                id: response.job_id,
                project_id: project_id.to_string(),
                kind: JobKind::Predictions,
            },
        })
    }

    /// The underlying job handle, usable for re-awaiting after a timeout.
    #[must_use]
    pub fn handle(&self) -> &JobHandle {
        &self.job
    }

    /// Awaits completion and materializes the rows in server order.
    ///
    /// Fetching the terminal result is safe to repeat; the server's
    /// recorded result does not change after completion.
    ///
    /// # Errors
    /// [`meridian_abstraction::ApiError::JobFailed`] or
    /// [`meridian_abstraction::ApiError::AwaitTimeout`] from the tracker,
    /// or transport/service failures from the result fetch.
    pub async fn await_rows(
        &self,
        client: &ApiClient,
        max_wait: Duration,
        on_progress: Option<&mut (dyn FnMut(JobProgress) + Send + '_)>,
    ) -> Result<Vec<PredictionRow>> {
        JobTracker::new().await_completion(client, &self.job, max_wait, on_progress).await?;

        let response: PredictionsResponse = client
            .get_json(&format!("projects/{}/predictions/{}", self.job.project_id, self.job.id))
            .await?;
        debug!(job_id = %self.job.id, rows = response.predictions.len(), "Fetched predictions");
        Ok(response.predictions)
    }
}
