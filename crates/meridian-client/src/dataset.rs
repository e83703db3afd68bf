//! Prediction dataset upload and handles.

use chrono::{DateTime, SecondsFormat, Utc};
use meridian_abstraction::{JobHandle, JobKind, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::jobs::JobTracker;
use crate::transport::ApiClient;

/// A dataset uploaded for scoring, optionally annotated with a forecast
/// point marking the boundary between historical context and the horizon
/// being predicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetHandle {
    /// Opaque dataset identifier.
    pub id: String,
    /// The project the dataset was uploaded to.
    pub project_id: String,
    /// Source file name as recorded by the server.
    pub name: String,
    /// Boundary between historical input and the forecast horizon.
    #[serde(default)]
    pub forecast_point: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadDatasetResponse {
    dataset_id: String,
    job_id: String,
}

impl DatasetHandle {
    /// Uploads a prediction dataset and awaits server-side ingestion.
    ///
    /// # Errors
    /// Upload, polling, or ingestion failures per the error taxonomy.
    pub async fn upload(
        client: &ApiClient,
        project_id: &str,
        source: &Path,
        forecast_point: Option<DateTime<Utc>>,
        max_wait: Duration,
    ) -> Result<Self> {
        info!(
            project_id = %project_id,
            source = %source.display(),
            forecast_point = ?forecast_point,
            "Uploading prediction dataset"
        );

        let mut fields = Vec::new();
        if let Some(point) = forecast_point {
            fields.push((
                "forecastPoint",
                point.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }

        let uploaded: UploadDatasetResponse = client
            .upload_file(
                &format!("projects/{}/predictionDatasets/", project_id),
                source,
                &fields,
            )
            .await?;

        let ingestion = JobHandle {
            id: uploaded.job_id,
            project_id: project_id.to_string(),
            kind: JobKind::DatasetProcessing,
        };
        JobTracker::new().await_completion(client, &ingestion, max_wait, None).await?;

        Self::get(client, project_id, &uploaded.dataset_id).await
    }

    /// Fetches an existing prediction dataset by id.
    pub async fn get(client: &ApiClient, project_id: &str, dataset_id: &str) -> Result<Self> {
        client
            .get_json(&format!("projects/{}/predictionDatasets/{}", project_id, dataset_id))
            .await
    }
}
