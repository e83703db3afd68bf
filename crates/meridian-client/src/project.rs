//! Project handles: creation, target/partitioning configuration, and
//! leaderboard access.
//!
//! A project is created once from an uploaded dataset, mutated once by
//! [`Project::set_target`] (which attaches the partitioning and starts
//! autopilot), and read-only thereafter.

use meridian_abstraction::{ApiError, JobHandle, JobKind, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::jobs::JobTracker;
use crate::model::{Leaderboard, ModelRecord};
use crate::partitioning::DatetimePartitioning;
use crate::transport::ApiClient;

/// A typed view over a remote modeling project.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    id: String,
    name: String,
    columns: Vec<String>,
    target: Option<String>,
    metric: Option<String>,
    partitioning: Option<DatetimePartitioning>,
}

/// Coarse project progress as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    /// Current stage name (e.g. `"modeling"`).
    pub stage: String,
    /// True once the automated model search has finished.
    pub autopilot_done: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectResponse {
    project_id: String,
    processing_job_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    id: String,
    project_name: String,
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    metric: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AimRequest<'a> {
    target: &'a str,
    metric: &'a str,
    partitioning: &'a DatetimePartitioning,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobIdResponse {
    job_id: String,
}

impl Project {
    /// Creates a project by uploading a tabular source file and awaiting
    /// server-side ingestion.
    ///
    /// The file is not parsed locally; the column schema comes back from
    /// the server once the dataset-processing job completes.
    ///
    /// # Errors
    /// Upload, polling, or ingestion failures per the error taxonomy.
    pub async fn create(
        client: &ApiClient,
        name: &str,
        source: &Path,
        max_wait: Duration,
    ) -> Result<Self> {
        info!(name = %name, source = %source.display(), "Creating project");

        let created: CreateProjectResponse = client
            .upload_file("projects/", source, &[("projectName", name.to_string())])
            .await?;
        let ingestion = JobHandle {
            id: created.processing_job_id,
            project_id: created.project_id.clone(),
            kind: JobKind::DatasetProcessing,
        };
        JobTracker::new().await_completion(client, &ingestion, max_wait, None).await?;

        let project = Self::get(client, &created.project_id).await?;
        debug!(project_id = %project.id, columns = project.columns.len(), "Project ready");
        Ok(project)
    }

    /// Fetches an existing project by id.
    ///
    /// # Errors
    /// Returns [`ApiError::Service`] if the project does not exist.
    pub async fn get(client: &ApiClient, project_id: &str) -> Result<Self> {
        let response: ProjectResponse =
            client.get_json(&format!("projects/{}", project_id)).await?;
        Ok(Self {
            id: response.id,
            name: response.project_name,
            columns: response.columns,
            target: response.target,
            metric: response.metric,
            partitioning: None,
        })
    }

    /// Fetches the server-reported project stage.
    pub async fn status(&self, client: &ApiClient) -> Result<ProjectStatus> {
        client.get_json(&format!("projects/{}/status", self.id)).await
    }

    /// Sets the target column, attaches the partitioning, and starts the
    /// automated model search. Returns the training-queue job handle.
    ///
    /// The partitioning spec and the target are validated against the
    /// project schema locally; validation failures never reach the
    /// network. A project's target can only be set once.
    ///
    /// # Errors
    /// [`ApiError::Validation`] for local configuration problems, or any
    /// transport/service failure from the submission itself.
    pub async fn set_target(
        &mut self,
        client: &ApiClient,
        target: &str,
        metric: &str,
        partitioning: DatetimePartitioning,
    ) -> Result<JobHandle> {
        if self.target.is_some() {
            return Err(ApiError::Validation(format!(
                "Project {} already has a target set",
                self.id
            )));
        }
        if !self.columns.iter().any(|c| c == target) {
            return Err(ApiError::Validation(format!(
                "Target column '{}' not found in dataset schema",
                target
            )));
        }
        partitioning.validate(&self.columns)?;

        info!(project_id = %self.id, target = %target, metric = %metric, "Starting autopilot");
        let response: JobIdResponse = client
            .patch_json(
                &format!("projects/{}/aim", self.id),
                &AimRequest { target, metric, partitioning: &partitioning },
            )
            .await?;

        self.target = Some(target.to_string());
        self.metric = Some(metric.to_string());
        self.partitioning = Some(partitioning);

        Ok(JobHandle {
            id: response.job_id,
            project_id: self.id.clone(),
            kind: JobKind::TrainingQueue,
        })
    }

    /// Fetches the leaderboard, preserving the server's ordering.
    pub async fn leaderboard(&self, client: &ApiClient) -> Result<Leaderboard> {
        let models: Vec<ModelRecord> =
            client.get_json(&format!("projects/{}/models/", self.id)).await?;
        debug!(project_id = %self.id, models = models.len(), "Fetched leaderboard");
        Ok(Leaderboard::new(models))
    }

    /// The project identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The project display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names of the uploaded dataset, as reported by the server.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// The target column, once set.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// The evaluation metric, once set.
    #[must_use]
    pub fn metric(&self) -> Option<&str> {
        self.metric.as_deref()
    }

    /// The attached partitioning, once set.
    #[must_use]
    pub fn partitioning(&self) -> Option<&DatetimePartitioning> {
        self.partitioning.as_ref()
    }
}
