//! Authenticated HTTP transport to the remote modeling service.
//!
//! Every non-2xx response is converted to a typed [`ApiError::Service`]
//! carrying the status code and the server-provided message; network-level
//! faults surface as [`ApiError::Transport`]. This layer performs no
//! retries — retry policy belongs to the job tracker or the caller.

use async_trait::async_trait;
use meridian_abstraction::{ApiError, JobHandle, JobState, JobStatusSource, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, error};

use crate::config::ClientConfig;

/// Authenticated client for the Meridian service API.
///
/// Cloning is cheap (the underlying connection pool is shared), and the
/// client is stateless per request, so one instance may be used by several
/// concurrent job trackers.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: Client,
}

impl ApiClient {
    /// Creates a client from a validated configuration.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config, http: Client::new() }
    }

    /// The configured endpoint, without a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint, path.trim_start_matches('/'))
    }

    /// Issues a GET and deserializes the JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.token)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::decode(response).await
    }

    /// Issues a POST with a JSON body and deserializes the JSON response.
    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.token)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::decode(response).await
    }

    /// Issues a PATCH with a JSON body and deserializes the JSON response.
    pub(crate) async fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "PATCH");
        let response = self
            .http
            .patch(&url)
            .bearer_auth(&self.config.token)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::decode(response).await
    }

    /// Uploads a local file as a multipart form, with optional extra text
    /// fields, and deserializes the JSON response.
    ///
    /// The file is not parsed locally; schema feedback comes back from the
    /// server.
    pub(crate) async fn upload_file<T: DeserializeOwned>(
        &self,
        path: &str,
        file_path: &Path,
        fields: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, file = %file_path.display(), "POST multipart");

        let file_bytes = tokio::fs::read(file_path).await.map_err(|e| {
            ApiError::Validation(format!("Failed to read {}: {}", file_path.display(), e))
        })?;
        let file_name = file_path
            .file_name()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                ApiError::Validation(format!("Invalid file name: {}", file_path.display()))
            })?
            .to_string();

        let mut form = Form::new().part("file", Part::bytes(file_bytes).file_name(file_name));
        for (name, value) in fields {
            form = form.text((*name).to_string(), value.clone());
        }

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.token)
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::decode(response).await
    }

    /// Checks the status and parses the body, mapping failures to the
    /// error taxonomy.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text =
                response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Service returned error status");
            return Err(service_error(status, &error_text));
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Serialization(format!("Failed to parse response: {}", e)))
    }
}

/// Maps a reqwest send failure to the transport error kind.
///
/// Timeouts and connection resets are transient and distinct from
/// semantic rejections returned by the server.
fn map_transport_error(e: reqwest::Error) -> ApiError {
    ApiError::Transport(format!("Network error: {}", e))
}

/// Builds a [`ApiError::Service`] from a non-success response, preferring
/// the `message` field of a JSON error body over the raw text.
fn service_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string());
    ApiError::Service { status: status.as_u16(), message }
}

/// Wire shape of the uniform job status endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResponse {
    status: String,
    #[serde(default)]
    in_progress: u32,
    #[serde(default)]
    queued: u32,
    #[serde(default)]
    message: Option<String>,
}

impl JobStatusResponse {
    fn into_state(self) -> Result<JobState> {
        match self.status.as_str() {
            "submitted" => Ok(JobState::Submitted),
            "running" => {
                Ok(JobState::Running { in_progress: self.in_progress, queued: self.queued })
            }
            "completed" => Ok(JobState::Completed),
            "failed" => Ok(JobState::Failed {
                message: self.message.unwrap_or_else(|| "Unknown failure".to_string()),
            }),
            other => {
                Err(ApiError::Serialization(format!("Unknown job status: '{}'", other)))
            }
        }
    }
}

#[async_trait]
impl JobStatusSource for ApiClient {
    async fn job_state(&self, job: &JobHandle) -> Result<JobState> {
        let status: JobStatusResponse = self
            .get_json(&format!("projects/{}/jobs/{}", job.project_id, job.id))
            .await?;
        status.into_state()
    }
}
