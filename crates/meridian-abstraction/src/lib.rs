//! Shared abstractions for the Meridian client.
//!
//! This crate defines the error taxonomy, the remote-job vocabulary
//! (handles, states, progress snapshots) and the `JobStatusSource` trait
//! that the job tracker polls through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type for Meridian operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Represents an error raised while driving the remote modeling service.
///
/// The variants are deliberately disjoint by failure origin: local
/// validation never reaches the network, transport faults are transient,
/// service rejections carry the server's own message, and job-level
/// outcomes are reported by the polling tracker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Bad local configuration detected before any request was sent
    /// (e.g., a partitioning spec referencing an unknown column).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Client configuration is missing or malformed (endpoint, token).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network-level fault (timeout, connection reset). Transient; safe to
    /// retry the single request, but this crate does not retry it.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server rejected the request with a non-success status.
    #[error("Service error ({status}): {message}")]
    Service {
        /// HTTP status code returned by the server.
        status: u16,
        /// Server-provided error message, verbatim.
        message: String,
    },

    /// A response or request body could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The remote job reached the `Failed` terminal state.
    #[error("Job {job_id} failed: {message}")]
    JobFailed {
        /// Identifier of the failed job.
        job_id: String,
        /// Failure detail reported by the server.
        message: String,
    },

    /// The deadline elapsed while polling. The remote job is left running;
    /// the same handle may be awaited again.
    #[error("Timed out after {waited:?} awaiting job {job_id} (the remote job may still complete)")]
    AwaitTimeout {
        /// Identifier of the job that was being awaited.
        job_id: String,
        /// How long the tracker waited before giving up.
        waited: Duration,
    },

    /// Model selection found no candidate with the required score present.
    #[error("No model has a cross-validation score for metric '{metric}'")]
    NoEligibleModel {
        /// The metric that was requested.
        metric: String,
    },
}

/// The kind of a remote job, determining which result accessor applies
/// once the job completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    /// Autopilot model search on the training queue.
    TrainingQueue,
    /// A prediction request against a trained model.
    Predictions,
    /// Server-side ingestion of an uploaded dataset.
    DatasetProcessing,
}

/// A reference to a remote job.
///
/// Handles are cheap identifiers, not live connections: polling the status
/// is side-effect-free, and a handle stays valid across multiple awaits
/// (including after an [`ApiError::AwaitTimeout`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Opaque job identifier assigned by the server.
    pub id: String,
    /// The project this job belongs to.
    pub project_id: String,
    /// Which result accessor applies after completion.
    pub kind: JobKind,
}

/// The observed state of a remote job.
///
/// Modeled as a sum type so a result can only be fetched once the job is
/// `Completed`; there is no nullable "result" field to read too early.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    /// Accepted by the server, not yet picked up by a worker.
    Submitted,
    /// Executing. The counts are observational sub-task progress, not
    /// distinct states.
    Running {
        /// Sub-tasks currently executing.
        in_progress: u32,
        /// Sub-tasks waiting in the queue.
        queued: u32,
    },
    /// Terminal: the result may now be fetched via the kind-specific
    /// accessor.
    Completed,
    /// Terminal: the job failed remotely.
    Failed {
        /// Failure detail reported by the server.
        message: String,
    },
}

impl JobState {
    /// Returns `true` for `Completed` and `Failed`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }
}

/// A progress snapshot handed to the tracker's callback on each
/// non-terminal poll that reports sub-task counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobProgress {
    /// Sub-tasks currently executing.
    pub in_progress: u32,
    /// Sub-tasks waiting in the queue.
    pub queued: u32,
    /// Time elapsed since the await began.
    pub elapsed: Duration,
}

/// A source of job status, polled by the job tracker.
///
/// The transport client implements this against the real service; tests
/// implement it with scripted state sequences. Implementations must be
/// safe for concurrent use — the tracker only issues one poll at a time,
/// but independent trackers may share one source.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    /// Queries the current state of `job`. Side-effect-free and safe to
    /// repeat, including after the job is terminal.
    async fn job_state(&self, job: &JobHandle) -> Result<JobState>;
}
