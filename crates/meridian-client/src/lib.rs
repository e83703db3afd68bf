//! Client SDK for the Meridian hosted modeling service.
//!
//! The heavy computation (model training, cross-validation, forecasting)
//! runs remotely; this crate is orchestration: it submits long-running
//! jobs over an authenticated HTTP channel, polls them with adaptive
//! backoff, and exposes typed handles over the remote entities.
//!
//! # Typical flow
//!
//! 1. Build an [`ApiClient`] from a [`ClientConfig`].
//! 2. [`Project::create`] — upload the training data, await ingestion.
//! 3. [`Project::set_target`] — attach a validated
//!    [`DatetimePartitioning`] and start autopilot.
//! 4. Await the training job with [`JobTracker::await_completion`].
//! 5. Pick a model via [`Leaderboard::best_by_metric`].
//! 6. Upload a prediction dataset, submit a [`PredictionJob`], and await
//!    its [`PredictionRow`]s.
//!
//! [`run_forecast`] composes these steps end to end.

pub mod config;
pub mod dataset;
pub mod flow;
pub mod jobs;
pub mod model;
pub mod partitioning;
pub mod prediction;
pub mod project;
pub mod transport;

pub use config::ClientConfig;
pub use dataset::DatasetHandle;
pub use flow::{run_forecast, ForecastOutcome, ForecastPlan};
pub use jobs::{JobTracker, PollSchedule};
pub use model::{Leaderboard, MetricScores, ModelRecord};
pub use partitioning::{DatetimePartitioning, FeatureSetting};
pub use prediction::{PredictionJob, PredictionRow};
pub use project::{Project, ProjectStatus};
pub use transport::ApiClient;

pub use meridian_abstraction::{
    ApiError, JobHandle, JobKind, JobProgress, JobState, JobStatusSource, Result,
};
