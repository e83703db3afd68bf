//! Trained-model handles and leaderboard selection.

use meridian_abstraction::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-partition scores for one metric. Each slot is optionally absent
/// while the corresponding computation is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScores {
    /// Score on the validation partition.
    pub validation: Option<f64>,
    /// Cross-validation score.
    pub cross_validation: Option<f64>,
    /// Score on the holdout partition.
    pub holdout: Option<f64>,
}

/// A trained model as reported by the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    /// Opaque model identifier.
    pub id: String,
    /// Human-readable model description (blueprint name).
    pub model_type: String,
    /// Metric name → per-partition scores.
    #[serde(default)]
    pub metrics: HashMap<String, MetricScores>,
}

impl ModelRecord {
    /// The cross-validation score for `metric`, if computed.
    #[must_use]
    pub fn cross_validation(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).and_then(|scores| scores.cross_validation)
    }
}

/// The server's ordered list of trained models.
///
/// Insertion order reflects the completion/ranking order chosen by the
/// server and is never re-sorted locally; [`best_by_metric`] is an
/// explicit metric-based selection, not a reordering.
///
/// [`best_by_metric`]: Self::best_by_metric
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    models: Vec<ModelRecord>,
}

impl Leaderboard {
    /// Wraps a server-ordered sequence of models.
    #[must_use]
    pub fn new(models: Vec<ModelRecord>) -> Self {
        Self { models }
    }

    /// The models in server order.
    #[must_use]
    pub fn models(&self) -> &[ModelRecord] {
        &self.models
    }

    /// Number of models on the leaderboard.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True if the leaderboard holds no models.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Selects the model with the lowest cross-validation score for
    /// `metric`.
    ///
    /// Models without a cross-validation score for the metric are excluded
    /// from comparison, not treated as worst. Lower-is-better is assumed
    /// (loss-style metrics); per-metric directionality is a known
    /// limitation, not inferred.
    ///
    /// # Errors
    /// Returns [`ApiError::NoEligibleModel`] when no model has the score
    /// present (e.g. autopilot still running).
    pub fn best_by_metric(&self, metric: &str) -> Result<&ModelRecord> {
        self.models
            .iter()
            .filter_map(|model| {
                model
                    .cross_validation(metric)
                    .filter(|score| !score.is_nan())
                    .map(|score| (model, score))
            })
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(model, _)| model)
            .ok_or_else(|| ApiError::NoEligibleModel { metric: metric.to_string() })
    }
}
