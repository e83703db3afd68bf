//! Time-series partitioning configuration.
//!
//! A [`DatetimePartitioning`] describes how a dataset is split across time
//! and series identity, and which features are known in advance at
//! prediction time. It is validated locally against the project schema
//! before submission, so a doomed configuration never consumes a training
//! slot on the remote service.

use meridian_abstraction::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Whether a feature's future values are available at prediction time
/// (e.g. holidays), as opposed to features only known historically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSetting {
    /// Column name in the source dataset.
    pub feature_name: String,
    /// True if future values are available at prediction time.
    pub known_in_advance: bool,
}

/// Validated time-series partitioning specification.
///
/// Serializes to the wire shape the training-start endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatetimePartitioning {
    datetime_partition_column: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    multiseries_id_columns: Vec<String>,
    use_time_series: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    feature_settings: Vec<FeatureSetting>,
}

impl DatetimePartitioning {
    /// Creates a spec partitioned on `datetime_column`, with time-series
    /// modeling disabled until [`time_series`](Self::time_series) is called.
    #[must_use]
    pub fn new(datetime_column: impl Into<String>) -> Self {
        Self {
            datetime_partition_column: datetime_column.into(),
            multiseries_id_columns: Vec::new(),
            use_time_series: false,
            feature_settings: Vec::new(),
        }
    }

    /// Enables time-series modeling (forecasting rather than plain
    /// out-of-time validation).
    #[must_use]
    pub fn time_series(mut self) -> Self {
        self.use_time_series = true;
        self
    }

    /// Declares the column(s) distinguishing independent series in a
    /// multiseries dataset.
    #[must_use]
    pub fn multiseries(mut self, columns: Vec<String>) -> Self {
        self.multiseries_id_columns = columns;
        self
    }

    /// Appends a feature setting. Order is preserved on the wire.
    #[must_use]
    pub fn feature_setting(mut self, name: impl Into<String>, known_in_advance: bool) -> Self {
        self.feature_settings
            .push(FeatureSetting { feature_name: name.into(), known_in_advance });
        self
    }

    /// The datetime partition column name.
    #[must_use]
    pub fn datetime_partition_column(&self) -> &str {
        &self.datetime_partition_column
    }

    /// Whether time-series modeling is enabled.
    #[must_use]
    pub fn use_time_series(&self) -> bool {
        self.use_time_series
    }

    /// The declared feature settings, in insertion order.
    #[must_use]
    pub fn feature_settings(&self) -> &[FeatureSetting] {
        &self.feature_settings
    }

    /// Validates this partitioning against the dataset schema.
    ///
    /// Rejected locally, before any request is sent: referenced columns
    /// missing from the schema, duplicate feature settings, and
    /// `known_in_advance` declared without time-series modeling.
    ///
    /// # Errors
    /// Returns [`ApiError::Validation`] describing the first problem found.
    pub fn validate(&self, schema: &[String]) -> Result<()> {
        if self.datetime_partition_column.trim().is_empty() {
            return Err(ApiError::Validation(
                "Datetime partition column must not be empty".to_string(),
            ));
        }

        let known: HashSet<&str> = schema.iter().map(String::as_str).collect();
        if !known.contains(self.datetime_partition_column.as_str()) {
            return Err(ApiError::Validation(format!(
                "Datetime partition column '{}' not found in dataset schema",
                self.datetime_partition_column
            )));
        }
        for column in &self.multiseries_id_columns {
            if !known.contains(column.as_str()) {
                return Err(ApiError::Validation(format!(
                    "Multiseries id column '{}' not found in dataset schema",
                    column
                )));
            }
        }

        let mut seen = HashSet::new();
        for setting in &self.feature_settings {
            if !known.contains(setting.feature_name.as_str()) {
                return Err(ApiError::Validation(format!(
                    "Feature setting references column '{}' not found in dataset schema",
                    setting.feature_name
                )));
            }
            if !seen.insert(setting.feature_name.as_str()) {
                return Err(ApiError::Validation(format!(
                    "Duplicate feature setting for column '{}'",
                    setting.feature_name
                )));
            }
            if setting.known_in_advance && !self.use_time_series {
                return Err(ApiError::Validation(format!(
                    "Feature '{}' is known in advance but time-series modeling is not enabled",
                    setting.feature_name
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<String> {
        ["date", "store", "sales", "holiday"].iter().map(ToString::to_string).collect()
    }

    fn spec() -> DatetimePartitioning {
        DatetimePartitioning::new("date")
            .time_series()
            .multiseries(vec!["store".to_string()])
            .feature_setting("holiday", true)
    }

    #[test]
    fn test_valid_spec_passes() {
        spec().validate(&schema()).unwrap();
    }

    #[test]
    fn test_unknown_feature_column_rejected() {
        let spec = spec().feature_setting("weather", true);
        let err = spec.validate(&schema()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("weather")));
    }

    #[test]
    fn test_unknown_datetime_column_rejected() {
        let spec = DatetimePartitioning::new("timestamp").time_series();
        let err = spec.validate(&schema()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("timestamp")));
    }

    #[test]
    fn test_unknown_multiseries_column_rejected() {
        let spec = DatetimePartitioning::new("date").time_series().multiseries(vec![
            "region".to_string(),
        ]);
        let err = spec.validate(&schema()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("region")));
    }

    #[test]
    fn test_known_in_advance_requires_time_series() {
        let spec = DatetimePartitioning::new("date").feature_setting("holiday", true);
        let err = spec.validate(&schema()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("time-series")));
    }

    #[test]
    fn test_duplicate_feature_setting_rejected() {
        let spec = spec().feature_setting("holiday", false);
        let err = spec.validate(&schema()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("Duplicate")));
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let json = serde_json::to_value(spec()).unwrap();
        assert_eq!(json["datetimePartitionColumn"], "date");
        assert_eq!(json["useTimeSeries"], true);
        assert_eq!(json["multiseriesIdColumns"][0], "store");
        assert_eq!(json["featureSettings"][0]["featureName"], "holiday");
        assert_eq!(json["featureSettings"][0]["knownInAdvance"], true);
    }

    #[test]
    fn test_empty_collections_omitted_from_wire() {
        let json = serde_json::to_value(DatetimePartitioning::new("date")).unwrap();
        assert!(json.get("multiseriesIdColumns").is_none());
        assert!(json.get("featureSettings").is_none());
    }
}
