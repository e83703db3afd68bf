//! Client configuration loading.
//!
//! Configuration is an explicit value owned by the [`ApiClient`], not
//! ambient process state: several independently configured clients can
//! coexist in one process (and in tests). Precedence when assembling a
//! config is the caller's concern; typical order is explicit arguments,
//! then environment variables, then a TOML file.
//!
//! [`ApiClient`]: crate::transport::ApiClient

use meridian_abstraction::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Environment variable holding the service endpoint URL.
pub const ENDPOINT_ENV: &str = "MERIDIAN_ENDPOINT";
/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "MERIDIAN_API_TOKEN";

/// Endpoint and credentials for the remote modeling service.
///
/// Validated eagerly: a malformed config fails at construction time, not
/// on the first request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service API, e.g. `https://app.meridian-ml.dev/api/v2`.
    pub endpoint: String,
    /// Bearer token used on every request.
    pub token: String,
}

impl ClientConfig {
    /// Creates a config from explicit values.
    ///
    /// # Errors
    /// Returns [`ApiError::Configuration`] if the endpoint is not an
    /// http(s) URL or the token is empty.
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let config = Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: token.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Creates a config from the `MERIDIAN_ENDPOINT` and
    /// `MERIDIAN_API_TOKEN` environment variables.
    ///
    /// # Errors
    /// Returns [`ApiError::Configuration`] if either variable is missing
    /// or the values fail validation.
    #[allow(clippy::disallowed_methods)] // env::var is needed for credential loading
    pub fn from_env() -> Result<Self> {
        let endpoint = env::var(ENDPOINT_ENV).map_err(|_| {
            ApiError::Configuration(format!("{} environment variable not set", ENDPOINT_ENV))
        })?;
        let token = env::var(TOKEN_ENV).map_err(|_| {
            ApiError::Configuration(format!("{} environment variable not set", TOKEN_ENV))
        })?;
        Self::new(endpoint, token)
    }

    /// Loads a config from a TOML file with `endpoint` and `token` keys.
    ///
    /// # Errors
    /// Returns [`ApiError::Configuration`] if the file cannot be read or
    /// parsed, or the values fail validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ApiError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let parsed: Self = toml::from_str(&contents).map_err(|e| {
            ApiError::Configuration(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::new(parsed.endpoint, parsed.token)
    }

    fn validate(&self) -> Result<()> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ApiError::Configuration(format!(
                "Endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.token.trim().is_empty() {
            return Err(ApiError::Configuration("API token must not be empty".to_string()));
        }
        Ok(())
    }
}
