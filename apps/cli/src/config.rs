//! CLI configuration resolution.
//!
//! Credentials are merged per field with precedence: CLI arguments, then
//! environment variables, then the config file. Supplying only one of
//! `--endpoint`/`--token` is fine as long as the other field is available
//! from a lower-precedence source.

use meridian_client::config::{ENDPOINT_ENV, TOKEN_ENV};
use meridian_client::ClientConfig;
use std::env;
use std::path::Path;

/// Resolves the client config from arguments, environment, and an
/// optional config file.
#[allow(clippy::disallowed_methods)] // env::var is needed for credential loading
pub fn resolve(
    arg_endpoint: Option<String>,
    arg_token: Option<String>,
    config_file: Option<&Path>,
) -> anyhow::Result<ClientConfig> {
    let file = config_file.map(ClientConfig::from_file).transpose()?;
    merge(
        arg_endpoint,
        arg_token,
        env::var(ENDPOINT_ENV).ok(),
        env::var(TOKEN_ENV).ok(),
        file,
    )
}

/// Per-field merge: each of endpoint and token independently takes the
/// highest-precedence source that provides it.
fn merge(
    arg_endpoint: Option<String>,
    arg_token: Option<String>,
    env_endpoint: Option<String>,
    env_token: Option<String>,
    file: Option<ClientConfig>,
) -> anyhow::Result<ClientConfig> {
    let endpoint = arg_endpoint
        .or(env_endpoint)
        .or_else(|| file.as_ref().map(|config| config.endpoint.clone()));
    let token = arg_token.or(env_token).or_else(|| file.map(|config| config.token));

    match (endpoint, token) {
        (Some(endpoint), Some(token)) => Ok(ClientConfig::new(endpoint, token)?),
        (None, _) => anyhow::bail!(
            "No endpoint: pass --endpoint, set {}, or provide it in --config",
            ENDPOINT_ENV
        ),
        (_, None) => anyhow::bail!(
            "No API token: pass --token, set {}, or provide it in --config",
            TOKEN_ENV
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_config() -> ClientConfig {
        ClientConfig::new("https://file.example.com", "file-token").unwrap()
    }

    #[test]
    fn test_arg_endpoint_overrides_env_with_env_token() {
        let config = merge(
            Some("https://arg.example.com".to_string()),
            None,
            Some("https://env.example.com".to_string()),
            Some("env-token".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(config.endpoint, "https://arg.example.com");
        assert_eq!(config.token, "env-token");
    }

    #[test]
    fn test_arg_token_alone_falls_back_to_file_endpoint() {
        let config = merge(
            None,
            Some("arg-token".to_string()),
            None,
            None,
            Some(file_config()),
        )
        .unwrap();
        assert_eq!(config.endpoint, "https://file.example.com");
        assert_eq!(config.token, "arg-token");
    }

    #[test]
    fn test_file_supplies_both_fields_when_nothing_else_set() {
        let config = merge(None, None, None, None, Some(file_config())).unwrap();
        assert_eq!(config.endpoint, "https://file.example.com");
        assert_eq!(config.token, "file-token");
    }

    #[test]
    fn test_missing_endpoint_is_reported() {
        let err = merge(None, Some("tok".to_string()), None, None, None).unwrap_err();
        assert!(err.to_string().contains("--endpoint"));
    }

    #[test]
    fn test_missing_token_is_reported() {
        let err = merge(
            Some("https://arg.example.com".to_string()),
            None,
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("--token"));
    }

    #[test]
    fn test_merged_values_are_still_validated() {
        let err = merge(
            Some("ftp://arg.example.com".to_string()),
            Some("tok".to_string()),
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("http(s)"));
    }
}
