//! HTTP client initialization.
//!
//! This module builds the `reqwest` client used by [`crate::HttpExecutor`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::ClientBuilder;

use crate::config::{Config, DEFAULT_USER_AGENT, ENV_API_TOKEN};
use crate::error_handling::{ConfigError, InitializationError};

/// Initializes the HTTP client for GraphQL requests.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header
/// - Timeout from the configuration
/// - `Authorization: Bearer <token>` default header when a token is configured
/// - Rustls TLS backend (no native TLS)
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, InitializationError> {
    let mut headers = HeaderMap::new();
    if let Some(token) = &config.api_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            InitializationError::ConfigError(ConfigError::InvalidValue {
                key: ENV_API_TOKEN,
                value: "<redacted>".to_string(),
            })
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(DEFAULT_USER_AGENT)
        .default_headers(headers)
        .build()?;
    Ok(client)
}
