//! Configuration types.
//!
//! This module defines the library configuration and the enums used to
//! select logging behaviour.

use std::str::FromStr;
use std::time::Duration;

use strum_macros::EnumString;

use crate::config::constants::*;
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration.
///
/// Constructed programmatically or from the environment with
/// [`Config::from_env`].
///
/// # Examples
///
/// ```no_run
/// use gql_pacer::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     rate_limit_capacity: 40,
///     rate_limit_window: Duration::from_secs(30),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// GraphQL endpoint the HTTP executor posts to
    pub endpoint: String,

    /// Bearer token sent with every request, if any
    pub api_token: Option<String>,

    /// Maximum requests inside one rate-limit window
    pub rate_limit_capacity: usize,

    /// Length of the sliding rate-limit window
    pub rate_limit_window: Duration,

    /// Fixed delay before a bare single query is dispatched
    pub single_query_delay: Duration,

    /// Minimum spacing between staggered dispatches
    pub stagger_delay: Duration,

    /// Maximum complexity tolerated per request
    pub complexity_budget: u64,

    /// Per-request HTTP timeout in seconds
    pub timeout_seconds: u64,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            rate_limit_capacity: DEFAULT_RATE_LIMIT_CAPACITY,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
            single_query_delay: DEFAULT_SINGLE_QUERY_DELAY,
            stagger_delay: DEFAULT_STAGGER_DELAY,
            complexity_budget: DEFAULT_COMPLEXITY_BUDGET,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Builds a configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first (if present),
    /// then every `GQL_PACER_*` variable that is set overrides its default.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable is set but cannot be parsed,
    /// or when the resulting configuration is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests use it to avoid touching the real
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            config.endpoint = endpoint;
        }
        config.api_token = lookup(ENV_API_TOKEN).filter(|token| !token.trim().is_empty());
        if let Some(capacity) = parse_var::<usize>(&lookup, ENV_RATE_LIMIT_CAPACITY)? {
            config.rate_limit_capacity = capacity;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_RATE_LIMIT_WINDOW_MS)? {
            config.rate_limit_window = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_SINGLE_QUERY_DELAY_MS)? {
            config.single_query_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_STAGGER_DELAY_MS)? {
            config.stagger_delay = Duration::from_millis(ms);
        }
        if let Some(budget) = parse_var::<u64>(&lookup, ENV_COMPLEXITY_BUDGET)? {
            config.complexity_budget = budget;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, ENV_TIMEOUT_SECS)? {
            config.timeout_seconds = secs;
        }
        if let Some(level) = parse_var::<LogLevel>(&lookup, ENV_LOG_LEVEL)? {
            config.log_level = level;
        }
        if let Some(format) = parse_var::<LogFormat>(&lookup, ENV_LOG_FORMAT)? {
            config.log_format = format;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can drive a working client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;
        if self.rate_limit_capacity == 0 {
            return Err(ConfigError::OutOfRange {
                key: ENV_RATE_LIMIT_CAPACITY,
                reason: "capacity must be at least 1",
            });
        }
        if self.rate_limit_window.is_zero() {
            return Err(ConfigError::OutOfRange {
                key: ENV_RATE_LIMIT_WINDOW_MS,
                reason: "window must be longer than 0ms",
            });
        }
        if self.complexity_budget == 0 {
            return Err(ConfigError::OutOfRange {
                key: ENV_COMPLEXITY_BUDGET,
                reason: "budget must be at least 1",
            });
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
