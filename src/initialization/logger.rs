//! Logger initialization.
//!
//! Two line formats are supported: coloured plain text for terminals and
//! one JSON object per line for log collectors.

use std::io::Write;

use crate::config::{Config, LogFormat};
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter, Record};

/// Installs the global logger with the given level and format.
///
/// `RUST_LOG` is read first, so other crates can be tuned from the
/// environment, but `level` always wins for `gql_pacer`'s own targets.
/// HTTP stack crates are capped at `info` to keep request-level noise out.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a global logger is already
/// installed.
///
/// # Examples
///
/// ```no_run
/// use gql_pacer::initialization::init_logger_with;
/// use gql_pacer::LogFormat;
///
/// init_logger_with(log::LevelFilter::Debug, LogFormat::Json).ok();
/// log::info!("ready");
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    for module in ["reqwest", "hyper", "hyper_util", "h2"] {
        builder.filter_module(module, level.min(LevelFilter::Info));
    }
    builder.filter_module("rustls", LevelFilter::Warn);
    builder.filter_module("gql_pacer", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| writeln!(buf, "{}", json_line(record)));
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| writeln!(buf, "{}", plain_line(record)));
        }
    }

    // try_init so a second call reports an error instead of panicking
    builder.try_init()?;
    Ok(())
}

/// Installs the global logger from a [`Config`]'s `log_level` and `log_format`.
pub fn init_logger(config: &Config) -> Result<(), InitializationError> {
    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
}

fn json_line(record: &Record<'_>) -> String {
    serde_json::json!({
        "ts": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "level": record.level().as_str(),
        "target": record.target(),
        "msg": record.args().to_string(),
    })
    .to_string()
}

fn plain_line(record: &Record<'_>) -> String {
    let level = record.level();
    let label = match level {
        Level::Error => level.as_str().red().bold(),
        Level::Warn => level.as_str().yellow(),
        Level::Info => level.as_str().green(),
        Level::Debug => level.as_str().blue(),
        Level::Trace => level.as_str().purple(),
    };
    format!(
        "{} {:>5} {} {}",
        chrono::Local::now().format("%H:%M:%S%.3f").to_string().dimmed(),
        label,
        record.target().cyan(),
        record.args()
    )
}
