// src/logging.rs

//! Logging setup for `devpipe` using `tracing` + `tracing-subscriber`.
//!
//! `--log-level` sets the level of devpipe's own events. Without it,
//! `DEVPIPE_LOG` is read, either as a bare level (`debug`) or as a full
//! filter directive (`devpipe::dag=trace,devpipe=info`). Events from other
//! crates are held at `warn` unless a directive says otherwise.
//!
//! Thread names are printed so events from the `devpipe-resolver` thread can
//! be told apart from the worker pool. Output goes to stderr; stdout carries
//! only task and dry-run output.

use anyhow::{Context, Result};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable read when `--log-level` is absent.
pub const LOG_ENV: &str = "DEVPIPE_LOG";

/// Initialise the global subscriber. Fails if one is already installed or if
/// `DEVPIPE_LOG` holds an invalid directive.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => default_filter(level_from_log_level(lvl)),
        None => filter_from_env(std::env::var(LOG_ENV).ok().as_deref())?,
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    Ok(())
}

/// devpipe at `level`, everything else at `warn`.
pub fn default_filter(level: Level) -> EnvFilter {
    EnvFilter::new(format!(
        "warn,devpipe={}",
        level.as_str().to_ascii_lowercase()
    ))
}

/// Filter for a `DEVPIPE_LOG` value; unset or blank means `info`.
pub fn filter_from_env(value: Option<&str>) -> Result<EnvFilter> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(default_filter(Level::INFO));
    };

    match parse_level_str(value) {
        Some(level) => Ok(default_filter(level)),
        None => EnvFilter::try_new(value)
            .with_context(|| format!("invalid {LOG_ENV} filter '{value}'")),
    }
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

/// Parse a bare level name.
pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
