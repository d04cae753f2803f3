//! Logging bootstrap for binaries and hosts embedding mrcfs.
//!
//! The library crates emit events through `tracing` and never install a
//! subscriber themselves; whoever owns `main` calls [`init_logging`] once
//! with a [`LogConfig`]. `RUST_LOG`, when set, overrides the configured
//! level filter.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mrcfs_types::status_code::StatusCode;
use mrcfs_types::{Result, Status};

/// Re-export tracing macros for convenience.
pub use tracing::{debug, error, info, instrument, trace, warn};

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Hourly,
    Daily,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level filter (trace, debug, info, warn, error) or any
    /// `tracing_subscriber` directive string.
    pub level: String,

    /// Directory for log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    pub file_prefix: String,

    pub rotation: LogRotation,

    /// Emit JSON lines instead of human-readable output.
    pub json_format: bool,

    /// Also write to stdout.
    pub console_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".into(),
            log_dir: None,
            file_prefix: "mrcfs".into(),
            rotation: LogRotation::default(),
            json_format: false,
            console_output: true,
        }
    }
}

impl LogConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    fn file_appender(&self) -> Result<Option<RollingFileAppender>> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(None);
        };
        let appender = RollingFileAppender::builder()
            .rotation(self.rotation.into())
            .filename_prefix(&self.file_prefix)
            .filename_suffix("log")
            .build(log_dir)
            .map_err(|err| {
                Status::with_message(
                    StatusCode::INVALID_ARG,
                    format!("cannot open log directory {}: {err}", log_dir.display()),
                )
            })?;
        Ok(Some(appender))
    }
}

type SubscriberLayer =
    Box<dyn tracing_subscriber::Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Install the global subscriber. Call once at startup.
///
/// The returned guard keeps the non-blocking file writer flushing; hold it
/// for the life of the process.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<SubscriberLayer> = Vec::new();

    if config.console_output {
        if config.json_format {
            layers.push(Box::new(fmt::layer().json()));
        } else {
            layers.push(Box::new(fmt::layer()));
        }
    }

    let mut guard = None;
    if let Some(appender) = config.file_appender()? {
        let (writer, file_guard) = tracing_appender::non_blocking(appender);
        guard = Some(file_guard);
        if config.json_format {
            layers.push(Box::new(fmt::layer().json().with_writer(writer)));
        } else {
            layers.push(Box::new(fmt::layer().with_writer(writer)));
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(config.filter())
        .init();
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.file_prefix, "mrcfs");
        assert_eq!(config.rotation, LogRotation::Hourly);
        assert!(config.log_dir.is_none());
        assert!(config.console_output);
        assert!(!config.json_format);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: LogConfig =
            serde_json::from_str(r#"{"level": "debug", "rotation": "daily"}"#).unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.rotation, LogRotation::Daily);
        assert_eq!(config.file_prefix, "mrcfs");
        assert!(config.console_output);
    }

    #[test]
    fn test_rotation_rejects_unknown_value() {
        assert!(serde_json::from_str::<LogRotation>(r#""weekly""#).is_err());
    }
}
