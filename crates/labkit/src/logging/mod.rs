//! Console and file log sink setup
//!
//! [`LogOptions`] describes which sinks to enable and at what severity;
//! [`LogOptions::build`] assembles them into a [`tracing::Dispatch`]. The
//! crate never installs a logger behind the caller's back: the returned
//! [`LogSetup`] is explicit state that the application either threads
//! through scoped use (`tracing::dispatcher::with_default`) or promotes to
//! the process default exactly once with [`LogSetup::install`].
//!
//! Severity levels are integers 0–5, matching the usual research-script
//! convention: 0 logs everything, 1 = debug, 2 = info, 3 = warn, 4 = error,
//! 5 = critical (mapped to error). Out-of-range levels fail before any sink
//! is created.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use labkit::logging::LogOptions;
//!
//! let options = LogOptions {
//!     file: Some("runs/exp01/train.log".into()),
//!     file_level: 1,
//!     ..LogOptions::default()
//! };
//! let _log = options.build().unwrap().install().unwrap();
//! tracing::info!("starting run");
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

/// Error type for log sink setup.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("log level must be an integer in 0..=5, got {0}")]
    LevelOutOfRange(u8),

    #[error("log file path `{0}` has no file name")]
    InvalidFilePath(PathBuf),

    #[error("a process-default logger is already installed")]
    AlreadyInstalled,

    #[error("failed to prepare log file: {0}")]
    Io(#[from] std::io::Error),
}

/// Which sinks to create, and how verbose each one is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogOptions {
    /// Write formatted events to standard output.
    pub console: bool,
    /// Minimum severity for the console sink (0–5).
    pub console_level: u8,
    /// Write events to this file, if set.
    pub file: Option<PathBuf>,
    /// Minimum severity for the file sink (0–5).
    pub file_level: u8,
    /// Prefix the file name with a `%Y%m%d_%H%M%S` timestamp.
    pub timestamped_file: bool,
    /// Restrict both sinks to events from one target (module path prefix).
    /// `None` keeps everything.
    pub target: Option<String>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            console: true,
            console_level: 2,
            file: None,
            file_level: 1,
            timestamped_file: false,
            target: None,
        }
    }
}

impl LogOptions {
    /// Assemble the configured sinks into a dispatch.
    ///
    /// Both levels are validated before any file is touched. Parent
    /// directories of the log file are created as needed; the file sink is
    /// a non-blocking appender whose worker guard lives in the returned
    /// [`LogSetup`].
    pub fn build(&self) -> Result<LogSetup, LogError> {
        let console_filter = self.sink_filter(self.console_level)?;
        let file_filter = self.sink_filter(self.file_level)?;

        let mut guards = Vec::new();
        let mut file_path = None;

        let console_layer = if self.console {
            Some(tracing_subscriber::fmt::layer().with_filter(console_filter))
        } else {
            None
        };

        let file_layer = match &self.file {
            Some(requested) => {
                let path = self.resolved_file_path(requested)?;
                let name = path
                    .file_name()
                    .ok_or_else(|| LogError::InvalidFilePath(requested.clone()))?
                    .to_os_string();
                let dir = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => {
                        fs::create_dir_all(parent)?;
                        parent.to_path_buf()
                    }
                    _ => PathBuf::from("."),
                };
                let (writer, guard) = tracing_appender::non_blocking(
                    tracing_appender::rolling::never(dir, name),
                );
                guards.push(guard);
                file_path = Some(path);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer)
                        .with_filter(file_filter),
                )
            }
            None => None,
        };

        let subscriber = tracing_subscriber::registry().with(console_layer).with(file_layer);
        Ok(LogSetup { dispatch: Dispatch::new(subscriber), guards, file_path })
    }

    fn sink_filter(&self, level: u8) -> Result<Targets, LogError> {
        let filter = level_filter(level)?;
        Ok(match &self.target {
            Some(target) => Targets::new().with_target(target.clone(), filter),
            None => Targets::new().with_default(filter),
        })
    }

    fn resolved_file_path(&self, requested: &Path) -> Result<PathBuf, LogError> {
        if !self.timestamped_file {
            return Ok(requested.to_path_buf());
        }
        let name = requested
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| LogError::InvalidFilePath(requested.to_path_buf()))?;
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Ok(requested.with_file_name(format!("{stamp}_{name}")))
    }
}

/// A built but not yet installed logging configuration.
pub struct LogSetup {
    dispatch: Dispatch,
    guards: Vec<WorkerGuard>,
    file_path: Option<PathBuf>,
}

impl LogSetup {
    /// The dispatch, for scoped use via `tracing::dispatcher::with_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// The resolved log file path (timestamp prefix applied), if a file
    /// sink was configured.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Promote this dispatch to the process default.
    ///
    /// Fails if a default was already installed. Keep the returned guard
    /// alive for the lifetime of the program: dropping it flushes and
    /// stops the file appender worker.
    pub fn install(self) -> Result<LogGuard, LogError> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())
            .map_err(|_| LogError::AlreadyInstalled)?;
        Ok(LogGuard { _appender_guards: self.guards })
    }
}

/// Keeps the file appender workers alive after [`LogSetup::install`].
pub struct LogGuard {
    _appender_guards: Vec<WorkerGuard>,
}

fn level_filter(level: u8) -> Result<LevelFilter, LogError> {
    Ok(match level {
        0 => LevelFilter::TRACE,
        1 => LevelFilter::DEBUG,
        2 => LevelFilter::INFO,
        3 => LevelFilter::WARN,
        4 | 5 => LevelFilter::ERROR,
        other => return Err(LogError::LevelOutOfRange(other)),
    })
}

#[cfg(test)]
mod tests {
    //! Unit tests for the logging module.
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_filter(0).unwrap(), LevelFilter::TRACE);
        assert_eq!(level_filter(2).unwrap(), LevelFilter::INFO);
        assert_eq!(level_filter(5).unwrap(), LevelFilter::ERROR);
    }

    #[test]
    fn test_out_of_range_level_fails_before_sink_creation() {
        let options = LogOptions {
            console_level: 6,
            file: Some(PathBuf::from("/nonexistent/dir/run.log")),
            ..LogOptions::default()
        };
        // The level error wins; the bogus file path is never touched.
        assert!(matches!(options.build(), Err(LogError::LevelOutOfRange(6))));
    }

    #[test]
    fn test_console_only_build() {
        let setup = LogOptions::default().build().unwrap();
        assert!(setup.file_path().is_none());
    }

    #[test]
    fn test_timestamped_file_name_prefix() {
        let options = LogOptions {
            timestamped_file: true,
            ..LogOptions::default()
        };
        let resolved = options.resolved_file_path(Path::new("logs/train.log")).unwrap();
        let name = resolved.file_name().and_then(|n| n.to_str()).unwrap();
        // 20260101_120000_train.log
        assert_eq!(name.len(), "20260101_120000_train.log".len());
        assert!(name.ends_with("_train.log"));
        assert!(name[..8].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: LogOptions = toml::from_str("file = \"run.log\"").unwrap();
        assert!(options.console);
        assert_eq!(options.console_level, 2);
        assert_eq!(options.file, Some(PathBuf::from("run.log")));
    }
}
