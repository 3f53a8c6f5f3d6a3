//! Experiment-support utilities shared across research training loops.
//!
//! # Modules
//!
//! - [`metrics`]: running-statistics accumulator with scalar and series
//!   metrics (sum / mean / population std, optional axis reduction)
//! - [`time`]: tic/toc stopwatch with RAII timed sections and an optional
//!   device synchronization hook
//! - [`config`]: read-only nested configuration tree built from JSON or TOML
//! - [`logging`]: console/file log sink setup on top of `tracing`
//! - [`backup`]: source-file snapshot helper for experiment run directories
//!
//! Each component is a self-contained convenience wrapper: there is no
//! internal locking and no background work. An instance is expected to be
//! owned and mutated by one logical caller (typically one training loop);
//! callers that share across threads must serialize access themselves.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod backup;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod time;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use backup::{snapshot_sources, BackupError, SnapshotReport};
pub use config::{ConfigError, ConfigTree, ConfigValue};
pub use logging::{LogError, LogGuard, LogOptions, LogSetup};
pub use metrics::{Accumulator, Aggregate, MetricInit, MetricsError, Sample};
pub use time::{DeviceSync, Section, Stopwatch, StopwatchError};
