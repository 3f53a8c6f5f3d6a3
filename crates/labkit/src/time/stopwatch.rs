//! Tic/toc stopwatch
//!
//! Accumulates elapsed wall-clock time across repeated measurements and
//! derives per-call rates on demand. `reset` clears the running counters;
//! the lifetime totals survive it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::warn;

use super::sync::DeviceSync;

/// Error type for stopwatch misuse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StopwatchError {
    #[error("toc called before tic; the stopwatch was never started")]
    NotStarted,
}

/// A simple stopwatch.
///
/// # Examples
///
/// ```rust
/// use labkit::time::Stopwatch;
///
/// let mut watch = Stopwatch::new();
/// watch.tic();
/// // ... timed work ...
/// let split = watch.toc().unwrap();
/// assert!(split >= std::time::Duration::ZERO);
/// assert_eq!(watch.calls(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Stopwatch {
    started: Option<Instant>,
    last_split: Duration,
    acc: Duration,
    calls: u64,
    // Lifetime counters, not affected by reset().
    lifetime_acc: Duration,
    lifetime_calls: u64,
    sync: Option<Arc<dyn DeviceSync>>,
}

impl std::fmt::Debug for Stopwatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stopwatch")
            .field("started", &self.started)
            .field("last_split", &self.last_split)
            .field("acc", &self.acc)
            .field("calls", &self.calls)
            .field("lifetime_acc", &self.lifetime_acc)
            .field("lifetime_calls", &self.lifetime_calls)
            .field("has_sync", &self.sync.is_some())
            .finish()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the device synchronization hook. Resolved once here;
    /// synced sections reuse it for the stopwatch's lifetime.
    #[must_use]
    pub fn with_device_sync(mut self, hook: Arc<dyn DeviceSync>) -> Self {
        self.sync = Some(hook);
        self
    }

    /// Start (or restart) the clock.
    pub fn tic(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Stop the clock: returns the split since the last `tic`, folds it
    /// into the running and lifetime accumulators, and bumps both call
    /// counters. Fails if `tic` was never called.
    pub fn toc(&mut self) -> Result<Duration, StopwatchError> {
        let started = self.started.ok_or(StopwatchError::NotStarted)?;
        let split = started.elapsed();
        self.last_split = split;
        self.acc += split;
        self.lifetime_acc += split;
        self.calls += 1;
        self.lifetime_calls += 1;
        Ok(split)
    }

    /// The most recent split.
    pub fn last_split(&self) -> Duration {
        self.last_split
    }

    /// Accumulated time since construction or the last `reset`.
    pub fn accumulated(&self) -> Duration {
        self.acc
    }

    /// Completed measurements since construction or the last `reset`.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// Accumulated time over the stopwatch's whole lifetime.
    pub fn total_time(&self) -> Duration {
        self.lifetime_acc
    }

    /// Completed measurements over the stopwatch's whole lifetime.
    pub fn total_calls(&self) -> u64 {
        self.lifetime_calls
    }

    /// Average seconds per measurement; `0.0` before the first `toc`.
    pub fn seconds_per_call(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.acc.as_secs_f64() / self.calls as f64
        }
    }

    /// Measurements per accumulated second; `0.0` while no time has
    /// accumulated.
    pub fn calls_per_second(&self) -> f64 {
        let secs = self.acc.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.calls as f64 / secs
        }
    }

    /// Clear the running counters and the last split. The lifetime totals
    /// and the sync hook are untouched.
    pub fn reset(&mut self) {
        self.started = None;
        self.last_split = Duration::ZERO;
        self.acc = Duration::ZERO;
        self.calls = 0;
    }

    /// Time a scope: `tic` now, `toc` when the returned guard drops.
    pub fn section(&mut self) -> Section<'_> {
        self.start_section(false)
    }

    /// Like [`section`](Self::section), but drains the device queue on
    /// entry and again before stopping the clock. If no hook is installed
    /// the section logs a warning and runs unsynced.
    pub fn section_synced(&mut self) -> Section<'_> {
        self.start_section(true)
    }

    fn start_section(&mut self, want_sync: bool) -> Section<'_> {
        let sync = if want_sync {
            match &self.sync {
                Some(hook) => Some(Arc::clone(hook)),
                None => {
                    warn!("no device sync hook installed; synchronization disabled for this section");
                    None
                }
            }
        } else {
            None
        };

        if let Some(hook) = &sync {
            hook.synchronize();
        }
        self.tic();
        Section { watch: self, sync }
    }
}

/// RAII guard for one timed section of a [`Stopwatch`].
#[must_use = "the section is timed until this guard is dropped"]
pub struct Section<'a> {
    watch: &'a mut Stopwatch,
    sync: Option<Arc<dyn DeviceSync>>,
}

impl Drop for Section<'_> {
    fn drop(&mut self) {
        if let Some(hook) = &self.sync {
            hook.synchronize();
        }
        // tic ran in start_section, so NotStarted is unreachable here.
        let _ = self.watch.toc();
    }
}
