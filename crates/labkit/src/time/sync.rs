//! Device synchronization capability
//!
//! Accelerator runtimes queue work asynchronously, so a wall-clock split
//! taken around a kernel launch measures dispatch, not execution. A
//! [`DeviceSync`] hook lets the stopwatch drain the device queue before
//! reading the clock.
//!
//! The capability is resolved once, when the hook is installed on a
//! [`Stopwatch`](super::Stopwatch); there is no per-call probing. A
//! stopwatch without a hook degrades gracefully: synced sections log a
//! warning and run unsynced.

/// A barrier that blocks until previously queued device work has finished.
///
/// Implemented by whatever owns the accelerator runtime. Any `Fn()` closure
/// works too:
///
/// ```rust
/// use std::sync::Arc;
///
/// use labkit::time::{DeviceSync, Stopwatch};
///
/// let hook: Arc<dyn DeviceSync> = Arc::new(|| {
///     // e.g. cuda::synchronize()
/// });
/// let mut watch = Stopwatch::new().with_device_sync(hook);
/// let _section = watch.section_synced();
/// ```
pub trait DeviceSync: Send + Sync {
    /// Block until all queued device work is complete.
    fn synchronize(&self);
}

impl<F> DeviceSync for F
where
    F: Fn() + Send + Sync,
{
    fn synchronize(&self) {
        self()
    }
}
