//! Wall-clock timing for training loops
//!
//! This module provides:
//! - **[`stopwatch`]**: a tic/toc stopwatch with running and lifetime
//!   accumulators, derived call rates, and RAII timed sections
//! - **[`sync`]**: the device synchronization capability a stopwatch may
//!   invoke at section boundaries (e.g. to flush queued accelerator work
//!   before reading the clock)
//!
//! ## Usage
//!
//! ```rust
//! use labkit::time::Stopwatch;
//!
//! let mut watch = Stopwatch::new();
//! {
//!     let _section = watch.section();
//!     // ... one training step ...
//! }
//! assert_eq!(watch.calls(), 1);
//! ```

pub mod stopwatch;
pub mod sync;

// Re-export commonly used items
pub use stopwatch::{Section, Stopwatch, StopwatchError};
pub use sync::DeviceSync;
