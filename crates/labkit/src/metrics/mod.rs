//! Running-statistics accumulator for training metrics
//!
//! This module tracks a set of named metrics, each in one of two modes fixed
//! at construction:
//! - **scalar**: a single running total plus an update count
//! - **series**: an ordered, growing list of [`Sample`]s
//!
//! Aggregate queries ([`Accumulator::sum`], [`Accumulator::mean`],
//! [`Accumulator::std`]) reduce either the running total or the stacked
//! samples, optionally along one axis when samples are multi-dimensional.
//! Standard deviation is population std (divide by N, not N-1) and is only
//! defined for series metrics.
//!
//! ## Usage
//!
//! ```rust
//! use labkit::metrics::{Accumulator, MetricInit};
//!
//! let mut acc = Accumulator::new([
//!     ("loss", MetricInit::Scalar(0.0)),
//!     ("batch_acc", MetricInit::series()),
//! ]);
//!
//! acc.update([("loss", 1.0), ("batch_acc", 0.8)]).unwrap();
//! acc.update([("loss", 3.0), ("batch_acc", 0.6)]).unwrap();
//!
//! assert_eq!(acc.sum("loss", None).unwrap().as_value(), Some(4.0));
//! assert_eq!(acc.mean("loss", None).unwrap().as_value(), Some(2.0));
//! assert_eq!(acc.mean("batch_acc", None).unwrap().as_value(), Some(0.7));
//! ```

pub mod accumulator;
pub mod sample;

// Re-export commonly used items
pub use accumulator::{Accumulator, MetricInit, MetricsError};
pub use sample::{Aggregate, Sample};
