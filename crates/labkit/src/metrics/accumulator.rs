//! The metric accumulator
//!
//! Keys are registered once at construction and keep their mode (scalar or
//! series) for the lifetime of the accumulator. Updating an unregistered key
//! is an error, never an implicit creation.

use std::collections::BTreeMap;

use ndarray::{ArrayD, Axis};
use thiserror::Error;

use super::sample::{Aggregate, Sample};

/// Error type for accumulator construction, updates and queries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MetricsError {
    #[error("unknown metric `{0}`")]
    UnknownMetric(String),

    #[error("accumulator initializer must be an object, got {0}")]
    NotAnObject(String),

    #[error(
        "metric `{key}` cannot be initialized from {found}; \
         expected a number or a sequence of numbers"
    )]
    UnsupportedInit { key: String, found: String },

    #[error("scalar metric `{0}` only accepts 0-dimensional samples")]
    NonScalarUpdate(String),

    #[error("metric `{0}` has no updates; mean would divide by zero")]
    NoUpdates(String),

    #[error("std is not defined for scalar metric `{0}`; use a series metric")]
    ScalarStd(String),

    #[error("series metric `{0}` is empty")]
    EmptySeries(String),

    #[error("series metric `{0}` holds samples of differing shapes")]
    RaggedSeries(String),

    #[error("axis {axis} is out of bounds for metric `{key}` ({ndim} dimensions)")]
    AxisOutOfBounds { key: String, axis: usize, ndim: usize },
}

/// Initial state for one metric, deciding its mode for good.
#[derive(Debug, Clone)]
pub enum MetricInit {
    /// A running total, usually seeded with zero.
    Scalar(f64),
    /// An ordered series of samples, usually seeded empty.
    Series(Vec<Sample>),
}

impl MetricInit {
    /// An empty series metric.
    pub fn series() -> Self {
        Self::Series(Vec::new())
    }
}

impl From<f64> for MetricInit {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<i64> for MetricInit {
    fn from(value: i64) -> Self {
        Self::Scalar(value as f64)
    }
}

impl From<Vec<f64>> for MetricInit {
    fn from(values: Vec<f64>) -> Self {
        Self::Series(values.into_iter().map(Sample::from).collect())
    }
}

#[derive(Debug, Clone)]
enum MetricValue {
    Scalar { total: f64 },
    Series { samples: Vec<Sample> },
}

#[derive(Debug, Clone)]
struct Metric {
    value: MetricValue,
    count: u64,
}

impl Metric {
    fn from_init(init: MetricInit) -> Self {
        let value = match init {
            MetricInit::Scalar(total) => MetricValue::Scalar { total },
            MetricInit::Series(samples) => MetricValue::Series { samples },
        };
        // Seed values never count as updates.
        Self { value, count: 0 }
    }
}

/// Tracks named metrics as running scalar totals or growing sample series,
/// with a per-key update count.
///
/// Single-threaded by design: no interior locking, synchronous queries only.
///
/// # Examples
///
/// ```rust
/// use labkit::metrics::{Accumulator, MetricInit};
///
/// let mut acc = Accumulator::new([("loss", MetricInit::Scalar(0.0))]);
/// acc.record("loss", 2.5).unwrap();
/// assert_eq!(acc.sum("loss", None).unwrap().as_value(), Some(2.5));
/// assert_eq!(acc.count("loss").unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    metrics: BTreeMap<String, Metric>,
}

impl Accumulator {
    /// Register the given metrics. Each key's mode (scalar or series) is
    /// fixed here and never changes.
    pub fn new<I, K>(initial: I) -> Self
    where
        I: IntoIterator<Item = (K, MetricInit)>,
        K: Into<String>,
    {
        let metrics = initial
            .into_iter()
            .map(|(key, init)| (key.into(), Metric::from_init(init)))
            .collect();
        Self { metrics }
    }

    /// Build an accumulator from a JSON object: numbers become scalar
    /// metrics, arrays of numbers become seeded series metrics.
    ///
    /// Anything else fails before any key is registered.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, MetricsError> {
        let object = value
            .as_object()
            .ok_or_else(|| MetricsError::NotAnObject(json_type_name(value).to_string()))?;

        let mut metrics = BTreeMap::new();
        for (key, entry) in object {
            let init = match entry {
                serde_json::Value::Number(n) => {
                    let v = n.as_f64().ok_or_else(|| MetricsError::UnsupportedInit {
                        key: key.clone(),
                        found: "number".to_string(),
                    })?;
                    MetricInit::Scalar(v)
                }
                serde_json::Value::Array(items) => {
                    let seed = items
                        .iter()
                        .map(|item| {
                            item.as_f64().ok_or_else(|| MetricsError::UnsupportedInit {
                                key: key.clone(),
                                found: json_type_name(item).to_string(),
                            })
                        })
                        .collect::<Result<Vec<f64>, _>>()?;
                    MetricInit::Series(seed.into_iter().map(Sample::from).collect())
                }
                other => {
                    return Err(MetricsError::UnsupportedInit {
                        key: key.clone(),
                        found: json_type_name(other).to_string(),
                    })
                }
            };
            metrics.insert(key.clone(), Metric::from_init(init));
        }
        Ok(Self { metrics })
    }

    /// Registered metric names, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.metrics.contains_key(key)
    }

    /// Number of `update`/`record` calls that touched `key`.
    pub fn count(&self, key: &str) -> Result<u64, MetricsError> {
        Ok(self.metric(key)?.count)
    }

    /// Whether `key` is a series metric.
    pub fn is_series(&self, key: &str) -> Result<bool, MetricsError> {
        Ok(matches!(self.metric(key)?.value, MetricValue::Series { .. }))
    }

    /// Record one sample for one key: series metrics append, scalar metrics
    /// add (the sample must be 0-dimensional). Bumps the key's counter.
    pub fn record(&mut self, key: &str, sample: impl Into<Sample>) -> Result<(), MetricsError> {
        let sample = sample.into();
        let metric = self
            .metrics
            .get_mut(key)
            .ok_or_else(|| MetricsError::UnknownMetric(key.to_string()))?;

        match &mut metric.value {
            MetricValue::Scalar { total } => {
                if sample.ndim() != 0 {
                    return Err(MetricsError::NonScalarUpdate(key.to_string()));
                }
                *total += sample.array().sum();
            }
            MetricValue::Series { samples } => samples.push(sample),
        }
        metric.count += 1;
        Ok(())
    }

    /// Record samples for several keys. Keys are applied independently and
    /// in iteration order; an unknown key stops the walk at that entry.
    pub fn update<'a, I, S>(&mut self, updates: I) -> Result<(), MetricsError>
    where
        I: IntoIterator<Item = (&'a str, S)>,
        S: Into<Sample>,
    {
        for (key, sample) in updates {
            self.record(key, sample)?;
        }
        Ok(())
    }

    /// Return every metric to its zero state: series emptied, scalars
    /// zeroed, counters zeroed. Key set and modes are preserved.
    pub fn reset(&mut self) {
        for metric in self.metrics.values_mut() {
            match &mut metric.value {
                MetricValue::Scalar { total } => *total = 0.0,
                MetricValue::Series { samples } => samples.clear(),
            }
            metric.count = 0;
        }
    }

    /// Sum of a metric.
    ///
    /// Scalar metrics return the running total directly (`axis` is ignored;
    /// there is only one value). Series metrics stack their samples into
    /// shape `(n, ..sample shape)` and sum fully or along `axis`; an empty
    /// series sums to `0.0`.
    pub fn sum(&self, key: &str, axis: Option<usize>) -> Result<Aggregate, MetricsError> {
        match &self.metric(key)?.value {
            MetricValue::Scalar { total } => Ok(Aggregate::Value(*total)),
            MetricValue::Series { samples } => {
                if samples.is_empty() {
                    return match axis {
                        None | Some(0) => Ok(Aggregate::Value(0.0)),
                        Some(axis) => {
                            Err(MetricsError::AxisOutOfBounds { key: key.to_string(), axis, ndim: 1 })
                        }
                    };
                }
                let stacked = stack_samples(key, samples)?;
                match axis {
                    None => Ok(Aggregate::Value(stacked.sum())),
                    Some(axis) => {
                        check_axis(key, axis, stacked.ndim())?;
                        Ok(Aggregate::from_array(stacked.sum_axis(Axis(axis))))
                    }
                }
            }
        }
    }

    /// Mean of a metric.
    ///
    /// Scalar metrics divide the running total by the update count; a zero
    /// count is an error, not a default. Series metrics take the arithmetic
    /// mean of the stacked samples, fully or along `axis`.
    pub fn mean(&self, key: &str, axis: Option<usize>) -> Result<Aggregate, MetricsError> {
        match &self.metric(key)?.value {
            MetricValue::Scalar { total } => {
                let count = self.metric(key)?.count;
                if count == 0 {
                    return Err(MetricsError::NoUpdates(key.to_string()));
                }
                Ok(Aggregate::Value(total / count as f64))
            }
            MetricValue::Series { samples } => {
                if samples.is_empty() {
                    return Err(MetricsError::EmptySeries(key.to_string()));
                }
                let stacked = stack_samples(key, samples)?;
                match axis {
                    None => stacked
                        .mean()
                        .map(Aggregate::Value)
                        .ok_or_else(|| MetricsError::EmptySeries(key.to_string())),
                    Some(axis) => {
                        check_axis(key, axis, stacked.ndim())?;
                        stacked
                            .mean_axis(Axis(axis))
                            .map(Aggregate::from_array)
                            .ok_or_else(|| MetricsError::EmptySeries(key.to_string()))
                    }
                }
            }
        }
    }

    /// Population standard deviation of a series metric (divide by N).
    ///
    /// Always fails for scalar metrics: a single running total has no
    /// spread. Callers that need variance must record in series mode.
    pub fn std(&self, key: &str, axis: Option<usize>) -> Result<Aggregate, MetricsError> {
        match &self.metric(key)?.value {
            MetricValue::Scalar { .. } => Err(MetricsError::ScalarStd(key.to_string())),
            MetricValue::Series { samples } => {
                if samples.is_empty() {
                    return Err(MetricsError::EmptySeries(key.to_string()));
                }
                let stacked = stack_samples(key, samples)?;
                match axis {
                    None => Ok(Aggregate::Value(population_std(&stacked))),
                    Some(axis) => {
                        check_axis(key, axis, stacked.ndim())?;
                        Ok(Aggregate::from_array(stacked.std_axis(Axis(axis), 0.0)))
                    }
                }
            }
        }
    }

    /// Per-key sums for several metrics, in the given order.
    pub fn sum_many(
        &self,
        keys: &[&str],
        axis: Option<usize>,
    ) -> Result<Vec<Aggregate>, MetricsError> {
        keys.iter().map(|key| self.sum(key, axis)).collect()
    }

    /// Per-key means for several metrics, in the given order.
    pub fn mean_many(
        &self,
        keys: &[&str],
        axis: Option<usize>,
    ) -> Result<Vec<Aggregate>, MetricsError> {
        keys.iter().map(|key| self.mean(key, axis)).collect()
    }

    /// Per-key means keyed by metric name.
    pub fn mean_by_key(
        &self,
        keys: &[&str],
        axis: Option<usize>,
    ) -> Result<BTreeMap<String, Aggregate>, MetricsError> {
        keys.iter()
            .map(|key| Ok(((*key).to_string(), self.mean(key, axis)?)))
            .collect()
    }

    /// Per-key standard deviations for several metrics, in the given order.
    pub fn std_many(
        &self,
        keys: &[&str],
        axis: Option<usize>,
    ) -> Result<Vec<Aggregate>, MetricsError> {
        keys.iter().map(|key| self.std(key, axis)).collect()
    }

    /// Per-key standard deviations keyed by metric name.
    pub fn std_by_key(
        &self,
        keys: &[&str],
        axis: Option<usize>,
    ) -> Result<BTreeMap<String, Aggregate>, MetricsError> {
        keys.iter()
            .map(|key| Ok(((*key).to_string(), self.std(key, axis)?)))
            .collect()
    }

    fn metric(&self, key: &str) -> Result<&Metric, MetricsError> {
        self.metrics
            .get(key)
            .ok_or_else(|| MetricsError::UnknownMetric(key.to_string()))
    }
}

fn stack_samples(key: &str, samples: &[Sample]) -> Result<ArrayD<f64>, MetricsError> {
    let views: Vec<_> = samples.iter().map(|sample| sample.array().view()).collect();
    ndarray::stack(Axis(0), &views).map_err(|_| MetricsError::RaggedSeries(key.to_string()))
}

fn check_axis(key: &str, axis: usize, ndim: usize) -> Result<(), MetricsError> {
    if axis >= ndim {
        return Err(MetricsError::AxisOutOfBounds { key: key.to_string(), axis, ndim });
    }
    Ok(())
}

fn population_std(array: &ArrayD<f64>) -> f64 {
    let n = array.len() as f64;
    let mean = array.sum() / n;
    let variance = array.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
