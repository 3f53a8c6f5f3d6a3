//! Sample and aggregate value types
//!
//! A [`Sample`] is one recorded observation: a scalar, a vector, or any
//! higher-dimensional tensor. Queries over a metric return an [`Aggregate`],
//! which collapses to a plain `f64` whenever the reduction produces a single
//! number.

use ndarray::{arr0, Array1, ArrayD};

/// One recorded observation for a metric.
///
/// Wraps a dynamically-dimensioned `f64` array so that scalar losses and
/// per-class vectors can share one storage type. Conversions exist from
/// `f64`, `i64`, `Vec<f64>` and `ArrayD<f64>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample(ArrayD<f64>);

impl Sample {
    /// The underlying array.
    pub fn array(&self) -> &ArrayD<f64> {
        &self.0
    }

    /// Number of dimensions (0 for a scalar sample).
    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }

    pub fn into_array(self) -> ArrayD<f64> {
        self.0
    }
}

impl From<f64> for Sample {
    fn from(value: f64) -> Self {
        Self(arr0(value).into_dyn())
    }
}

impl From<i64> for Sample {
    fn from(value: i64) -> Self {
        Self::from(value as f64)
    }
}

impl From<Vec<f64>> for Sample {
    fn from(values: Vec<f64>) -> Self {
        Self(Array1::from_vec(values).into_dyn())
    }
}

impl From<ArrayD<f64>> for Sample {
    fn from(array: ArrayD<f64>) -> Self {
        Self(array)
    }
}

/// Result of an aggregate query over one metric.
///
/// Full reductions (no axis, or an axis reduction that leaves no remaining
/// dimensions) yield `Value`; partial axis reductions yield `Tensor`.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// A single reduced number.
    Value(f64),
    /// A partially reduced tensor.
    Tensor(ArrayD<f64>),
}

impl Aggregate {
    /// The reduced number, if this aggregate collapsed to one.
    pub fn as_value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Tensor(_) => None,
        }
    }

    /// The partially reduced tensor, if any dimensions remain.
    pub fn as_tensor(&self) -> Option<&ArrayD<f64>> {
        match self {
            Self::Value(_) => None,
            Self::Tensor(t) => Some(t),
        }
    }

    /// Collapse a reduction result, turning 0-dimensional tensors into
    /// plain values.
    pub(crate) fn from_array(array: ArrayD<f64>) -> Self {
        if array.ndim() == 0 {
            Self::Value(array.sum())
        } else {
            Self::Tensor(array)
        }
    }
}
