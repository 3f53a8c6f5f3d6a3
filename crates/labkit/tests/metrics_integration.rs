//! Integration tests for the `metrics` module.
//!
//! These walk the accumulator through the lifecycle a training loop
//! exercises: construction, interleaved scalar and series updates, aggregate
//! queries with and without axis reduction, and reset.

use labkit::metrics::{Accumulator, MetricInit, MetricsError};
use serde_json::json;

/// The canonical two-metric scenario: a scalar `loss` and a series
/// `acc_list`, updated twice, then queried.
#[test]
fn test_scalar_and_series_accumulation() {
    let mut acc = Accumulator::new([
        ("loss", MetricInit::Scalar(0.0)),
        ("acc_list", MetricInit::series()),
    ]);

    acc.update([("loss", 1.0), ("acc_list", 0.8)]).unwrap();
    acc.update([("loss", 3.0), ("acc_list", 0.6)]).unwrap();

    assert_eq!(acc.sum("loss", None).unwrap().as_value(), Some(4.0));
    assert_eq!(acc.mean("loss", None).unwrap().as_value(), Some(2.0));

    let series_mean = acc.mean("acc_list", None).unwrap().as_value().unwrap();
    assert!((series_mean - 0.7).abs() < 1e-12);

    // Population std of [0.8, 0.6] is 0.1 exactly.
    let series_std = acc.std("acc_list", None).unwrap().as_value().unwrap();
    assert!((series_std - 0.1).abs() < 1e-12);
}

/// After reset, sums are zero, the counter is zero, and a scalar mean is the
/// division-by-zero error again — identical to a freshly built accumulator.
#[test]
fn test_reset_matches_fresh_construction() {
    let mut acc = Accumulator::new([
        ("loss", MetricInit::Scalar(0.0)),
        ("acc_list", MetricInit::series()),
    ]);
    acc.update([("loss", 1.0), ("acc_list", 0.8)]).unwrap();
    acc.update([("loss", 3.0), ("acc_list", 0.6)]).unwrap();

    acc.reset();

    assert_eq!(acc.sum("loss", None).unwrap().as_value(), Some(0.0));
    assert_eq!(acc.sum("acc_list", None).unwrap().as_value(), Some(0.0));
    assert_eq!(acc.count("loss").unwrap(), 0);
    assert!(matches!(acc.mean("loss", None), Err(MetricsError::NoUpdates(_))));
}

/// Scalar-mode sums and means track N updates exactly.
#[test]
fn test_scalar_running_total_over_many_updates() {
    let mut acc = Accumulator::new([("loss", MetricInit::Scalar(0.0))]);
    let values = [0.9, 0.7, 0.5, 0.4, 0.35];
    for v in values {
        acc.record("loss", v).unwrap();
    }

    let expected_sum: f64 = values.iter().sum();
    let total = acc.sum("loss", None).unwrap().as_value().unwrap();
    assert!((total - expected_sum).abs() < 1e-12);

    let mean = acc.mean("loss", None).unwrap().as_value().unwrap();
    assert!((mean - expected_sum / values.len() as f64).abs() < 1e-12);
}

/// Series metrics with vector samples reduce along either axis.
#[test]
fn test_vector_series_axis_reduction() {
    let mut acc = Accumulator::new([("per_class_acc", MetricInit::series())]);
    acc.record("per_class_acc", vec![1.0, 0.0, 1.0]).unwrap();
    acc.record("per_class_acc", vec![0.0, 1.0, 1.0]).unwrap();

    // Over everything: 4 correct out of 6.
    let mean = acc.mean("per_class_acc", None).unwrap().as_value().unwrap();
    assert!((mean - 4.0 / 6.0).abs() < 1e-12);

    // Axis 0: per-class means across the two batches.
    let per_class = acc.mean("per_class_acc", Some(0)).unwrap();
    let tensor = per_class.as_tensor().unwrap();
    assert_eq!(tensor.as_slice().unwrap(), &[0.5, 0.5, 1.0]);

    // Axis 0 std: classes 0 and 1 flip between batches, class 2 does not.
    let std = acc.std("per_class_acc", Some(0)).unwrap();
    assert_eq!(std.as_tensor().unwrap().as_slice().unwrap(), &[0.5, 0.5, 0.0]);
}

/// JSON construction mirrors the typed constructor, including rejection of
/// non-numeric initializers.
#[test]
fn test_json_construction_round() {
    let mut acc = Accumulator::from_value(&json!({"loss": 0, "acc_list": []})).unwrap();
    acc.update([("loss", 1.0), ("acc_list", 0.8)]).unwrap();
    acc.update([("loss", 3.0), ("acc_list", 0.6)]).unwrap();
    assert_eq!(acc.sum("loss", None).unwrap().as_value(), Some(4.0));

    assert!(matches!(
        Accumulator::from_value(&json!({"loss": 0, "tag": "baseline"})),
        Err(MetricsError::UnsupportedInit { .. })
    ));
}

/// Updating a key that was never registered is an error and leaves the
/// accumulator untouched.
#[test]
fn test_unknown_keys_never_materialize() {
    let mut acc = Accumulator::new([("loss", MetricInit::Scalar(0.0))]);
    assert!(matches!(
        acc.update([("loss", 1.0), ("grad_norm", 2.0)]),
        Err(MetricsError::UnknownMetric(_))
    ));
    assert!(!acc.contains("grad_norm"));
    // Keys ahead of the failing one were applied independently.
    assert_eq!(acc.sum("loss", None).unwrap().as_value(), Some(1.0));
}

/// `std` stays an error for scalar metrics regardless of update count, and
/// the ordered/mapped multi-key forms agree with the single-key form.
#[test]
fn test_std_restriction_and_multi_key_forms() {
    let mut acc = Accumulator::new([
        ("loss", MetricInit::Scalar(0.0)),
        ("acc_list", MetricInit::series()),
    ]);
    acc.update([("loss", 1.0), ("acc_list", 0.8)]).unwrap();
    acc.update([("loss", 3.0), ("acc_list", 0.6)]).unwrap();

    assert!(matches!(acc.std("loss", None), Err(MetricsError::ScalarStd(_))));
    // A multi-key std that includes a scalar key fails the same way.
    assert!(matches!(
        acc.std_many(&["acc_list", "loss"], None),
        Err(MetricsError::ScalarStd(_))
    ));

    let means = acc.mean_many(&["loss", "acc_list"], None).unwrap();
    let mapped = acc.mean_by_key(&["loss", "acc_list"], None).unwrap();
    assert_eq!(means[0], mapped["loss"]);
    assert_eq!(means[1], mapped["acc_list"]);

    let stds = acc.std_by_key(&["acc_list"], None).unwrap();
    assert!((stds["acc_list"].as_value().unwrap() - 0.1).abs() < 1e-12);
}
