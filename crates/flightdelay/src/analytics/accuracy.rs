//! Per-flight accuracy and aggregate error metrics for delay estimates.

use serde::{Deserialize, Serialize};

use crate::record::FlightRecord;

/// Accuracy of one estimate as a percentage in `[0, 100]`.
///
/// A zero actual delay is all-or-nothing: 100 if the estimate is also zero,
/// 0 otherwise. Otherwise the relative error against `max(actual, 1)` is
/// subtracted from 100, floored at 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn evaluate_accuracy(actual: i64, estimated: i64) -> f64 {
    if actual == 0 {
        return if estimated == 0 { 100.0 } else { 0.0 };
    }
    let error = actual.abs_diff(estimated) as f64 / actual.max(1) as f64;
    (100.0 * (1.0 - error)).max(0.0)
}

/// Aggregate error of estimates over a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetrics {
    /// Mean absolute error, in minutes.
    pub mae: f64,
    /// Root-mean-square error, in minutes.
    pub rmse: f64,
}

/// Compute MAE and RMSE of `estimate` against each record's actual delay.
///
/// An empty collection yields `(0.0, 0.0)`.
#[allow(clippy::cast_precision_loss)]
pub fn error_metrics<F>(records: &[FlightRecord], estimate: F) -> ErrorMetrics
where
    F: Fn(&FlightRecord) -> i64,
{
    if records.is_empty() {
        return ErrorMetrics::default();
    }

    let (sum, sum_sq) = records.iter().fold((0.0, 0.0), |(sum, sum_sq), record| {
        let error = estimate(record).abs_diff(i64::from(record.actual_delay)) as f64;
        (sum + error, sum_sq + error * error)
    });
    let n = records.len() as f64;

    ErrorMetrics {
        mae: sum / n,
        rmse: (sum_sq / n).sqrt(),
    }
}
