//! Flight delay analytics.
//!
//! Pure, synchronous transformations over a snapshot of flight records:
//!
//! - **Sorting**: stable hybrid insertion/merge sort by a record field
//!   ([`sort_by_delay`], [`sort_records`]).
//! - **Top-K**: the `k` largest delays without a full sort ([`top_delays`]).
//! - **Frequent offenders**: airlines that often run more than 30 minutes
//!   late, found with a bounded Misra-Gries summary and recounted exactly
//!   ([`frequent_delayed_airlines`]).
//! - **Estimation**: closed-form delay estimate from risk factors and airline
//!   history ([`estimate_delay`]).
//! - **Accuracy**: per-flight accuracy and MAE/RMSE ([`evaluate_accuracy`],
//!   [`error_metrics`]).
//!
//! None of these functions call each other or hold state between calls. The
//! airline history they read is owned by the caller.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use flightdelay::analytics::{sort_by_delay, top_delays, SortDirection};
//! use flightdelay::record::{Airline, Airport, FlightRecord};
//!
//! let flight = |id: &str, delay| {
//!     FlightRecord::new(id, Airline::Tarom, Airport::OTP, Airport::CLJ, Utc::now(), delay, 1.0, 2.0, 3.0)
//! };
//! let records = vec![flight("A", 100)?, flight("B", 100)?, flight("C", 50)?];
//!
//! let sorted = sort_by_delay(&records, SortDirection::Descending);
//! assert_eq!(sorted[0].id, "A");
//! assert_eq!(top_delays(&records, 2)?.len(), 2);
//! # Ok::<(), flightdelay::Error>(())
//! ```

mod accuracy;
mod estimate;
mod frequent;
mod sort;
mod top_k;

pub use accuracy::{error_metrics, evaluate_accuracy, ErrorMetrics};
pub use estimate::{estimate_delay, MAX_ESTIMATE_MINUTES};
pub use frequent::{frequent_delayed_airlines, MisraGries, DEFAULT_FREQUENT_K, HIGH_DELAY_MINUTES};
pub use sort::{hybrid_sort_by, sort_by_delay, sort_records, SortDirection, SortKey, RUN};
pub use top_k::{select_top_k, top_delays};

use crate::error::{Error, Result};

/// Convert a caller-supplied `k` into a count, rejecting negative values.
fn checked_k(k: i64) -> Result<usize> {
    usize::try_from(k).map_err(|_| Error::invalid_argument("k", k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_k() {
        assert_eq!(checked_k(0).unwrap(), 0);
        assert_eq!(checked_k(7).unwrap(), 7);
        assert!(checked_k(-1).unwrap_err().is_invalid_argument());
    }
}
