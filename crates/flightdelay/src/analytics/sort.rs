//! Hybrid insertion/merge sort over flight records.
//!
//! The input is cut into runs of [`RUN`] elements, each run is insertion
//! sorted, then adjacent runs are merged with doubling width until one run
//! covers the whole slice.
//!
//! Both phases are stable for either direction: insertion sort flips the
//! comparison instead of reversing afterwards, and the merge always takes the
//! left element when keys are equal.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::record::FlightRecord;

/// Length of the insertion-sorted runs.
pub const RUN: usize = 32;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest key first.
    Ascending,
    /// Largest key first.
    #[default]
    Descending,
}

impl SortDirection {
    /// Whether `a` must be placed strictly after `b`.
    fn after(self, a: Ordering) -> bool {
        match self {
            Self::Ascending => a == Ordering::Greater,
            Self::Descending => a == Ordering::Less,
        }
    }
}

/// The record field used as the sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Observed delay in minutes.
    #[default]
    ActualDelay,
    /// Weather risk factor.
    WeatherScore,
    /// Traffic risk factor.
    TrafficScore,
    /// Technical risk factor.
    TechnicalScore,
    /// Scheduled departure time.
    ScheduledTime,
}

impl SortKey {
    /// Compare two records by this key.
    #[must_use]
    pub fn compare(self, a: &FlightRecord, b: &FlightRecord) -> Ordering {
        match self {
            Self::ActualDelay => a.actual_delay.cmp(&b.actual_delay),
            Self::WeatherScore => a.weather_score.total_cmp(&b.weather_score),
            Self::TrafficScore => a.traffic_score.total_cmp(&b.traffic_score),
            Self::TechnicalScore => a.technical_score.total_cmp(&b.technical_score),
            Self::ScheduledTime => a.scheduled_time.cmp(&b.scheduled_time),
        }
    }
}

/// Sort `items` in place with the hybrid run/merge scheme.
///
/// Elements that compare equal keep their input order.
pub fn hybrid_sort_by<T, F>(items: &mut [T], compare: F, direction: SortDirection)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let n = items.len();

    for run in items.chunks_mut(RUN) {
        insertion_sort(run, &compare, direction);
    }

    let mut size = RUN;
    while size < n {
        let mut left = 0;
        while left < n {
            let mid = left + size;
            let right = (left + 2 * size).min(n);
            if mid < right {
                merge(&mut items[left..right], size, &compare, direction);
            }
            left += 2 * size;
        }
        size *= 2;
    }
}

fn insertion_sort<T, F>(run: &mut [T], compare: &F, direction: SortDirection)
where
    F: Fn(&T, &T) -> Ordering,
{
    for i in 1..run.len() {
        let mut j = i;
        while j > 0 && direction.after(compare(&run[j - 1], &run[i])) {
            j -= 1;
        }
        // Moves without cloning; equal elements are never passed over.
        run[j..=i].rotate_right(1);
    }
}

/// Merge the sorted halves `slice[..mid]` and `slice[mid..]`.
fn merge<T, F>(slice: &mut [T], mid: usize, compare: &F, direction: SortDirection)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let left = slice[..mid].to_vec();
    let right = slice[mid..].to_vec();

    let (mut i, mut j) = (0, 0);
    for slot in slice.iter_mut() {
        let take_left = match (left.get(i), right.get(j)) {
            (Some(l), Some(r)) => !direction.after(compare(l, r)),
            (Some(_), None) => true,
            _ => false,
        };
        if take_left {
            *slot = left[i].clone();
            i += 1;
        } else {
            *slot = right[j].clone();
            j += 1;
        }
    }
}

/// Return a copy of `records` ordered by `key`.
#[must_use]
pub fn sort_records(
    records: &[FlightRecord],
    key: SortKey,
    direction: SortDirection,
) -> Vec<FlightRecord> {
    let mut sorted = records.to_vec();
    hybrid_sort_by(&mut sorted, |a, b| key.compare(a, b), direction);
    sorted
}

/// Return a copy of `records` ordered by observed delay.
#[must_use]
pub fn sort_by_delay(records: &[FlightRecord], direction: SortDirection) -> Vec<FlightRecord> {
    sort_records(records, SortKey::ActualDelay, direction)
}
