//! Top-K selection by observed delay.
//!
//! Keeps a min-heap of at most `k` entries so selection costs O(n log k)
//! instead of a full sort. On equal delays the record seen first wins.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tracing::debug;

use crate::error::Result;
use crate::record::FlightRecord;

use super::checked_k;

/// Return up to `k` records with the greatest `actual_delay`, largest first.
///
/// `k` larger than the input returns every record.
#[must_use]
pub fn select_top_k(records: &[FlightRecord], k: usize) -> Vec<FlightRecord> {
    let k = k.min(records.len());
    if k == 0 {
        return Vec::new();
    }

    // Ordered by (delay, earlier index first); the heap root is the weakest entry.
    let mut heap: BinaryHeap<Reverse<(i32, Reverse<usize>)>> = BinaryHeap::with_capacity(k);
    for (index, record) in records.iter().enumerate() {
        let entry = (record.actual_delay, Reverse(index));
        if heap.len() < k {
            heap.push(Reverse(entry));
        } else if let Some(Reverse(weakest)) = heap.peek() {
            if entry > *weakest {
                heap.pop();
                heap.push(Reverse(entry));
            }
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse((_, Reverse(index)))| records[index].clone())
        .collect()
}

/// Checked entry point for top-K selection.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidArgument`] if `k` is negative.
pub fn top_delays(records: &[FlightRecord], k: i64) -> Result<Vec<FlightRecord>> {
    let k = checked_k(k)?;
    let top = select_top_k(records, k);
    debug!(k, records = records.len(), selected = top.len(), "selected top delays");
    Ok(top)
}
