//! Frequent delayed airlines via a Misra-Gries summary.
//!
//! The first pass streams qualifying records through a [`MisraGries`]
//! summary with `k - 1` counters. Any airline occurring more than
//! `qualifying / k` times is guaranteed to survive it. A second pass then
//! recounts the survivors exactly, so the reported counts are true counts
//! rather than the summary's underestimates.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use tracing::debug;

use crate::error::Result;
use crate::record::{Airline, FlightRecord};

use super::checked_k;

/// Only flights delayed by more than this many minutes are counted.
pub const HIGH_DELAY_MINUTES: i32 = 30;

/// Default `k` for frequent-airline detection.
pub const DEFAULT_FREQUENT_K: i64 = 3;

/// Bounded-memory approximate frequent-item counter.
///
/// Holds at most `max(1, k - 1)` counters regardless of stream length.
#[derive(Debug, Clone)]
pub struct MisraGries<T> {
    capacity: usize,
    counters: HashMap<T, u64>,
}

impl<T: Eq + Hash + Clone> MisraGries<T> {
    /// Create a summary for parameter `k`.
    #[must_use]
    pub fn new(k: usize) -> Self {
        let capacity = k.saturating_sub(1).max(1);
        Self {
            capacity,
            counters: HashMap::new(),
        }
    }

    /// Maximum number of counters held at once.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Feed one item from the stream.
    pub fn observe(&mut self, item: &T) {
        if let Some(count) = self.counters.get_mut(item) {
            *count += 1;
        } else if self.counters.len() < self.capacity {
            self.counters.insert(item.clone(), 1);
        } else {
            for count in self.counters.values_mut() {
                *count -= 1;
            }
            self.counters.retain(|_, count| *count > 0);
        }
    }

    /// Whether `item` currently holds a counter.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.counters.contains_key(item)
    }

    /// The summary's (under-)estimate for `item`.
    #[must_use]
    pub fn estimate(&self, item: &T) -> u64 {
        self.counters.get(item).copied().unwrap_or(0)
    }

    /// Items that survived the stream so far.
    pub fn candidates(&self) -> impl Iterator<Item = &T> {
        self.counters.keys()
    }

    /// Number of live counters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    /// Whether no counter is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

fn is_high_delay(record: &FlightRecord) -> bool {
    record.actual_delay > HIGH_DELAY_MINUTES
}

/// Airlines that frequently run more than 30 minutes late, with exact counts.
///
/// Results are ordered by count, largest first; equal counts follow airline
/// order.
///
/// # Errors
///
/// Returns [`crate::Error::InvalidArgument`] if `k` is negative.
pub fn frequent_delayed_airlines(records: &[FlightRecord], k: i64) -> Result<Vec<(Airline, u64)>> {
    let k = checked_k(k)?;

    let mut summary = MisraGries::new(k);
    for record in records.iter().filter(|r| is_high_delay(r)) {
        summary.observe(&record.airline);
    }
    if summary.is_empty() {
        debug!(k, "no frequent delayed airlines");
        return Ok(Vec::new());
    }

    let mut exact: BTreeMap<Airline, u64> = BTreeMap::new();
    for record in records.iter().filter(|r| is_high_delay(r)) {
        if summary.contains(&record.airline) {
            *exact.entry(record.airline).or_default() += 1;
        }
    }

    let mut counts: Vec<(Airline, u64)> = exact.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    debug!(k, candidates = counts.len(), "recounted frequent delayed airlines");
    Ok(counts)
}
