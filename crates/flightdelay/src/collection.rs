//! The active in-memory flight collection.
//!
//! Owns the records of a process run together with the per-airline
//! statistics derived from them. Records are append-only; statistics are
//! updated on every append and rebuilt only when the whole collection is
//! replaced.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::analytics::{error_metrics, estimate_delay, ErrorMetrics};
use crate::error::{Error, Result};
use crate::record::{FleetStats, FlightRecord};

/// Records plus their running airline statistics.
#[derive(Debug, Clone, Default)]
pub struct FlightCollection {
    records: Vec<FlightRecord>,
    stats: FleetStats,
    ids: HashSet<String>,
}

impl FlightCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from an initial set of records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFlight`] if two records share an id, or
    /// [`Error::InvalidRecord`] if a record violates the record model.
    pub fn from_records(records: Vec<FlightRecord>) -> Result<Self> {
        let mut collection = Self::new();
        collection.replace_all(records)?;
        Ok(collection)
    }

    /// Append a record and count it in the airline statistics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFlight`] if the id is already in use, or
    /// [`Error::InvalidRecord`] if the record violates the record model.
    pub fn push(&mut self, record: FlightRecord) -> Result<()> {
        record.validate()?;
        if self.ids.contains(&record.id) {
            return Err(Error::DuplicateFlight { id: record.id });
        }
        self.stats.observe(&record);
        self.ids.insert(record.id.clone());
        debug!(id = %record.id, airline = %record.airline, "appended flight");
        self.records.push(record);
        Ok(())
    }

    /// Replace every record, rebuilding the statistics from scratch.
    ///
    /// On error the collection is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateFlight`] if two new records share an id, or
    /// [`Error::InvalidRecord`] if a record violates the record model.
    pub fn replace_all(&mut self, records: Vec<FlightRecord>) -> Result<()> {
        let mut ids = HashSet::with_capacity(records.len());
        for record in &records {
            record.validate()?;
            if !ids.insert(record.id.clone()) {
                return Err(Error::DuplicateFlight {
                    id: record.id.clone(),
                });
            }
        }

        self.stats.rebuild(&records);
        self.records = records;
        self.ids = ids;
        info!(
            flights = self.records.len(),
            airlines = self.stats.len(),
            "replaced flight collection"
        );
        Ok(())
    }

    /// Snapshot of the records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[FlightRecord] {
        &self.records
    }

    /// Running per-airline statistics.
    #[must_use]
    pub fn stats(&self) -> &FleetStats {
        &self.stats
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FlightRecord> {
        if !self.ids.contains(id) {
            return None;
        }
        self.records.iter().find(|record| record.id == id)
    }

    /// Whether a record with this id is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First unused id of the form `FL{base + len + n}`.
    #[must_use]
    pub fn next_flight_id(&self, base: u64) -> String {
        let mut number = base + self.records.len() as u64;
        loop {
            let id = format!("FL{number}");
            if !self.ids.contains(&id) {
                return id;
            }
            number += 1;
        }
    }

    /// Estimate a record's delay from this collection's airline history.
    #[must_use]
    pub fn estimate(&self, record: &FlightRecord) -> u32 {
        estimate_delay(record, &self.stats.get(record.airline))
    }

    /// MAE and RMSE of the estimator over every record.
    #[must_use]
    pub fn error_metrics(&self) -> ErrorMetrics {
        error_metrics(&self.records, |record| i64::from(self.estimate(record)))
    }
}
