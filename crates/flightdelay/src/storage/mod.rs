//! Storage layer for flightdelay.
//!
//! This module provides `SQLite`-based persistence for flight records, keyed
//! by flight id, plus a snapshot table of per-airline statistics. The
//! analytics never touch storage; callers load a snapshot, hand it to the
//! analytics, and save newly created records.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{Airline, AirlineStats, Airport, FleetStats, FlightRecord};

/// Column list shared by every flight query.
const FLIGHT_COLUMNS: &str = "id, airline, origin, destination, scheduled_time, \
     actual_delay, weather_score, traffic_score, technical_score";

/// Pseudo-path reported for in-memory databases.
const MEMORY_PATH: &str = ":memory:";

/// `SQLite` store of flight records and the airline statistics snapshot.
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    conn: Connection,
}

impl Storage {
    /// Open the database at `path`, creating it and its directory if needed.
    ///
    /// The schema is migrated to the current version before returning.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] or [`Error::DatabaseOpen`] if the
    /// file cannot be created, or a migration error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
                std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            _ => {}
        }

        let storage = Self::init(path.clone(), Connection::open(&path))?;
        storage
            .conn
            .execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        info!(path = %path.display(), "flight database ready");
        Ok(storage)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(PathBuf::from(MEMORY_PATH), Connection::open_in_memory())
    }

    fn init(path: PathBuf, conn: rusqlite::Result<Connection>) -> Result<Self> {
        let conn = conn.map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        migrations::initialize_schema(&conn)?;
        debug!(path = %path.display(), "flight database schema checked");
        Ok(Self { path, conn })
    }

    /// Location of the database, `:memory:` for in-memory stores.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Durably save a flight, replacing any row with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_flight(&self, flight: &FlightRecord) -> Result<()> {
        Self::insert_flight(&self.conn, flight)?;
        debug!(id = %flight.id, "saved flight");
        Ok(())
    }

    /// Save several flights in a single transaction.
    ///
    /// Returns the number of flights written.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails; nothing is written in that case.
    pub fn save_flights(&mut self, flights: &[FlightRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for flight in flights {
            Self::insert_flight(&tx, flight)?;
        }
        tx.commit()?;
        debug!(count = flights.len(), "saved flights");
        Ok(flights.len())
    }

    fn insert_flight(conn: &Connection, flight: &FlightRecord) -> Result<()> {
        conn.execute(
            r"
            INSERT OR REPLACE INTO flights (
                id, airline, origin, destination, scheduled_time,
                actual_delay, weather_score, traffic_score, technical_score
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
            params![
                flight.id,
                flight.airline.name(),
                flight.origin.code(),
                flight.destination.code(),
                flight.scheduled_time.to_rfc3339(),
                flight.actual_delay,
                flight.weather_score,
                flight.traffic_score,
                flight.technical_score,
            ],
        )?;
        Ok(())
    }

    /// Load every stored flight in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn load_flights(&self) -> Result<Vec<FlightRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {FLIGHT_COLUMNS} FROM flights ORDER BY rowid"))?;
        let flights = stmt
            .query_map([], Self::row_to_flight)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        info!("Loaded {} flights from storage", flights.len());
        Ok(flights)
    }

    /// Get a flight by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: &str) -> Result<Option<FlightRecord>> {
        let result = self
            .conn
            .query_row(
                &format!("SELECT {FLIGHT_COLUMNS} FROM flights WHERE id = ?1"),
                [id],
                Self::row_to_flight,
            )
            .optional()?;
        Ok(result)
    }

    /// Count stored flights.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM flights", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Replace the stored airline statistics with `stats`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn save_airline_stats(&mut self, stats: &FleetStats) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM airline_stats", [])?;
        for (airline, entry) in stats.iter() {
            tx.execute(
                "INSERT INTO airline_stats (airline, total, delayed) VALUES (?1, ?2, ?3)",
                params![
                    airline.name(),
                    i64::try_from(entry.total).unwrap_or(i64::MAX),
                    i64::try_from(entry.delayed).unwrap_or(i64::MAX),
                ],
            )?;
        }
        tx.commit()?;
        debug!(airlines = stats.len(), "saved airline statistics");
        Ok(())
    }

    /// Load the stored airline statistics snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn load_airline_stats(&self) -> Result<FleetStats> {
        let mut stmt = self
            .conn
            .prepare("SELECT airline, total, delayed FROM airline_stats")?;
        let rows = stmt
            .query_map([], |row| {
                let airline = parse_column::<Airline>(row, 0)?;
                let total = count_column(row, 1)?;
                let delayed = count_column(row, 2)?;
                if delayed > total {
                    let err = Error::InvalidAirlineStats {
                        airline: airline.name().to_string(),
                        message: format!("{delayed} delayed out of {total} flights"),
                    };
                    return Err(rusqlite::Error::FromSqlConversionFailure(
                        2,
                        Type::Integer,
                        Box::new(err),
                    ));
                }
                Ok((airline, AirlineStats { total, delayed }))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stats = FleetStats::new();
        for (airline, entry) in rows {
            stats.insert(airline, entry);
        }
        Ok(stats)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let total_flights = self.count()?;

        let (airlines, origins, destinations): (i64, i64, i64) = self.conn.query_row(
            r"
            SELECT COUNT(DISTINCT airline), COUNT(DISTINCT origin), COUNT(DISTINCT destination)
            FROM flights
            ",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        let (earliest, latest): (Option<String>, Option<String>) = self.conn.query_row(
            "SELECT MIN(scheduled_time), MAX(scheduled_time) FROM flights",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let db_size_bytes = if self.path.as_os_str() == MEMORY_PATH {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            total_flights,
            airlines,
            origins,
            destinations,
            earliest_scheduled: earliest.as_deref().and_then(parse_timestamp),
            latest_scheduled: latest.as_deref().and_then(parse_timestamp),
            db_size_bytes,
        })
    }

    /// Convert a database row to a flight record.
    fn row_to_flight(row: &rusqlite::Row) -> rusqlite::Result<FlightRecord> {
        let scheduled: String = row.get(4)?;
        let scheduled_time = DateTime::parse_from_rfc3339(&scheduled)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

        let flight = FlightRecord {
            id: row.get(0)?,
            airline: parse_column(row, 1)?,
            origin: parse_column(row, 2)?,
            destination: parse_column(row, 3)?,
            scheduled_time,
            actual_delay: row.get(5)?,
            weather_score: row.get(6)?,
            traffic_score: row.get(7)?,
            technical_score: row.get(8)?,
        };
        flight
            .validate()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
        Ok(flight)
    }
}

/// Read a non-negative count column.
fn count_column(row: &rusqlite::Row, index: usize) -> rusqlite::Result<u64> {
    let value: i64 = row.get(index)?;
    u64::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(e)))
}

/// Parse a text column through `FromStr`, surfacing failures as conversion errors.
fn parse_column<T>(row: &rusqlite::Row, index: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = Error>,
{
    let text: String = row.get(index)?;
    text.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Summary of the stored flights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Total number of flights stored.
    pub total_flights: i64,
    /// Number of distinct airlines.
    pub airlines: i64,
    /// Number of distinct origin airports.
    pub origins: i64,
    /// Number of distinct destination airports.
    pub destinations: i64,
    /// Earliest scheduled departure.
    pub earliest_scheduled: Option<DateTime<Utc>>,
    /// Latest scheduled departure.
    pub latest_scheduled: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
