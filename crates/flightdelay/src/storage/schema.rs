//! `SQLite` schema definitions for flightdelay.
//!
//! The `flights` table keeps every field of a flight record so a reload
//! reproduces the record exactly.

/// SQL statement to create the flights table.
pub const CREATE_FLIGHTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flights (
    id TEXT PRIMARY KEY,
    airline TEXT NOT NULL,
    origin TEXT NOT NULL,
    destination TEXT NOT NULL,
    scheduled_time TEXT NOT NULL,
    actual_delay INTEGER NOT NULL,
    weather_score REAL NOT NULL,
    traffic_score REAL NOT NULL,
    technical_score REAL NOT NULL
)
";

/// SQL statement to create an index on airline for per-carrier queries.
pub const CREATE_AIRLINE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_airline ON flights(airline)
";

/// SQL statement to create an index on `actual_delay` for delay queries.
pub const CREATE_DELAY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_delay ON flights(actual_delay DESC)
";

/// SQL statement to create the per-airline statistics snapshot table.
pub const CREATE_AIRLINE_STATS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS airline_stats (
    airline TEXT PRIMARY KEY,
    total INTEGER NOT NULL,
    delayed INTEGER NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Statements of schema version 1: flights and their indexes.
pub const V1_STATEMENTS: &[&str] = &[
    CREATE_FLIGHTS_TABLE,
    CREATE_AIRLINE_INDEX,
    CREATE_DELAY_INDEX,
];

/// Statements of schema version 2: persisted airline statistics.
pub const V2_STATEMENTS: &[&str] = &[CREATE_AIRLINE_STATS_TABLE];
