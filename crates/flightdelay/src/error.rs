//! Error type shared by the library.
//!
//! The analytics only ever fail with [`Error::InvalidArgument`]. Every other
//! variant comes from the record model or from the storage and configuration
//! layers around it.

use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by flightdelay.
#[derive(Error, Debug)]
pub enum Error {
    /// A count parameter such as `k` was negative.
    #[error("invalid argument {name} = {value}: must not be negative")]
    InvalidArgument {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: i64,
    },

    /// A record broke one of the record model rules.
    #[error("invalid flight record '{id}': {message}")]
    InvalidRecord {
        /// Record identifier, possibly empty.
        id: String,
        /// Which rule was broken.
        message: String,
    },

    /// The id is already used in the active collection.
    #[error("flight '{id}' is already in the collection")]
    DuplicateFlight {
        /// The reused id.
        id: String,
    },

    /// Lookup of an id that is not in the collection.
    #[error("flight '{id}' not found")]
    FlightNotFound {
        /// The missing id.
        id: String,
    },

    /// Carrier name outside the known set.
    #[error("unknown airline: {0}")]
    UnknownAirline(String),

    /// Airport code outside the known set.
    #[error("unknown airport: {0}")]
    UnknownAirport(String),

    /// A stored airline statistics row breaks `delayed <= total`.
    #[error("invalid statistics for {airline}: {message}")]
    InvalidAirlineStats {
        /// Airline name.
        airline: String,
        /// What is inconsistent.
        message: String,
    },

    /// The flight database could not be opened.
    #[error("cannot open flight database {path}: {source}")]
    DatabaseOpen {
        /// Database file.
        path: PathBuf,
        /// Cause.
        #[source]
        source: rusqlite::Error,
    },

    /// Any `SQLite` failure after the database is open.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// The stored schema version cannot be brought up to date.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Details.
        message: String,
    },

    /// Configuration sources could not be merged or parsed.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration parsed but holds unusable values.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Which setting is wrong and why.
        message: String,
    },

    /// The database directory could not be created.
    #[error("cannot create directory {path}: {source}")]
    DirectoryCreate {
        /// Directory path.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Negative `value` passed as parameter `name`.
    #[must_use]
    pub fn invalid_argument(name: &'static str, value: i64) -> Self {
        Self::InvalidArgument { name, value }
    }

    /// Record `id` rejected for `message`.
    #[must_use]
    pub fn invalid_record(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Whether this is [`Error::InvalidArgument`].
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Whether this is [`Error::DuplicateFlight`].
    #[must_use]
    pub fn is_duplicate_flight(&self) -> bool {
        matches!(self, Self::DuplicateFlight { .. })
    }
}
