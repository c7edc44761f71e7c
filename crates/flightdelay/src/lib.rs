//! `flightdelay` - Flight delay analytics
//!
//! This library ranks scheduled flights by observed delay, detects airlines
//! that are frequently late, and estimates delays from per-flight risk scores
//! and airline history. The [`analytics`] module holds the pure algorithms;
//! the remaining modules load, store and generate the records they consume.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod analytics;
pub mod cli;
pub mod collection;
pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod record;
pub mod storage;

pub use collection::FlightCollection;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{Airline, AirlineStats, Airport, FleetStats, FlightRecord};
pub use storage::{Storage, StorageStats};
