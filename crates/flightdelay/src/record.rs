//! Flight record model and per-airline delay statistics.
//!
//! A [`FlightRecord`] is immutable once created. [`AirlineStats`] and
//! [`FleetStats`] are the running aggregates the estimator reads; they are
//! owned by the caller (see [`crate::collection`]), never by the analytics.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Flights delayed by more than this many minutes count as "delayed".
pub const DELAY_THRESHOLD_MINUTES: i32 = 15;

/// Upper bound (inclusive) of every risk factor score.
pub const MAX_RISK_SCORE: f64 = 10.0;

/// The fixed set of carriers known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Airline {
    /// TAROM.
    #[serde(rename = "TAROM")]
    Tarom,
    /// Wizz Air.
    #[serde(rename = "Wizz Air")]
    WizzAir,
    /// Lufthansa.
    #[serde(rename = "Lufthansa")]
    Lufthansa,
    /// Turkish Airlines.
    #[serde(rename = "Turkish Airlines")]
    TurkishAirlines,
    /// Air France.
    #[serde(rename = "Air France")]
    AirFrance,
}

impl Airline {
    /// Every known carrier, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Tarom,
        Self::WizzAir,
        Self::Lufthansa,
        Self::TurkishAirlines,
        Self::AirFrance,
    ];

    /// The carrier's display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tarom => "TAROM",
            Self::WizzAir => "Wizz Air",
            Self::Lufthansa => "Lufthansa",
            Self::TurkishAirlines => "Turkish Airlines",
            Self::AirFrance => "Air France",
        }
    }
}

impl std::fmt::Display for Airline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Airline {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|airline| airline.name() == s)
            .ok_or_else(|| Error::UnknownAirline(s.to_string()))
    }
}

/// The fixed set of airports known to the system, by IATA code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Airport {
    /// Bucharest Henri Coandă.
    OTP,
    /// Cluj-Napoca.
    CLJ,
    /// Timișoara.
    TSR,
    /// Istanbul.
    IST,
    /// Munich.
    MUC,
    /// Paris Charles de Gaulle.
    CDG,
    /// Vienna.
    VIE,
    /// Rome Fiumicino.
    FCO,
}

impl Airport {
    /// Every known airport, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::OTP,
        Self::CLJ,
        Self::TSR,
        Self::IST,
        Self::MUC,
        Self::CDG,
        Self::VIE,
        Self::FCO,
    ];

    /// The IATA code of the airport.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::OTP => "OTP",
            Self::CLJ => "CLJ",
            Self::TSR => "TSR",
            Self::IST => "IST",
            Self::MUC => "MUC",
            Self::CDG => "CDG",
            Self::VIE => "VIE",
            Self::FCO => "FCO",
        }
    }
}

impl std::fmt::Display for Airport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Airport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|airport| airport.code() == s)
            .ok_or_else(|| Error::UnknownAirport(s.to_string()))
    }
}

/// A single scheduled flight and its observed delay.
///
/// Negative `actual_delay` means an early departure. Scores are independent
/// risk factors in `[0, 10]`. Deserialization goes through
/// [`FlightRecord::validate`], so decoded records obey the same rules as
/// those built with [`FlightRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedFlightRecord")]
pub struct FlightRecord {
    /// Caller-assigned unique identifier.
    pub id: String,
    /// Operating carrier.
    pub airline: Airline,
    /// Departure airport.
    pub origin: Airport,
    /// Arrival airport, never equal to `origin`.
    pub destination: Airport,
    /// Scheduled departure time.
    pub scheduled_time: DateTime<Utc>,
    /// Observed delay in minutes.
    pub actual_delay: i32,
    /// Weather risk factor.
    pub weather_score: f64,
    /// Air traffic risk factor.
    pub traffic_score: f64,
    /// Technical risk factor.
    pub technical_score: f64,
}

/// Wire shape of a [`FlightRecord`] before validation.
#[derive(Deserialize)]
struct UncheckedFlightRecord {
    id: String,
    airline: Airline,
    origin: Airport,
    destination: Airport,
    scheduled_time: DateTime<Utc>,
    actual_delay: i32,
    weather_score: f64,
    traffic_score: f64,
    technical_score: f64,
}

impl TryFrom<UncheckedFlightRecord> for FlightRecord {
    type Error = Error;

    fn try_from(raw: UncheckedFlightRecord) -> Result<Self> {
        Self::new(
            raw.id,
            raw.airline,
            raw.origin,
            raw.destination,
            raw.scheduled_time,
            raw.actual_delay,
            raw.weather_score,
            raw.traffic_score,
            raw.technical_score,
        )
    }
}

impl FlightRecord {
    /// Create a validated flight record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the id is empty, the origin equals
    /// the destination, or any score is not a finite value in `[0, 10]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        airline: Airline,
        origin: Airport,
        destination: Airport,
        scheduled_time: DateTime<Utc>,
        actual_delay: i32,
        weather_score: f64,
        traffic_score: f64,
        technical_score: f64,
    ) -> Result<Self> {
        let record = Self {
            id: id.into(),
            airline,
            origin,
            destination,
            scheduled_time,
            actual_delay,
            weather_score,
            traffic_score,
            technical_score,
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the record model invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] describing the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::invalid_record("", "identifier must not be empty"));
        }
        if self.origin == self.destination {
            return Err(Error::invalid_record(
                &self.id,
                format!("origin and destination are both {}", self.origin),
            ));
        }
        for (name, score) in [
            ("weather_score", self.weather_score),
            ("traffic_score", self.traffic_score),
            ("technical_score", self.technical_score),
        ] {
            if !(0.0..=MAX_RISK_SCORE).contains(&score) {
                return Err(Error::invalid_record(
                    &self.id,
                    format!("{name} {score} is outside [0, {MAX_RISK_SCORE}]"),
                ));
            }
        }
        Ok(())
    }

    /// Whether the flight counts as delayed.
    #[must_use]
    pub fn is_delayed(&self) -> bool {
        self.actual_delay > DELAY_THRESHOLD_MINUTES
    }
}

/// Running delay counts for one airline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineStats {
    /// Number of records attributed to the airline.
    pub total: u64,
    /// Number of those records that were delayed.
    pub delayed: u64,
}

impl AirlineStats {
    /// Count one more record.
    pub fn observe(&mut self, record: &FlightRecord) {
        self.total += 1;
        if record.is_delayed() {
            self.delayed += 1;
        }
    }

    /// Fraction of delayed records, or `None` without history.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn delay_rate(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.delayed as f64 / self.total as f64)
        }
    }
}

/// Per-airline statistics for a whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetStats {
    by_airline: BTreeMap<Airline, AirlineStats>,
}

impl FleetStats {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from scratch for the given records.
    #[must_use]
    pub fn from_records(records: &[FlightRecord]) -> Self {
        let mut stats = Self::new();
        stats.rebuild(records);
        stats
    }

    /// Count one record, creating the airline entry on first sight.
    pub fn observe(&mut self, record: &FlightRecord) {
        self.by_airline
            .entry(record.airline)
            .or_default()
            .observe(record);
    }

    /// Discard all counts and recompute them from `records`.
    pub fn rebuild(&mut self, records: &[FlightRecord]) {
        self.by_airline.clear();
        for record in records {
            self.observe(record);
        }
    }

    /// Statistics for an airline; zero counts if it has never been seen.
    #[must_use]
    pub fn get(&self, airline: Airline) -> AirlineStats {
        self.by_airline.get(&airline).copied().unwrap_or_default()
    }

    /// Insert or overwrite the entry for an airline.
    pub fn insert(&mut self, airline: Airline, stats: AirlineStats) {
        self.by_airline.insert(airline, stats);
    }

    /// Iterate the seen airlines in airline order.
    pub fn iter(&self) -> impl Iterator<Item = (Airline, AirlineStats)> + '_ {
        self.by_airline.iter().map(|(airline, stats)| (*airline, *stats))
    }

    /// Number of distinct airlines seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_airline.len()
    }

    /// Whether no airline has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_airline.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Build a valid record with neutral scores.
    pub(crate) fn flight(id: &str, airline: Airline, delay: i32) -> FlightRecord {
        FlightRecord::new(
            id,
            airline,
            Airport::OTP,
            Airport::MUC,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            delay,
            5.0,
            5.0,
            5.0,
        )
        .unwrap()
    }

    #[test]
    fn test_airline_display_and_parse() {
        for airline in Airline::ALL {
            let parsed: Airline = airline.to_string().parse().unwrap();
            assert_eq!(parsed, airline);
        }
        assert_eq!(Airline::WizzAir.to_string(), "Wizz Air");
    }

    #[test]
    fn test_unknown_airline() {
        let err = "Pan Am".parse::<Airline>().unwrap_err();
        assert!(matches!(err, Error::UnknownAirline(_)));
    }

    #[test]
    fn test_airport_parse() {
        assert_eq!("CDG".parse::<Airport>().unwrap(), Airport::CDG);
        assert!("JFK".parse::<Airport>().is_err());
    }

    #[test]
    fn test_airline_serde_uses_display_name() {
        let json = serde_json::to_string(&Airline::TurkishAirlines).unwrap();
        assert_eq!(json, "\"Turkish Airlines\"");
    }

    #[test]
    fn test_deserialize_validates() {
        let valid = flight("FL7", Airline::AirFrance, 20);
        let json = serde_json::to_string(&valid).unwrap();
        let decoded: FlightRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, valid);

        let same_airport = json.replace("\"MUC\"", "\"OTP\"");
        let err = serde_json::from_str::<FlightRecord>(&same_airport).unwrap_err();
        assert!(err.to_string().contains("origin and destination"));

        let bad_score = json.replacen("\"weather_score\":5.0", "\"weather_score\":11.0", 1);
        assert!(serde_json::from_str::<FlightRecord>(&bad_score).is_err());
    }

    #[test]
    fn test_record_rejects_same_origin_and_destination() {
        let err = FlightRecord::new(
            "FL1",
            Airline::Tarom,
            Airport::OTP,
            Airport::OTP,
            Utc::now(),
            0,
            1.0,
            1.0,
            1.0,
        )
        .unwrap_err();
        assert!(err.to_string().contains("origin and destination"));
    }

    #[test]
    fn test_record_rejects_out_of_range_score() {
        let result = FlightRecord::new(
            "FL1",
            Airline::Tarom,
            Airport::OTP,
            Airport::CLJ,
            Utc::now(),
            0,
            10.5,
            1.0,
            1.0,
        );
        assert!(result.is_err());

        let result = FlightRecord::new(
            "FL1",
            Airline::Tarom,
            Airport::OTP,
            Airport::CLJ,
            Utc::now(),
            0,
            1.0,
            f64::NAN,
            1.0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_record_rejects_empty_id() {
        let mut record = flight("FL1", Airline::Tarom, 0);
        record.id.clear();
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_is_delayed_threshold() {
        assert!(!flight("a", Airline::Tarom, 15).is_delayed());
        assert!(flight("b", Airline::Tarom, 16).is_delayed());
        assert!(!flight("c", Airline::Tarom, -20).is_delayed());
    }

    #[test]
    fn test_airline_stats_observe() {
        let mut stats = AirlineStats::default();
        assert_eq!(stats.delay_rate(), None);

        stats.observe(&flight("a", Airline::Lufthansa, 40));
        stats.observe(&flight("b", Airline::Lufthansa, 0));
        assert_eq!(stats, AirlineStats { total: 2, delayed: 1 });
        assert_eq!(stats.delay_rate(), Some(0.5));
    }

    #[test]
    fn test_fleet_stats_lazy_entries() {
        let mut fleet = FleetStats::new();
        assert!(fleet.is_empty());
        assert_eq!(fleet.get(Airline::AirFrance), AirlineStats::default());

        fleet.observe(&flight("a", Airline::AirFrance, 90));
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet.get(Airline::AirFrance).delayed, 1);
    }

    #[test]
    fn test_fleet_stats_rebuild_replaces_counts() {
        let mut fleet = FleetStats::from_records(&[
            flight("a", Airline::Tarom, 90),
            flight("b", Airline::WizzAir, 0),
        ]);
        fleet.rebuild(&[flight("c", Airline::Tarom, 0)]);

        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet.get(Airline::Tarom), AirlineStats { total: 1, delayed: 0 });
        assert_eq!(fleet.get(Airline::WizzAir), AirlineStats::default());
    }

    #[test]
    fn test_fleet_stats_iter_in_airline_order() {
        let fleet = FleetStats::from_records(&[
            flight("a", Airline::AirFrance, 0),
            flight("b", Airline::Tarom, 0),
        ]);
        let airlines: Vec<Airline> = fleet.iter().map(|(a, _)| a).collect();
        assert_eq!(airlines, vec![Airline::Tarom, Airline::AirFrance]);
    }
}
