//! Synthetic flight generation for demos and tests.
//!
//! Produces valid [`FlightRecord`]s with uniformly drawn carriers, routes and
//! risk scores. Two profiles mirror the two ways flights enter the system:
//! bulk backfill and a live feed of upcoming departures.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::Result;
use crate::record::{Airline, Airport, FlightRecord, MAX_RISK_SCORE};

/// Id numbering base for batch-generated flights.
pub const BATCH_ID_BASE: u64 = 1000;

/// Id numbering base for real-time flights.
pub const REALTIME_ID_BASE: u64 = 2000;

/// Shape of the generated data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationProfile {
    /// Historical backfill: delays in `[-30, 180]` for 70% of flights,
    /// scheduled between 2 hours ago and 24 hours ahead.
    #[default]
    Batch,
    /// Live feed: delays in `[0, 120]` for 60% of flights, scheduled 1 to
    /// 12 hours ahead.
    RealTime,
}

impl GenerationProfile {
    /// Id numbering base for this profile.
    #[must_use]
    pub fn id_base(self) -> u64 {
        match self {
            Self::Batch => BATCH_ID_BASE,
            Self::RealTime => REALTIME_ID_BASE,
        }
    }

    fn delay_chance(self) -> f64 {
        match self {
            Self::Batch => 0.7,
            Self::RealTime => 0.6,
        }
    }

    fn delay_range(self) -> std::ops::RangeInclusive<i32> {
        match self {
            Self::Batch => -30..=180,
            Self::RealTime => 0..=120,
        }
    }

    fn hour_offsets(self) -> std::ops::RangeInclusive<i64> {
        match self {
            Self::Batch => -2..=24,
            Self::RealTime => 1..=12,
        }
    }
}

/// Random flight source.
#[derive(Debug)]
pub struct SampleGenerator {
    rng: StdRng,
    profile: GenerationProfile,
}

impl SampleGenerator {
    /// Create an entropy-seeded generator.
    #[must_use]
    pub fn new(profile: GenerationProfile) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            profile,
        }
    }

    /// Create a reproducible generator.
    #[must_use]
    pub fn with_seed(profile: GenerationProfile, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            profile,
        }
    }

    /// The active profile.
    #[must_use]
    pub fn profile(&self) -> GenerationProfile {
        self.profile
    }

    /// Generate one flight with the given id, scheduled relative to `now`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidRecord`] only if `id` is empty.
    pub fn flight(&mut self, id: impl Into<String>, now: DateTime<Utc>) -> Result<FlightRecord> {
        let airline = *Airline::ALL
            .choose(&mut self.rng)
            .unwrap_or(&Airline::Tarom);
        let origin = *Airport::ALL.choose(&mut self.rng).unwrap_or(&Airport::OTP);
        let destinations: Vec<Airport> = Airport::ALL
            .into_iter()
            .filter(|airport| *airport != origin)
            .collect();
        let destination = *destinations.choose(&mut self.rng).unwrap_or(&Airport::MUC);

        let hours = self.rng.gen_range(self.profile.hour_offsets());
        let actual_delay = if self.rng.gen_bool(self.profile.delay_chance()) {
            self.rng.gen_range(self.profile.delay_range())
        } else {
            0
        };

        let record = FlightRecord::new(
            id,
            airline,
            origin,
            destination,
            now + Duration::hours(hours),
            actual_delay,
            self.score(),
            self.score(),
            self.score(),
        )?;
        debug!(id = %record.id, "generated flight");
        Ok(record)
    }

    fn score(&mut self) -> f64 {
        self.rng.gen_range(0.0..MAX_RISK_SCORE)
    }
}
