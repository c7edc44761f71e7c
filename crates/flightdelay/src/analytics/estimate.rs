//! Closed-form delay estimate from risk factors and airline history.

use crate::record::{AirlineStats, FlightRecord};

/// Weight of the weather score.
pub const WEATHER_WEIGHT: f64 = 5.0;
/// Weight of the traffic score.
pub const TRAFFIC_WEIGHT: f64 = 3.0;
/// Weight of the technical score.
pub const TECHNICAL_WEIGHT: f64 = 4.0;
/// Maximum upward scaling applied for an airline that is always delayed.
pub const HISTORY_FACTOR: f64 = 0.5;
/// Upper bound of any estimate, in minutes.
pub const MAX_ESTIMATE_MINUTES: u32 = 600;

/// Estimate the delay of `record` in whole minutes.
///
/// The weighted risk average is scaled up by at most 50% according to the
/// airline's historical delay rate; an airline without history leaves it
/// unscaled. The result is truncated and clamped to `[0, 600]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate_delay(record: &FlightRecord, history: &AirlineStats) -> u32 {
    let weighted = record.weather_score * WEATHER_WEIGHT
        + record.traffic_score * TRAFFIC_WEIGHT
        + record.technical_score * TECHNICAL_WEIGHT;
    let mut base = weighted / 10.0;

    if let Some(rate) = history.delay_rate() {
        base *= 1.0 + rate * HISTORY_FACTOR;
    }

    // Float-to-int `as` saturates and maps NaN to 0.
    base.clamp(0.0, f64::from(MAX_ESTIMATE_MINUTES)).floor() as u32
}
