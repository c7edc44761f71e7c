//! Property-based tests for the analytics core.
//!
//! Covers the ordering guarantees of the hybrid sort, the selection contract
//! of top-K, the Misra-Gries heavy-hitter guarantee, and the bounds of the
//! estimator and accuracy score.

use std::collections::BTreeMap;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use flightdelay::analytics::{
    estimate_delay, evaluate_accuracy, frequent_delayed_airlines, sort_by_delay, top_delays,
    SortDirection, HIGH_DELAY_MINUTES, MAX_ESTIMATE_MINUTES,
};
use flightdelay::{Airline, AirlineStats, Airport, FlightRecord};

fn record(index: usize, airline: usize, delay: i32, scores: (f64, f64, f64)) -> FlightRecord {
    let scheduled = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()
        + Duration::minutes(i64::try_from(index).unwrap());
    FlightRecord::new(
        format!("FL{index}"),
        Airline::ALL[airline % Airline::ALL.len()],
        Airport::OTP,
        Airport::CDG,
        scheduled,
        delay,
        scores.0,
        scores.1,
        scores.2,
    )
    .unwrap()
}

/// Flights with a small delay domain so ties are common.
fn flights(max_len: usize) -> impl Strategy<Value = Vec<FlightRecord>> {
    prop::collection::vec((0usize..5, -30i32..200, 0.0f64..=10.0), 0..max_len).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (airline, delay, score))| record(i, airline, delay, (score, score, score)))
            .collect()
    })
}

fn index_of(record: &FlightRecord) -> usize {
    record.id[2..].parse().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_sort_matches_stable_reference(records in flights(120)) {
        let sorted = sort_by_delay(&records, SortDirection::Descending);

        let mut expected = records.clone();
        expected.sort_by(|a, b| b.actual_delay.cmp(&a.actual_delay));
        prop_assert_eq!(&sorted, &expected);
    }

    #[test]
    fn prop_sort_ascending_is_ordered_and_stable(records in flights(120)) {
        let sorted = sort_by_delay(&records, SortDirection::Ascending);

        prop_assert_eq!(sorted.len(), records.len());
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].actual_delay <= pair[1].actual_delay);
            if pair[0].actual_delay == pair[1].actual_delay {
                prop_assert!(index_of(&pair[0]) < index_of(&pair[1]));
            }
        }
    }

    #[test]
    fn prop_sort_is_idempotent(records in flights(80)) {
        let once = sort_by_delay(&records, SortDirection::Descending);
        let twice = sort_by_delay(&once, SortDirection::Descending);
        prop_assert_eq!(once, twice);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_top_k_is_prefix_of_sorted(records in flights(100), k in 0i64..130) {
        let top = top_delays(&records, k).unwrap();
        let sorted = sort_by_delay(&records, SortDirection::Descending);

        let expected_len = usize::try_from(k).unwrap().min(records.len());
        prop_assert_eq!(top.len(), expected_len);
        prop_assert_eq!(&top[..], &sorted[..expected_len]);
    }

    #[test]
    fn prop_top_k_dominates_the_rest(records in flights(100), k in 1i64..20) {
        let top = top_delays(&records, k).unwrap();
        if let Some(weakest) = top.last() {
            for other in records.iter().filter(|r| !top.contains(r)) {
                prop_assert!(other.actual_delay <= weakest.actual_delay);
            }
        }
    }

    #[test]
    fn prop_negative_k_rejected(records in flights(10), k in i64::MIN..0) {
        let err = top_delays(&records, k).unwrap_err();
        prop_assert!(err.is_invalid_argument());
        let err = frequent_delayed_airlines(&records, k).unwrap_err();
        prop_assert!(err.is_invalid_argument());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_heavy_hitters_are_reported_exactly(records in flights(150), k in 1i64..7) {
        let found = frequent_delayed_airlines(&records, k).unwrap();

        let mut exact: BTreeMap<Airline, u64> = BTreeMap::new();
        for r in records.iter().filter(|r| r.actual_delay > HIGH_DELAY_MINUTES) {
            *exact.entry(r.airline).or_default() += 1;
        }
        let qualifying: u64 = exact.values().sum();
        let k = u64::try_from(k).unwrap();

        for (airline, count) in &exact {
            if *count * k > qualifying {
                prop_assert!(found.iter().any(|(a, c)| a == airline && c == count));
            }
        }
        for (airline, count) in &found {
            prop_assert_eq!(exact.get(airline), Some(count));
        }

        let capacity = usize::try_from(k.saturating_sub(1).max(1)).unwrap();
        prop_assert!(found.len() <= capacity);
        for pair in found.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
            if pair[0].1 == pair[1].1 {
                prop_assert!(pair[0].0 < pair[1].0);
            }
        }
    }

    #[test]
    fn prop_frequent_is_deterministic(records in flights(80), k in 0i64..6) {
        prop_assert_eq!(
            frequent_delayed_airlines(&records, k).unwrap(),
            frequent_delayed_airlines(&records, k).unwrap()
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_estimate_is_bounded_and_monotone(
        weather in 0.0f64..=10.0,
        traffic in 0.0f64..=10.0,
        technical in 0.0f64..=10.0,
        total in 0u64..50,
        delayed_share in 0.0f64..=1.0,
    ) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let delayed = ((total as f64) * delayed_share) as u64;
        let history = AirlineStats { total, delayed };
        let flight = record(0, 0, 0, (weather, traffic, technical));

        let estimate = estimate_delay(&flight, &history);
        prop_assert!(estimate <= MAX_ESTIMATE_MINUTES);
        // Twelve is the unscaled maximum, scaled by at most half again.
        prop_assert!(estimate <= 18);

        let worse = record(1, 0, 0, (10.0, traffic, technical));
        prop_assert!(estimate_delay(&worse, &history) >= estimate);
        prop_assert!(estimate >= estimate_delay(&flight, &AirlineStats::default()));
    }

    #[test]
    fn prop_accuracy_is_a_percentage(actual in -500i64..500, estimated in -500i64..500) {
        let accuracy = evaluate_accuracy(actual, estimated);
        prop_assert!((0.0..=100.0).contains(&accuracy));
        if actual == estimated {
            prop_assert!((accuracy - 100.0).abs() < f64::EPSILON);
        }
    }
}
