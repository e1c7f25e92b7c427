//! Impact calculator: pure mapping from (event type, severity) to a
//! delta vector over the five primary metrics.
//!
//! Each event type carries a fixed set of proportional weights per
//! metric; severity scales magnitude linearly. A per-call cap keeps any
//! single event from moving a metric by more than ±50 regardless of
//! how the weights or severity are tuned.
//!
//! No side effects, no I/O. Producers call this at ingestion so every
//! stored event carries its precomputed delta.

use turf_types::{DeltaVector, EventType};

/// Per-severity-point metric weights for one event type.
///
/// Exhaustive over [`EventType`]: adding an event type forces a weight
/// row here at compile time.
const fn weights(event_type: EventType) -> DeltaVector {
    match event_type {
        // A crime pushes crime and police interest up, scares capital.
        EventType::CrimeCommitted => DeltaVector {
            crime_index: 2,
            police_presence: 1,
            property_values: -1,
            business_health: -1,
            street_activity: 1,
        },
        // A raid suppresses crime and the street, at a business cost.
        EventType::PoliceRaid => DeltaVector {
            crime_index: -2,
            police_presence: 3,
            property_values: 0,
            business_health: -1,
            street_activity: -2,
        },
        // Open crew violence drives crime and heat up sharply while
        // emptying the streets.
        EventType::CrewBattle => DeltaVector {
            crime_index: 3,
            police_presence: 2,
            property_values: -2,
            business_health: -2,
            street_activity: -2,
        },
        EventType::BusinessOpened => DeltaVector {
            crime_index: 0,
            police_presence: 0,
            property_values: 1,
            business_health: 2,
            street_activity: 1,
        },
        EventType::BusinessClosed => DeltaVector {
            crime_index: 0,
            police_presence: 0,
            property_values: -1,
            business_health: -2,
            street_activity: -1,
        },
        EventType::PropertySale => DeltaVector {
            crime_index: 0,
            police_presence: 0,
            property_values: 2,
            business_health: 1,
            street_activity: 0,
        },
    }
}

/// Compute the per-metric impact of one event.
///
/// Linear in severity, then capped to ±50 per component. Severity is
/// validated at ingestion (1-10); the cap makes out-of-range input
/// harmless here regardless.
pub fn compute_delta(event_type: EventType, severity: u8) -> DeltaVector {
    let w = weights(event_type);
    let s = i64::from(severity);
    DeltaVector {
        crime_index: w.crime_index.saturating_mul(s),
        police_presence: w.police_presence.saturating_mul(s),
        property_values: w.property_values.saturating_mul(s),
        business_health: w.business_health.saturating_mul(s),
        street_activity: w.street_activity.saturating_mul(s),
    }
    .capped()
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use turf_types::DELTA_CAP;

    #[test]
    fn crime_severity_eight_exact_vector() {
        let delta = compute_delta(EventType::CrimeCommitted, 8);
        assert_eq!(
            delta,
            DeltaVector {
                crime_index: 16,
                police_presence: 8,
                property_values: -8,
                business_health: -8,
                street_activity: 8,
            }
        );
    }

    #[test]
    fn crew_battle_severity_nine_exact_vector() {
        let delta = compute_delta(EventType::CrewBattle, 9);
        assert_eq!(
            delta,
            DeltaVector {
                crime_index: 27,
                police_presence: 18,
                property_values: -18,
                business_health: -18,
                street_activity: -18,
            }
        );
    }

    #[test]
    fn business_opened_raises_economy_only() {
        let delta = compute_delta(EventType::BusinessOpened, 5);
        assert_eq!(delta.crime_index, 0);
        assert_eq!(delta.police_presence, 0);
        assert_eq!(delta.property_values, 5);
        assert_eq!(delta.business_health, 10);
        assert_eq!(delta.street_activity, 5);
    }

    #[test]
    fn severity_scales_linearly() {
        for et in EventType::ALL {
            let one = compute_delta(et, 1);
            let three = compute_delta(et, 3);
            assert_eq!(three.crime_index, one.crime_index * 3);
            assert_eq!(three.business_health, one.business_health * 3);
        }
    }

    #[test]
    fn no_component_ever_exceeds_the_cap() {
        // Deliberately out-of-range severity: the cap must still hold.
        for et in EventType::ALL {
            for severity in [1u8, 10, 200] {
                let delta = compute_delta(et, severity);
                for v in [
                    delta.crime_index,
                    delta.police_presence,
                    delta.property_values,
                    delta.business_health,
                    delta.street_activity,
                ] {
                    assert!(v.abs() <= DELTA_CAP, "{et:?} severity {severity}: {v}");
                }
            }
        }
    }
}
