//! District status derivation.
//!
//! Status is always a pure function of the five primary metrics plus
//! crew tension, evaluated in a fixed priority order. It is recomputed
//! at every state write (aggregation and decay) and never set
//! independently.

use turf_types::{DistrictStatus, Metrics};

/// Crime index at or above this (with tension) makes a warzone.
const WARZONE_CRIME: i64 = 70;
/// Crew tension at or above this (with crime) makes a warzone.
const WARZONE_TENSION: i64 = 60;
/// Property values at or above this contribute to gentrifying.
const GENTRIFY_PROPERTY: i64 = 65;
/// Business health at or above this contributes to gentrifying.
const GENTRIFY_BUSINESS: i64 = 60;
/// Crime index at or below this contributes to gentrifying.
const GENTRIFY_CRIME_MAX: i64 = 40;
/// Business health at or below this contributes to declining.
const DECLINE_BUSINESS: i64 = 35;
/// Property values at or below this contribute to declining.
const DECLINE_PROPERTY: i64 = 40;
/// Crime index at or above this (with tension) makes the region volatile.
const VOLATILE_CRIME: i64 = 55;
/// Crew tension at or above this (with crime) makes the region volatile.
const VOLATILE_TENSION: i64 = 40;

/// Derive the categorical status from current metrics.
///
/// Rules are checked in priority order; the first match wins:
///
/// 1. `Warzone` -- crime ≥ 70 and crew tension ≥ 60
/// 2. `Gentrifying` -- property ≥ 65, business ≥ 60, crime ≤ 40
/// 3. `Declining` -- business ≤ 35 and property ≤ 40
/// 4. `Volatile` -- crime ≥ 55 and crew tension ≥ 40
/// 5. `Stable` -- otherwise
pub const fn derive_status(metrics: &Metrics, crew_tension: i64) -> DistrictStatus {
    if metrics.crime_index >= WARZONE_CRIME && crew_tension >= WARZONE_TENSION {
        DistrictStatus::Warzone
    } else if metrics.property_values >= GENTRIFY_PROPERTY
        && metrics.business_health >= GENTRIFY_BUSINESS
        && metrics.crime_index <= GENTRIFY_CRIME_MAX
    {
        DistrictStatus::Gentrifying
    } else if metrics.business_health <= DECLINE_BUSINESS
        && metrics.property_values <= DECLINE_PROPERTY
    {
        DistrictStatus::Declining
    } else if metrics.crime_index >= VOLATILE_CRIME && crew_tension >= VOLATILE_TENSION {
        DistrictStatus::Volatile
    } else {
        DistrictStatus::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn metrics(crime: i64, police: i64, property: i64, business: i64, street: i64) -> Metrics {
        Metrics {
            crime_index: crime,
            police_presence: police,
            property_values: property,
            business_health: business,
            street_activity: street,
        }
    }

    #[test]
    fn neutral_is_stable() {
        assert_eq!(derive_status(&Metrics::NEUTRAL, 0), DistrictStatus::Stable);
    }

    #[test]
    fn warzone_needs_both_crime_and_tension() {
        let m = metrics(70, 50, 50, 50, 50);
        assert_eq!(derive_status(&m, 60), DistrictStatus::Warzone);
        assert_eq!(derive_status(&m, 59), DistrictStatus::Volatile);
    }

    #[test]
    fn gentrifying_is_independent_of_tension() {
        let m = metrics(20, 50, 70, 85, 50);
        assert_eq!(derive_status(&m, 0), DistrictStatus::Gentrifying);
        assert_eq!(derive_status(&m, 100), DistrictStatus::Gentrifying);
    }

    #[test]
    fn declining_outranks_volatile() {
        // Satisfies both the declining and volatile rules; priority decides.
        let m = metrics(55, 50, 40, 35, 50);
        assert_eq!(derive_status(&m, 40), DistrictStatus::Declining);
    }

    #[test]
    fn declining_when_economy_collapses() {
        let m = metrics(50, 50, 40, 35, 50);
        assert_eq!(derive_status(&m, 0), DistrictStatus::Declining);
        // One point above either threshold and it no longer qualifies.
        let m2 = metrics(50, 50, 41, 35, 50);
        assert_eq!(derive_status(&m2, 0), DistrictStatus::Stable);
    }

    #[test]
    fn volatile_needs_crime_and_moderate_tension() {
        let m = metrics(55, 50, 50, 50, 50);
        assert_eq!(derive_status(&m, 40), DistrictStatus::Volatile);
        assert_eq!(derive_status(&m, 39), DistrictStatus::Stable);
    }
}
