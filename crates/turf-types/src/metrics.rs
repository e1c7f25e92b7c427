//! Bounded metric vectors for region state.
//!
//! Every primary metric lives in `[0, 100]` and every per-event delta
//! component is capped to `±50`. Clamping happens at every write site --
//! these types make out-of-range values unrepresentable through their
//! public operations.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lower bound of every region metric.
pub const METRIC_MIN: i64 = 0;

/// Upper bound of every region metric.
pub const METRIC_MAX: i64 = 100;

/// Neutral baseline that decay pulls metrics toward.
pub const METRIC_BASELINE: i64 = 50;

/// Maximum absolute movement a single event may apply to one metric.
pub const DELTA_CAP: i64 = 50;

/// Clamp a metric value into `[METRIC_MIN, METRIC_MAX]`.
pub const fn clamp_metric(value: i64) -> i64 {
    if value < METRIC_MIN {
        METRIC_MIN
    } else if value > METRIC_MAX {
        METRIC_MAX
    } else {
        value
    }
}

/// Signed per-metric impact of one event (or a summed batch of events).
///
/// Components of a single event's vector are bounded to [`DELTA_CAP`];
/// summed batch vectors are unbounded here and clamped when applied to
/// a [`Metrics`] snapshot.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct DeltaVector {
    /// Movement on the crime index.
    pub crime_index: i64,
    /// Movement on police presence.
    pub police_presence: i64,
    /// Movement on property values.
    pub property_values: i64,
    /// Movement on business health.
    pub business_health: i64,
    /// Movement on street activity.
    pub street_activity: i64,
}

impl DeltaVector {
    /// The zero vector (no territorial impact).
    pub const ZERO: Self = Self {
        crime_index: 0,
        police_presence: 0,
        property_values: 0,
        business_health: 0,
        street_activity: 0,
    };

    /// Cap every component to `±DELTA_CAP`, limiting the blast radius
    /// of a single event.
    #[must_use]
    pub const fn capped(self) -> Self {
        const fn cap(v: i64) -> i64 {
            if v > DELTA_CAP {
                DELTA_CAP
            } else if v < -DELTA_CAP {
                -DELTA_CAP
            } else {
                v
            }
        }
        Self {
            crime_index: cap(self.crime_index),
            police_presence: cap(self.police_presence),
            property_values: cap(self.property_values),
            business_health: cap(self.business_health),
            street_activity: cap(self.street_activity),
        }
    }

    /// Component-wise saturating sum, used to fold a batch of events.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self {
            crime_index: self.crime_index.saturating_add(other.crime_index),
            police_presence: self.police_presence.saturating_add(other.police_presence),
            property_values: self.property_values.saturating_add(other.property_values),
            business_health: self.business_health.saturating_add(other.business_health),
            street_activity: self.street_activity.saturating_add(other.street_activity),
        }
    }

    /// Whether every component is zero.
    pub const fn is_zero(&self) -> bool {
        self.crime_index == 0
            && self.police_presence == 0
            && self.property_values == 0
            && self.business_health == 0
            && self.street_activity == 0
    }
}

/// The five primary bounded metrics of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Metrics {
    /// Overall criminal activity, 0-100.
    pub crime_index: i64,
    /// Police attention and patrol density, 0-100.
    pub police_presence: i64,
    /// Real-estate values, 0-100.
    pub property_values: i64,
    /// Health of legitimate businesses, 0-100.
    pub business_health: i64,
    /// Foot traffic and street-level economy, 0-100.
    pub street_activity: i64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl Metrics {
    /// Every metric at the neutral baseline of 50.
    pub const NEUTRAL: Self = Self {
        crime_index: METRIC_BASELINE,
        police_presence: METRIC_BASELINE,
        property_values: METRIC_BASELINE,
        business_health: METRIC_BASELINE,
        street_activity: METRIC_BASELINE,
    };

    /// Apply a (summed) delta vector, clamping every metric into
    /// `[0, 100]`. This is the only mutation path the aggregator uses.
    #[must_use]
    pub const fn apply(self, delta: DeltaVector) -> Self {
        Self {
            crime_index: clamp_metric(self.crime_index.saturating_add(delta.crime_index)),
            police_presence: clamp_metric(
                self.police_presence.saturating_add(delta.police_presence),
            ),
            property_values: clamp_metric(
                self.property_values.saturating_add(delta.property_values),
            ),
            business_health: clamp_metric(
                self.business_health.saturating_add(delta.business_health),
            ),
            street_activity: clamp_metric(
                self.street_activity.saturating_add(delta.street_activity),
            ),
        }
    }

    /// Whether every metric currently satisfies the bounds invariant.
    pub const fn in_bounds(&self) -> bool {
        self.crime_index >= METRIC_MIN
            && self.crime_index <= METRIC_MAX
            && self.police_presence >= METRIC_MIN
            && self.police_presence <= METRIC_MAX
            && self.property_values >= METRIC_MIN
            && self.property_values <= METRIC_MAX
            && self.business_health >= METRIC_MIN
            && self.business_health <= METRIC_MAX
            && self.street_activity >= METRIC_MIN
            && self.street_activity <= METRIC_MAX
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn capped_limits_each_component() {
        let v = DeltaVector {
            crime_index: 200,
            police_presence: -200,
            property_values: 50,
            business_health: -50,
            street_activity: 0,
        };
        let capped = v.capped();
        assert_eq!(capped.crime_index, DELTA_CAP);
        assert_eq!(capped.police_presence, -DELTA_CAP);
        assert_eq!(capped.property_values, 50);
        assert_eq!(capped.business_health, -50);
        assert_eq!(capped.street_activity, 0);
    }

    #[test]
    fn apply_clamps_to_bounds() {
        let metrics = Metrics::NEUTRAL;
        let extreme = DeltaVector {
            crime_index: 10_000,
            police_presence: -10_000,
            property_values: 49,
            business_health: -49,
            street_activity: 0,
        };
        let next = metrics.apply(extreme);
        assert!(next.in_bounds());
        assert_eq!(next.crime_index, METRIC_MAX);
        assert_eq!(next.police_presence, METRIC_MIN);
        assert_eq!(next.property_values, 99);
        assert_eq!(next.business_health, 1);
        assert_eq!(next.street_activity, METRIC_BASELINE);
    }

    #[test]
    fn zero_delta_is_identity() {
        let metrics = Metrics {
            crime_index: 77,
            police_presence: 12,
            property_values: 93,
            business_health: 4,
            street_activity: 61,
        };
        assert_eq!(metrics.apply(DeltaVector::ZERO), metrics);
        assert!(DeltaVector::ZERO.is_zero());
    }

    #[test]
    fn saturating_add_folds_components() {
        let a = DeltaVector {
            crime_index: 16,
            police_presence: 8,
            property_values: -8,
            business_health: -8,
            street_activity: 8,
        };
        let sum = a.saturating_add(a).saturating_add(a);
        assert_eq!(sum.crime_index, 48);
        assert_eq!(sum.property_values, -24);
    }
}
