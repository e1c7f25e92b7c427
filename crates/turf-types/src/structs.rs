//! Core entity structs for the Turf territorial state engine.
//!
//! Regions and their evolving state, the immutable territorial events
//! that drive them, and the effect catalog/instance types produced by
//! the threshold trigger engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    DistrictStatus, EffectType, EventType, MetricKind, ModifierKey, TriggerDirection,
};
use crate::ids::{ActorId, EffectId, EventId, RegionId};
use crate::metrics::{DeltaVector, Metrics, clamp_metric};

/// Minimum event severity.
pub const SEVERITY_MIN: u8 = 1;

/// Maximum event severity.
pub const SEVERITY_MAX: u8 = 10;

/// Gameplay modifiers keyed by the quantity they scale.
///
/// `BTreeMap` keeps iteration deterministic; the later-wins combination
/// rule for overlapping keys is applied by the reader's merge, not here.
pub type ModifierSet = BTreeMap<ModifierKey, Decimal>;

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A static geographic/administrative district of the game world.
///
/// Created once at world setup, never deleted, and read-only to this
/// engine. Baseline attributes seed the initial [`RegionState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Region {
    /// Unique region identifier.
    pub id: RegionId,
    /// Human-readable district name.
    pub name: String,
    /// Default policing level, 0-100. Seeds `police_presence`.
    pub base_police: i64,
    /// Default economic strength, 0-100. Seeds `business_health`.
    pub base_economy: i64,
    /// When the region was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// RegionState
// ---------------------------------------------------------------------------

/// The evolving territorial state of one region.
///
/// Mutated only by the aggregator and the decay process; everything else
/// reads it. All bounded fields satisfy their range after every mutation,
/// and `status` is always the pure derivation from the current metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RegionState {
    /// The region this state belongs to.
    pub region_id: RegionId,
    /// The five primary bounded metrics.
    pub metrics: Metrics,
    /// Accumulated police heat, 0-100.
    pub heat_level: i64,
    /// Inter-crew tension from recent conflicts, 0-100.
    pub crew_tension: i64,
    /// Derived categorical status.
    pub status: DistrictStatus,
    /// Events folded in since the last decay interval. Reset by decay.
    pub events_today: u32,
    /// Conflict events folded in since the last decay interval. Reset by decay.
    pub conflicts_today: u32,
    /// When this state was last written.
    pub updated_at: DateTime<Utc>,
}

impl RegionState {
    /// Build the neutral starting state for a freshly created region.
    ///
    /// Police presence and business health start at the region's static
    /// baselines (clamped); every other metric starts at 50.
    pub fn neutral_for(region: &Region, now: DateTime<Utc>) -> Self {
        Self {
            region_id: region.id,
            metrics: Metrics {
                police_presence: clamp_metric(region.base_police),
                business_health: clamp_metric(region.base_economy),
                ..Metrics::NEUTRAL
            },
            heat_level: 0,
            crew_tension: 0,
            status: DistrictStatus::Stable,
            events_today: 0,
            conflicts_today: 0,
            updated_at: now,
        }
    }

    /// Read one metric by kind, covering both the primary metrics and
    /// the supplementary counters.
    pub const fn metric(&self, kind: MetricKind) -> i64 {
        match kind {
            MetricKind::CrimeIndex => self.metrics.crime_index,
            MetricKind::PolicePresence => self.metrics.police_presence,
            MetricKind::PropertyValues => self.metrics.property_values,
            MetricKind::BusinessHealth => self.metrics.business_health,
            MetricKind::StreetActivity => self.metrics.street_activity,
            MetricKind::HeatLevel => self.heat_level,
            MetricKind::CrewTension => self.crew_tension,
        }
    }

    /// Whether every bounded field satisfies its range invariant.
    pub const fn in_bounds(&self) -> bool {
        self.metrics.in_bounds()
            && self.heat_level >= 0
            && self.heat_level <= 100
            && self.crew_tension >= 0
            && self.crew_tension <= 100
    }
}

// ---------------------------------------------------------------------------
// TerritoryEvent
// ---------------------------------------------------------------------------

/// An immutable territorial fact recorded in the event store.
///
/// Created by game-action handlers the moment an action with territorial
/// consequence completes. Never updated except the one-way `processed`
/// transition; retained indefinitely for audit and history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TerritoryEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// The region the event occurred in.
    pub region_id: RegionId,
    /// The kind of occurrence.
    pub event_type: EventType,
    /// How serious it was, 1-10. Scales the delta vector linearly.
    pub severity: u8,
    /// The acting player or crew, if any. Opaque to the engine.
    pub actor_id: Option<ActorId>,
    /// The targeted player or crew, if any. Opaque to the engine.
    pub target_id: Option<ActorId>,
    /// Free-form payload for display/audit.
    pub details: serde_json::Value,
    /// Precomputed per-metric impact, each component within ±50.
    pub delta: DeltaVector,
    /// Whether the aggregator has folded this event into region state.
    pub processed: bool,
    /// When the event was marked processed.
    pub processed_at: Option<DateTime<Utc>>,
    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// EffectDefinition
// ---------------------------------------------------------------------------

/// A catalog entry describing when a world effect triggers and what it does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EffectDefinition {
    /// The effect this definition instantiates.
    pub effect_type: EffectType,
    /// The metric the trigger condition examines.
    pub metric: MetricKind,
    /// The threshold value for the condition.
    pub threshold: i64,
    /// Which side of the threshold satisfies the condition.
    pub direction: TriggerDirection,
    /// Gameplay modifiers applied while the effect is active.
    /// `Decimal` values serialize as strings, hence the TS override.
    #[ts(type = "Record<string, string>")]
    pub modifiers: ModifierSet,
    /// How long an instance stays active, in seconds.
    pub duration_secs: i64,
    /// Minimum gap between an instance ending and the next trigger,
    /// in seconds (hysteresis against flapping).
    pub cooldown_secs: i64,
}

// ---------------------------------------------------------------------------
// ActiveEffect
// ---------------------------------------------------------------------------

/// A live, time-boxed instantiation of an [`EffectDefinition`] for one region.
///
/// At most one non-ended instance per (region, effect type) exists at any
/// time; the store's insert guard and the database's partial unique index
/// both enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveEffect {
    /// Unique instance identifier.
    pub id: EffectId,
    /// The region the effect applies to.
    pub region_id: RegionId,
    /// The catalog effect type.
    pub effect_type: EffectType,
    /// Modifier snapshot taken from the definition at trigger time.
    #[ts(type = "Record<string, string>")]
    pub modifiers: ModifierSet,
    /// When the effect started.
    pub started_at: DateTime<Utc>,
    /// When the effect is due to expire.
    pub expires_at: DateTime<Utc>,
    /// When the effect actually ended (expiry sweep or cancellation).
    pub ended_at: Option<DateTime<Utc>>,
}

impl ActiveEffect {
    /// Whether the effect is live at `now`: not ended and not past expiry.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.ended_at.is_none() && self.expires_at > now
    }
}

// ---------------------------------------------------------------------------
// Worker summaries
// ---------------------------------------------------------------------------

/// Structured summary returned by each periodic worker's entry point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SweepSummary {
    /// Regions visited by the sweep.
    pub regions_processed: u32,
    /// Events folded into region state.
    pub events_consumed: u32,
    /// Active effects created.
    pub effects_triggered: u32,
    /// Active effects marked ended.
    pub effects_expired: u32,
    /// When the sweep ran.
    pub ran_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_region() -> Region {
        Region {
            id: RegionId::new(),
            name: String::from("Dockside"),
            base_police: 120,
            base_economy: -5,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn neutral_state_clamps_baselines() {
        let region = make_region();
        let state = RegionState::neutral_for(&region, Utc::now());
        assert_eq!(state.metrics.police_presence, 100);
        assert_eq!(state.metrics.business_health, 0);
        assert_eq!(state.metrics.crime_index, 50);
        assert_eq!(state.status, DistrictStatus::Stable);
        assert!(state.in_bounds());
    }

    #[test]
    fn effect_liveness_window() {
        let now = Utc::now();
        let mut effect = ActiveEffect {
            id: EffectId::new(),
            region_id: RegionId::new(),
            effect_type: EffectType::PoliceCrackdown,
            modifiers: ModifierSet::new(),
            started_at: now,
            expires_at: now + Duration::hours(6),
            ended_at: None,
        };
        assert!(effect.is_live(now));
        assert!(!effect.is_live(now + Duration::hours(7)));

        effect.ended_at = Some(now + Duration::hours(1));
        assert!(!effect.is_live(now));
    }
}
