//! Enumeration types for the Turf territorial state engine.
//!
//! Event types, district statuses, effect types, and the modifier keys
//! that flow into gameplay calculations. All enumerations are closed:
//! adding a variant is a compile-time-checked, localized change because
//! every consumer matches exhaustively.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event Types
// ---------------------------------------------------------------------------

/// A gameplay occurrence with territorial consequence.
///
/// Produced synchronously by game-action handlers via `record_event`
/// at the moment the action completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// A crime was committed in the region.
    CrimeCommitted,
    /// The police raided a location in the region.
    PoliceRaid,
    /// Two crews fought over territory.
    CrewBattle,
    /// A new business opened its doors.
    BusinessOpened,
    /// A business shut down.
    BusinessClosed,
    /// A property changed hands.
    PropertySale,
}

impl EventType {
    /// All event types, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::CrimeCommitted,
        Self::PoliceRaid,
        Self::CrewBattle,
        Self::BusinessOpened,
        Self::BusinessClosed,
        Self::PropertySale,
    ];

    /// Whether this event counts toward the rolling crew-tension window.
    pub const fn is_conflict(self) -> bool {
        matches!(self, Self::CrewBattle | Self::PoliceRaid)
    }

    /// Whether this event draws police heat onto the region.
    pub const fn draws_heat(self) -> bool {
        matches!(self, Self::CrimeCommitted | Self::CrewBattle)
    }

    /// Stable snake\_case name used in the database and HTTP API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CrimeCommitted => "crime_committed",
            Self::PoliceRaid => "police_raid",
            Self::CrewBattle => "crew_battle",
            Self::BusinessOpened => "business_opened",
            Self::BusinessClosed => "business_closed",
            Self::PropertySale => "property_sale",
        }
    }

    /// Parse the snake\_case name back into an event type.
    ///
    /// Returns `None` for names unknown to the engine -- callers must
    /// reject such input at ingestion rather than bucket it somewhere.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|et| et.as_str() == name)
    }
}

// ---------------------------------------------------------------------------
// District Status
// ---------------------------------------------------------------------------

/// The derived categorical status of a region.
///
/// Always a pure function of the region's current metrics (see
/// `turf-core`'s status derivation); never set independently.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum DistrictStatus {
    /// Nothing unusual; the neutral resting state.
    #[default]
    Stable,
    /// Crime and crew tension both elevated.
    Volatile,
    /// Open crew warfare; crime and tension extreme.
    Warzone,
    /// Property and business booming while crime stays low.
    Gentrifying,
    /// Businesses failing and property values slumping.
    Declining,
}

impl DistrictStatus {
    /// Stable snake\_case name used in the database and HTTP API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Volatile => "volatile",
            Self::Warzone => "warzone",
            Self::Gentrifying => "gentrifying",
            Self::Declining => "declining",
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Names a single bounded metric of a region's state.
///
/// Effect definitions reference metrics by kind; the reader API exposes
/// them individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MetricKind {
    /// Overall criminal activity, 0-100.
    CrimeIndex,
    /// Police attention and patrol density, 0-100.
    PolicePresence,
    /// Real-estate values, 0-100.
    PropertyValues,
    /// Health of legitimate businesses, 0-100.
    BusinessHealth,
    /// Foot traffic and street-level economy, 0-100.
    StreetActivity,
    /// Accumulated police heat, 0-100.
    HeatLevel,
    /// Inter-crew tension from recent conflicts, 0-100.
    CrewTension,
}

/// Which side of a threshold satisfies a trigger condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TriggerDirection {
    /// The metric must be at or above the threshold.
    Above,
    /// The metric must be at or below the threshold.
    Below,
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// A catalogued world effect a region can enter when a threshold is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EffectType {
    /// Police flood the region after crime spikes.
    PoliceCrackdown,
    /// Open warfare between crews.
    GangWar,
    /// Legitimate business is thriving.
    EconomicBoom,
    /// The region is falling apart.
    UrbanDecay,
    /// The streets are packed; easy pickings and easy sales.
    StreetFestival,
}

impl EffectType {
    /// All effect types, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::PoliceCrackdown,
        Self::GangWar,
        Self::EconomicBoom,
        Self::UrbanDecay,
        Self::StreetFestival,
    ];

    /// Stable snake\_case name used in the database and HTTP API.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PoliceCrackdown => "police_crackdown",
            Self::GangWar => "gang_war",
            Self::EconomicBoom => "economic_boom",
            Self::UrbanDecay => "urban_decay",
            Self::StreetFestival => "street_festival",
        }
    }

    /// Parse the snake\_case name back into an effect type.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|et| et.as_str() == name)
    }
}

/// A gameplay quantity scaled by active effects.
///
/// Values are `Decimal` multipliers applied by the rest of the game
/// (crime success rolls, payout and income calculations). When several
/// active effects carry the same key, the combination rule is
/// **later-wins**: the modifier from the most recently started effect
/// applies. See the reader API's combined-modifier merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ModifierKey {
    /// Multiplier on the base success chance of crimes.
    CrimeSuccessRate,
    /// Multiplier on crime payouts.
    CrimePayoutMult,
    /// Multiplier on legitimate business income.
    BusinessIncomeMult,
    /// Multiplier on property sale prices.
    PropertyPriceMult,
    /// Multiplier on heat gained from crimes.
    HeatGainMult,
}
