//! Shared type definitions for the Turf territorial state engine.
//!
//! This crate is the single source of truth for all types used across the
//! Turf workspace. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the game client and dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Enumeration types (events, statuses, effects, modifiers)
//! - [`metrics`] -- Bounded metric vectors and delta arithmetic
//! - [`structs`] -- Core entity structs (regions, events, effects)

pub mod enums;
pub mod ids;
pub mod metrics;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    DistrictStatus, EffectType, EventType, MetricKind, ModifierKey, TriggerDirection,
};
pub use ids::{ActorId, EffectId, EventId, RegionId};
pub use metrics::{
    clamp_metric, DELTA_CAP, DeltaVector, METRIC_BASELINE, METRIC_MAX, METRIC_MIN, Metrics,
};
pub use structs::{
    ActiveEffect, EffectDefinition, ModifierSet, Region, RegionState, SEVERITY_MAX, SEVERITY_MIN,
    SweepSummary, TerritoryEvent,
};
