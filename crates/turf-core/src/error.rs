//! Error types for the territorial engine.
//!
//! The taxonomy follows the engine's failure policy: producer-side
//! errors (`NotFound`, `InvalidEvent`) surface synchronously to the
//! caller; `Conflict` and `Transient` are internal to the periodic
//! workers, which log, abort the tick cleanly, and retry on schedule.

use turf_types::{EffectType, RegionId};

/// Errors that can occur in the territorial engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The referenced region is unknown to the engine.
    #[error("region not found: {0}")]
    NotFound(RegionId),

    /// The region is currently locked by another state mutation.
    /// Never user-visible; the caller simply retries next tick.
    #[error("region {0} is locked by a concurrent state mutation")]
    Conflict(RegionId),

    /// The event was rejected at ingestion (bad severity or an event
    /// type unknown to the impact calculator).
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Backing storage was unavailable during a tick. The tick aborts
    /// and the next scheduled tick retries.
    #[error("transient storage error: {0}")]
    Transient(String),

    /// A region with this ID already exists (world setup error).
    #[error("region already exists: {0}")]
    DuplicateRegion(RegionId),

    /// A live effect of this type already exists for the region.
    /// Raised by the store's uniqueness guard when two evaluation
    /// passes race; the losing pass treats it as "not triggered".
    #[error("effect {effect_type:?} is already active in region {region_id}")]
    DuplicateEffect {
        /// The region the effect was being created for.
        region_id: RegionId,
        /// The effect type that was already live.
        effect_type: EffectType,
    },
}
