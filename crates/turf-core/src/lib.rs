//! Core engine for territorial state: the event write path, the
//! aggregation pipeline, decay, threshold triggers, and read-only state
//! projections.
//!
//! The authoritative world state lives in an in-memory
//! [`store::TerritoryStore`]; `turf-db` mirrors it to `PostgreSQL` for
//! durable history. Gameplay code appends events through
//! [`record::record_event`] and reads derived state through [`reader`];
//! everything in between runs on periodic sweeps:
//!
//! 1. [`aggregate`] folds unprocessed events into region metrics.
//! 2. [`decay`] drifts idle regions back toward baseline.
//! 3. [`trigger`] fires and expires threshold effects from the
//!    [`catalog::EffectCatalog`].
//!
//! [`engine::TerritoryEngine`] is the facade the observer and the
//! binary consume.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod decay;
pub mod engine;
pub mod error;
pub mod impact;
pub mod lock;
pub mod reader;
pub mod record;
pub mod status;
pub mod store;
pub mod trigger;

pub use catalog::EffectCatalog;
pub use config::{ConfigError, EngineConfig};
pub use engine::TerritoryEngine;
pub use error::EngineError;
pub use store::TerritoryStore;
