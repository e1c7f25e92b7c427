//! `PostgreSQL` persistence layer for the turf territorial engine.
//!
//! The engine's authoritative state lives in memory (`turf-core`);
//! `PostgreSQL` is the durable mirror behind it: the full event
//! history, the latest state snapshot per region, and the effect
//! record. The engine binary pushes to this layer after each worker
//! tick, and world setup reloads nothing from it -- the mirror is for
//! history, audit, and external analytics.
//!
//! # Modules
//!
//! - [`postgres`] -- connection pool and configuration
//! - [`event_store`] -- event history inserts and queries
//! - [`state_store`] -- region records and state snapshots
//! - [`effect_store`] -- active effect instances
//! - [`mirror`] -- post-sweep persistence entry points
//! - [`error`] -- shared error types

pub mod effect_store;
pub mod error;
pub mod event_store;
pub mod mirror;
pub mod postgres;
pub mod state_store;

// Re-export primary types for convenience.
pub use effect_store::{EffectRow, EffectStore};
pub use error::DbError;
pub use event_store::{EventRow, EventStore};
pub use postgres::{PostgresConfig, PostgresPool};
pub use state_store::{RegionRow, RegionStateRow, StateStore};
