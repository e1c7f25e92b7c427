//! Post-sweep persistence: mirrors the in-memory authoritative state
//! into `PostgreSQL`.
//!
//! The engine binary calls these after each worker tick. All writes are
//! idempotent (UNNEST insert with `ON CONFLICT DO NOTHING`, upserts,
//! guarded updates), so replaying a mirror pass after a crash is safe.

use sqlx::PgPool;
use turf_types::{ActiveEffect, Region, RegionState, TerritoryEvent};

use crate::effect_store::EffectStore;
use crate::error::DbError;
use crate::event_store::EventStore;
use crate::state_store::StateStore;

/// Write region records at world setup.
///
/// # Errors
///
/// Returns [`DbError`] if any insert fails.
pub async fn mirror_regions(pool: &PgPool, regions: &[Region]) -> Result<(), DbError> {
    let store = StateStore::new(pool);
    for region in regions {
        store.upsert_region(region).await?;
    }
    tracing::debug!(regions = regions.len(), "Mirrored region records");
    Ok(())
}

/// Mirror the event log slice and the latest state snapshots.
///
/// Events are inserted with their current `processed` flags; events
/// already persisted keep their rows, and a follow-up `mark_processed`
/// from the caller brings flags up to date.
///
/// # Errors
///
/// Returns [`DbError`] if any write fails.
pub async fn mirror_aggregation(
    pool: &PgPool,
    events: &[TerritoryEvent],
    states: &[RegionState],
) -> Result<(), DbError> {
    let event_store = EventStore::new(pool);
    event_store.batch_insert(events).await?;

    let processed: Vec<_> = events
        .iter()
        .filter(|e| e.processed)
        .map(|e| (e.id, e.processed_at))
        .collect();
    for (id, processed_at) in processed {
        if let Some(at) = processed_at {
            event_store.mark_processed(&[id], at).await?;
        }
    }

    let state_store = StateStore::new(pool);
    for state in states {
        state_store.upsert_state(state).await?;
    }

    tracing::debug!(
        events = events.len(),
        states = states.len(),
        "Mirrored aggregation output"
    );
    Ok(())
}

/// Mirror the latest state snapshots only.
///
/// Used after decay sweeps, which touch states but never the event log.
///
/// # Errors
///
/// Returns [`DbError`] if any upsert fails.
pub async fn mirror_states(pool: &PgPool, states: &[RegionState]) -> Result<(), DbError> {
    let store = StateStore::new(pool);
    for state in states {
        store.upsert_state(state).await?;
    }
    tracing::debug!(states = states.len(), "Mirrored state snapshots");
    Ok(())
}

/// Mirror effect instances, live and ended.
///
/// # Errors
///
/// Returns [`DbError`] if any write fails.
pub async fn mirror_effects(pool: &PgPool, effects: &[ActiveEffect]) -> Result<(), DbError> {
    let store = EffectStore::new(pool);
    for effect in effects {
        store.insert_effect(effect).await?;
        if let Some(ended_at) = effect.ended_at {
            store.end_effect(effect.id, ended_at).await?;
        }
    }
    tracing::debug!(effects = effects.len(), "Mirrored effect instances");
    Ok(())
}
