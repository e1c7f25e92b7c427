//! The state reader: read-only projections for the rest of the game.
//!
//! Crime success lookups, income calculations, and the UI all consume
//! these. There is no write path here, and readers tolerate state that
//! is at most one aggregation interval stale -- they only ever see
//! committed, fully-derived snapshots.

use chrono::{DateTime, Utc};
use turf_types::{ActiveEffect, ModifierSet, RegionId, RegionState, TerritoryEvent};

use crate::error::EngineError;
use crate::store::TerritoryStore;

/// Current state snapshot of a region.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown region.
pub async fn region_state(
    store: &TerritoryStore,
    region_id: RegionId,
) -> Result<RegionState, EngineError> {
    store.state(region_id).await
}

/// Live (non-ended, non-expired) effects for a region.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown region.
pub async fn active_effects(
    store: &TerritoryStore,
    region_id: RegionId,
    now: DateTime<Utc>,
) -> Result<Vec<ActiveEffect>, EngineError> {
    if !store.region_exists(region_id).await {
        return Err(EngineError::NotFound(region_id));
    }
    Ok(store.live_effects(region_id, now).await)
}

/// The flattened modifier map from all live effects of a region.
///
/// Combination rule (documented, not hidden): **later wins**. Effects
/// are merged in start order, ties broken by effect ID, so for any
/// modifier key carried by several live effects the value from the most
/// recently started effect applies. Callers apply the result to crime
/// success rates, payout multipliers, and the like.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown region.
pub async fn combined_modifiers(
    store: &TerritoryStore,
    region_id: RegionId,
    now: DateTime<Utc>,
) -> Result<ModifierSet, EngineError> {
    let effects = active_effects(store, region_id, now).await?;
    Ok(merge_modifiers(&effects))
}

/// Recent event history for a region, newest first.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown region.
pub async fn region_history(
    store: &TerritoryStore,
    region_id: RegionId,
    limit: usize,
) -> Result<Vec<TerritoryEvent>, EngineError> {
    if !store.region_exists(region_id).await {
        return Err(EngineError::NotFound(region_id));
    }
    Ok(store.recent_events(region_id, limit).await)
}

/// Later-wins merge over the effects' modifier maps.
fn merge_modifiers(effects: &[ActiveEffect]) -> ModifierSet {
    let mut ordered: Vec<&ActiveEffect> = effects.iter().collect();
    ordered.sort_by_key(|e| (e.started_at, e.id));

    let mut merged = ModifierSet::new();
    for effect in ordered {
        for (key, value) in &effect.modifiers {
            merged.insert(*key, *value);
        }
    }
    merged
}
