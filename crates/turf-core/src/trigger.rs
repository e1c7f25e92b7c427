//! The threshold trigger engine: turns metric extremes into time-boxed
//! world effects.
//!
//! Each evaluation compares a region's current metrics against the
//! effect catalog. A condition that holds starts a new active effect
//! unless one of that type is already live or the type is still in its
//! cooldown window (hysteresis: an effect that just ended cannot flap
//! straight back on). Evaluation reads state without the region lease --
//! slightly stale reads are acceptable -- and relies on the store's
//! uniqueness guard to make double-triggering impossible when two
//! evaluation passes race.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use turf_types::{
    ActiveEffect, EffectDefinition, EffectId, EffectType, RegionId, RegionState, SweepSummary,
    TriggerDirection,
};

use crate::catalog::EffectCatalog;
use crate::error::EngineError;
use crate::store::TerritoryStore;

/// Whether a definition's trigger condition holds for a state snapshot.
const fn condition_holds(def: &EffectDefinition, state: &RegionState) -> bool {
    let value = state.metric(def.metric);
    match def.direction {
        TriggerDirection::Above => value >= def.threshold,
        TriggerDirection::Below => value <= def.threshold,
    }
}

/// Evaluate one region against the catalog, starting effects whose
/// conditions hold and which are neither live nor cooling down.
///
/// Returns the effect types triggered by this pass. Effects are not
/// mutually exclusive across types: several can be live simultaneously.
///
/// # Errors
///
/// Returns [`EngineError::NotFound`] for an unknown region.
pub async fn evaluate_region(
    store: &TerritoryStore,
    catalog: &EffectCatalog,
    region_id: RegionId,
    now: DateTime<Utc>,
) -> Result<Vec<EffectType>, EngineError> {
    let state = store.state(region_id).await?;
    let live = store.live_effects(region_id, now).await;

    let mut triggered = Vec::new();
    for def in catalog.definitions() {
        if !condition_holds(def, &state) {
            continue;
        }
        if live.iter().any(|e| e.effect_type == def.effect_type) {
            continue;
        }
        if in_cooldown(store, region_id, def, now).await {
            debug!(%region_id, effect = ?def.effect_type, "Condition holds but effect is cooling down");
            continue;
        }

        let effect = ActiveEffect {
            id: EffectId::new(),
            region_id,
            effect_type: def.effect_type,
            modifiers: def.modifiers.clone(),
            started_at: now,
            expires_at: now + Duration::seconds(def.duration_secs),
            ended_at: None,
        };

        match store.insert_effect(effect, now).await {
            Ok(()) => {
                info!(%region_id, effect = ?def.effect_type, "Effect triggered");
                triggered.push(def.effect_type);
            }
            Err(EngineError::DuplicateEffect { .. }) => {
                // Lost a race against another evaluation pass; the
                // invariant held, so this pass simply did not trigger.
                debug!(%region_id, effect = ?def.effect_type, "Concurrent pass triggered first");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(triggered)
}

/// Whether the effect type is within its cooldown window for the region.
async fn in_cooldown(
    store: &TerritoryStore,
    region_id: RegionId,
    def: &EffectDefinition,
    now: DateTime<Utc>,
) -> bool {
    match store.last_effect_end(region_id, def.effect_type, now).await {
        Some(ended) => now < ended + Duration::seconds(def.cooldown_secs),
        None => false,
    }
}

/// Mark every lapsed effect as ended.
///
/// Idempotent; safe to run far more often than triggering.
pub async fn expire_due_effects(store: &TerritoryStore, now: DateTime<Utc>) -> u32 {
    let expired = store.expire_due(now).await;
    if expired > 0 {
        info!(expired, "Expired lapsed effects");
    }
    expired
}

/// One trigger worker tick: expire lapsed effects, then evaluate every
/// region against the catalog. One region's failure is logged and does
/// not stop the sweep.
pub async fn trigger_sweep(
    store: &TerritoryStore,
    catalog: &EffectCatalog,
    now: DateTime<Utc>,
) -> SweepSummary {
    let mut summary = SweepSummary {
        ran_at: Some(now),
        ..SweepSummary::default()
    };
    summary.effects_expired = expire_due_effects(store, now).await;

    for region_id in store.region_ids().await {
        summary.regions_processed = summary.regions_processed.saturating_add(1);
        match evaluate_region(store, catalog, region_id, now).await {
            Ok(triggered) => {
                summary.effects_triggered = summary
                    .effects_triggered
                    .saturating_add(u32::try_from(triggered.len()).unwrap_or(u32::MAX));
            }
            Err(err) => {
                warn!(%region_id, %err, "Trigger evaluation failed for region");
            }
        }
    }

    summary
}
