//! In-memory authoritative store for territorial state.
//!
//! [`TerritoryStore`] owns the regions, their evolving state, the
//! append-only event log, and the active effects. Gameplay code never
//! mutates region state directly: producers only append events, the
//! aggregator and decay process mutate state under the per-region lease,
//! and the trigger engine creates effects through the store's uniqueness
//! guard. Durable history lives in `PostgreSQL` via `turf-db`; archival
//! of old processed events is an external concern.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use turf_types::{
    ActiveEffect, EffectType, EventId, Region, RegionId, RegionState, TerritoryEvent,
};

use crate::error::EngineError;
use crate::lock::RegionLocks;

/// The in-memory state owned by the engine.
#[derive(Debug, Default)]
pub struct TerritoryStore {
    /// Static region records, read-only after creation.
    regions: RwLock<BTreeMap<RegionId, Region>>,
    /// One evolving state row per region.
    states: RwLock<BTreeMap<RegionId, RegionState>>,
    /// Append-only event log. Only the `processed` transition mutates
    /// entries after insertion.
    events: RwLock<Vec<TerritoryEvent>>,
    /// Active effect instances, live and ended.
    effects: RwLock<Vec<ActiveEffect>>,
    /// Per-region mutation leases.
    locks: RegionLocks,
}

impl TerritoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-region lock registry.
    pub const fn locks(&self) -> &RegionLocks {
        &self.locks
    }

    // -----------------------------------------------------------------
    // Regions
    // -----------------------------------------------------------------

    /// Register a region at world setup, seeding its neutral state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateRegion`] if the ID is taken.
    pub async fn insert_region(&self, region: Region, now: DateTime<Utc>) -> Result<(), EngineError> {
        let mut regions = self.regions.write().await;
        if regions.contains_key(&region.id) {
            return Err(EngineError::DuplicateRegion(region.id));
        }
        let state = RegionState::neutral_for(&region, now);
        self.states.write().await.insert(region.id, state);
        regions.insert(region.id, region);
        Ok(())
    }

    /// All region IDs, in stable order.
    pub async fn region_ids(&self) -> Vec<RegionId> {
        self.regions.read().await.keys().copied().collect()
    }

    /// Fetch a region record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown region.
    pub async fn region(&self, region_id: RegionId) -> Result<Region, EngineError> {
        self.regions
            .read()
            .await
            .get(&region_id)
            .cloned()
            .ok_or(EngineError::NotFound(region_id))
    }

    /// Whether a region exists.
    pub async fn region_exists(&self, region_id: RegionId) -> bool {
        self.regions.read().await.contains_key(&region_id)
    }

    // -----------------------------------------------------------------
    // Region state
    // -----------------------------------------------------------------

    /// Fetch the current state snapshot of a region.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown region.
    pub async fn state(&self, region_id: RegionId) -> Result<RegionState, EngineError> {
        self.states
            .read()
            .await
            .get(&region_id)
            .cloned()
            .ok_or(EngineError::NotFound(region_id))
    }

    /// All region states, keyed by region.
    pub async fn all_states(&self) -> BTreeMap<RegionId, RegionState> {
        self.states.read().await.clone()
    }

    /// Overwrite a region's state.
    ///
    /// Callers must hold the region's lease; the decay process uses this
    /// directly, the aggregator goes through [`Self::commit_aggregation`].
    pub async fn write_state(&self, state: RegionState) {
        self.states.write().await.insert(state.region_id, state);
    }

    // -----------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------

    /// Append one immutable event to the log. Pure sink; never blocks
    /// on the aggregation pipeline.
    pub async fn append_event(&self, event: TerritoryEvent) {
        self.events.write().await.push(event);
    }

    /// Unprocessed events for a region, oldest first, bounded by `limit`.
    pub async fn unprocessed_events(
        &self,
        region_id: RegionId,
        limit: usize,
    ) -> Vec<TerritoryEvent> {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.region_id == region_id && !e.processed)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Count of unprocessed events for a region.
    pub async fn unprocessed_count(&self, region_id: RegionId) -> usize {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.region_id == region_id && !e.processed)
            .count()
    }

    /// Count conflict events (crew battles, raids) at or above a severity
    /// floor recorded in the trailing window starting at `cutoff`.
    ///
    /// The rolling crew-tension recomputation reads this; both processed
    /// and unprocessed events count, since tension follows the history,
    /// not the processing state.
    pub async fn conflict_count_since(
        &self,
        region_id: RegionId,
        cutoff: DateTime<Utc>,
        min_severity: u8,
    ) -> u32 {
        let count = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| {
                e.region_id == region_id
                    && e.event_type.is_conflict()
                    && e.severity >= min_severity
                    && e.created_at >= cutoff
            })
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Atomically write the new region state and flip the batch's
    /// `processed` flags.
    ///
    /// The caller holds the region's lease, so no other mutator can
    /// interleave; a failure before this call leaves the batch untouched
    /// for the next tick (no partial metric update, no partial marking).
    pub async fn commit_aggregation(
        &self,
        state: RegionState,
        batch: &[EventId],
        now: DateTime<Utc>,
    ) {
        let region_id = state.region_id;
        let mut states = self.states.write().await;
        let mut events = self.events.write().await;
        states.insert(region_id, state);
        for event in events.iter_mut() {
            if batch.contains(&event.id) {
                event.processed = true;
                event.processed_at = Some(now);
            }
        }
    }

    /// Snapshot of the full event log, for the persistence mirror.
    pub async fn events_snapshot(&self) -> Vec<TerritoryEvent> {
        self.events.read().await.clone()
    }

    /// Recent events for a region, newest first, bounded by `limit`.
    pub async fn recent_events(&self, region_id: RegionId, limit: usize) -> Vec<TerritoryEvent> {
        self.events
            .read()
            .await
            .iter()
            .rev()
            .filter(|e| e.region_id == region_id)
            .take(limit)
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------
    // Active effects
    // -----------------------------------------------------------------

    /// Insert a new active effect, enforcing the at-most-one-live
    /// invariant per (region, effect type) inside the write lock.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateEffect`] if a live instance of
    /// the same type already exists -- the losing side of a racing
    /// evaluation pass lands here and simply does not trigger.
    pub async fn insert_effect(
        &self,
        effect: ActiveEffect,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let mut effects = self.effects.write().await;
        let duplicate = effects.iter().any(|e| {
            e.region_id == effect.region_id
                && e.effect_type == effect.effect_type
                && e.is_live(now)
        });
        if duplicate {
            return Err(EngineError::DuplicateEffect {
                region_id: effect.region_id,
                effect_type: effect.effect_type,
            });
        }
        effects.push(effect);
        Ok(())
    }

    /// All live (non-ended, non-expired) effects for a region.
    pub async fn live_effects(&self, region_id: RegionId, now: DateTime<Utc>) -> Vec<ActiveEffect> {
        self.effects
            .read()
            .await
            .iter()
            .filter(|e| e.region_id == region_id && e.is_live(now))
            .cloned()
            .collect()
    }

    /// The most recent end time of an effect type in a region, for the
    /// cooldown check.
    ///
    /// An instance past its expiry counts as ended at `expires_at` even
    /// if the expiry sweep has not flipped it yet, so a threshold that
    /// still holds cannot retrigger the moment an effect lapses.
    pub async fn last_effect_end(
        &self,
        region_id: RegionId,
        effect_type: EffectType,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        self.effects
            .read()
            .await
            .iter()
            .filter(|e| e.region_id == region_id && e.effect_type == effect_type)
            .filter_map(|e| {
                e.ended_at
                    .or_else(|| (e.expires_at <= now).then_some(e.expires_at))
            })
            .max()
    }

    /// Snapshot of every effect instance, live and ended, for the
    /// persistence mirror.
    pub async fn effects_snapshot(&self) -> Vec<ActiveEffect> {
        self.effects.read().await.clone()
    }

    /// Mark every effect whose expiry has passed as ended.
    ///
    /// Idempotent: ending an already-ended effect is a no-op, so this
    /// sweep can run far more often than triggering.
    pub async fn expire_due(&self, now: DateTime<Utc>) -> u32 {
        let mut expired: u32 = 0;
        let mut effects = self.effects.write().await;
        for effect in effects.iter_mut() {
            if effect.ended_at.is_none() && effect.expires_at <= now {
                effect.ended_at = Some(effect.expires_at);
                expired = expired.saturating_add(1);
            }
        }
        expired
    }

    /// Explicitly end a live effect before its expiry.
    ///
    /// Returns `true` if a live instance was found and ended.
    pub async fn cancel_effect(
        &self,
        region_id: RegionId,
        effect_type: EffectType,
        now: DateTime<Utc>,
    ) -> bool {
        let mut effects = self.effects.write().await;
        for effect in effects.iter_mut() {
            if effect.region_id == region_id
                && effect.effect_type == effect_type
                && effect.is_live(now)
            {
                effect.ended_at = Some(now);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use turf_types::{EffectId, ModifierSet};

    use super::*;

    fn make_region(name: &str) -> Region {
        Region {
            id: RegionId::new(),
            name: name.to_owned(),
            base_police: 50,
            base_economy: 50,
            created_at: Utc::now(),
        }
    }

    fn make_effect(region_id: RegionId, now: DateTime<Utc>) -> ActiveEffect {
        ActiveEffect {
            id: EffectId::new(),
            region_id,
            effect_type: EffectType::PoliceCrackdown,
            modifiers: ModifierSet::new(),
            started_at: now,
            expires_at: now + Duration::hours(6),
            ended_at: None,
        }
    }

    #[tokio::test]
    async fn duplicate_region_is_rejected() {
        let store = TerritoryStore::new();
        let region = make_region("Dockside");
        let now = Utc::now();
        store.insert_region(region.clone(), now).await.unwrap();
        let again = store.insert_region(region, now).await;
        assert!(matches!(again, Err(EngineError::DuplicateRegion(_))));
    }

    #[tokio::test]
    async fn unknown_region_state_is_not_found() {
        let store = TerritoryStore::new();
        let missing = RegionId::new();
        assert!(matches!(
            store.state(missing).await,
            Err(EngineError::NotFound(r)) if r == missing
        ));
    }

    #[tokio::test]
    async fn second_live_effect_of_same_type_is_rejected() {
        let store = TerritoryStore::new();
        let region_id = RegionId::new();
        let now = Utc::now();

        store.insert_effect(make_effect(region_id, now), now).await.unwrap();
        let second = store.insert_effect(make_effect(region_id, now), now).await;
        assert!(matches!(second, Err(EngineError::DuplicateEffect { .. })));

        // A different region is unaffected.
        let other = RegionId::new();
        store.insert_effect(make_effect(other, now), now).await.unwrap();
    }

    #[tokio::test]
    async fn expiry_sweep_is_idempotent() {
        let store = TerritoryStore::new();
        let region_id = RegionId::new();
        let now = Utc::now();

        store.insert_effect(make_effect(region_id, now), now).await.unwrap();
        let later = now + Duration::hours(7);
        assert_eq!(store.expire_due(later).await, 1);
        assert_eq!(store.expire_due(later).await, 0);
        assert!(store.live_effects(region_id, later).await.is_empty());
    }

    #[tokio::test]
    async fn lapsed_but_unswept_effect_still_counts_as_ended() {
        let store = TerritoryStore::new();
        let region_id = RegionId::new();
        let now = Utc::now();

        store.insert_effect(make_effect(region_id, now), now).await.unwrap();
        // No expiry sweep has run, but the instance is past expiry.
        let later = now + Duration::hours(7);
        let end = store
            .last_effect_end(region_id, EffectType::PoliceCrackdown, later)
            .await;
        assert_eq!(end, Some(now + Duration::hours(6)));
    }

    #[tokio::test]
    async fn cancel_ends_a_live_effect() {
        let store = TerritoryStore::new();
        let region_id = RegionId::new();
        let now = Utc::now();

        store.insert_effect(make_effect(region_id, now), now).await.unwrap();
        assert!(store.cancel_effect(region_id, EffectType::PoliceCrackdown, now).await);
        assert!(store.live_effects(region_id, now).await.is_empty());
        // Nothing left to cancel.
        assert!(!store.cancel_effect(region_id, EffectType::PoliceCrackdown, now).await);
    }
}
