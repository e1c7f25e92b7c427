//! The engine facade tying the store, catalog, and configuration
//! together.
//!
//! [`TerritoryEngine`] is what the observer and the binary hold: it
//! seeds the world from configuration, stamps wall-clock time on every
//! operation, and delegates to the pipeline modules. The free functions
//! in [`crate::aggregate`], [`crate::decay`], and [`crate::trigger`]
//! take an explicit `now` so tests can drive time; this facade is the
//! real-time entry point.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use turf_types::{
    ActiveEffect, ActorId, EventType, ModifierSet, Region, RegionId, RegionState, SweepSummary,
    TerritoryEvent,
};

use crate::catalog::EffectCatalog;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::store::TerritoryStore;
use crate::{aggregate, decay, reader, record, trigger};

/// The running engine: authoritative store plus tuning.
#[derive(Debug)]
pub struct TerritoryEngine {
    store: Arc<TerritoryStore>,
    catalog: EffectCatalog,
    config: EngineConfig,
}

impl TerritoryEngine {
    /// Build an engine from configuration, seeding the configured
    /// regions at their neutral baselines.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DuplicateRegion`] if two seeds collide,
    /// which cannot happen with generated IDs but is propagated rather
    /// than swallowed.
    pub async fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        let store = Arc::new(TerritoryStore::new());
        let now = Utc::now();
        for seed in &config.regions {
            let region = Region {
                id: RegionId::new(),
                name: seed.name.clone(),
                base_police: seed.base_police,
                base_economy: seed.base_economy,
                created_at: now,
            };
            info!(region_id = %region.id, name = %region.name, "Seeding region");
            store.insert_region(region, now).await?;
        }
        let catalog = EffectCatalog::with_overrides(&config.effects);
        Ok(Self {
            store,
            catalog,
            config,
        })
    }

    /// The shared store, for persistence hooks that snapshot it.
    pub const fn store(&self) -> &Arc<TerritoryStore> {
        &self.store
    }

    /// The engine configuration as loaded.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The effect catalog after overrides.
    pub const fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    /// All known region IDs.
    pub async fn region_ids(&self) -> Vec<RegionId> {
        self.store.region_ids().await
    }

    /// Fetch a region record by ID.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown region.
    pub async fn region(&self, region_id: RegionId) -> Result<Region, EngineError> {
        self.store.region(region_id).await
    }

    // -----------------------------------------------------------------
    // Write path
    // -----------------------------------------------------------------

    /// Record a gameplay event against a region.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidEvent`] for an out-of-range
    /// severity, or [`EngineError::NotFound`] for an unknown region.
    pub async fn record_event(
        &self,
        region_id: RegionId,
        event_type: EventType,
        severity: u8,
        actor_id: Option<ActorId>,
        target_id: Option<ActorId>,
        details: serde_json::Value,
    ) -> Result<TerritoryEvent, EngineError> {
        record::record_event(
            &self.store,
            region_id,
            event_type,
            severity,
            actor_id,
            target_id,
            details,
        )
        .await
    }

    // -----------------------------------------------------------------
    // Read path
    // -----------------------------------------------------------------

    /// Current state snapshot of a region.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown region.
    pub async fn region_state(&self, region_id: RegionId) -> Result<RegionState, EngineError> {
        reader::region_state(&self.store, region_id).await
    }

    /// All region states, in stable region order.
    pub async fn all_states(&self) -> Vec<RegionState> {
        self.store.all_states().await.into_values().collect()
    }

    /// Currently live effects for a region.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown region.
    pub async fn active_effects(
        &self,
        region_id: RegionId,
    ) -> Result<Vec<ActiveEffect>, EngineError> {
        reader::active_effects(&self.store, region_id, Utc::now()).await
    }

    /// The merged modifier map for a region (later effect wins).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown region.
    pub async fn combined_modifiers(
        &self,
        region_id: RegionId,
    ) -> Result<ModifierSet, EngineError> {
        reader::combined_modifiers(&self.store, region_id, Utc::now()).await
    }

    /// Recent events for a region, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for an unknown region.
    pub async fn region_history(
        &self,
        region_id: RegionId,
        limit: usize,
    ) -> Result<Vec<TerritoryEvent>, EngineError> {
        reader::region_history(&self.store, region_id, limit).await
    }

    // -----------------------------------------------------------------
    // Sweeps
    // -----------------------------------------------------------------

    /// Run one aggregation sweep over all regions, now.
    pub async fn aggregate(&self) -> SweepSummary {
        aggregate::aggregation_sweep(&self.store, &self.config.aggregation, Utc::now()).await
    }

    /// Run one decay sweep over all regions, now. Only regions idle for
    /// at least the decay interval are touched.
    pub async fn decay(&self) -> SweepSummary {
        let idle = Duration::seconds(
            i64::try_from(self.config.workers.decay_interval_secs).unwrap_or(i64::MAX),
        );
        decay::decay_sweep(&self.store, &self.config.decay, idle, Utc::now()).await
    }

    /// Run one trigger sweep: expire lapsed effects, then evaluate
    /// thresholds for all regions, now.
    pub async fn trigger(&self) -> SweepSummary {
        trigger::trigger_sweep(&self.store, &self.catalog, Utc::now()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use turf_types::DistrictStatus;

    use super::*;

    fn two_region_config() -> EngineConfig {
        EngineConfig::parse(
            r"
regions:
  - name: Dockside
    base_police: 30
    base_economy: 40
  - name: Uptown
    base_police: 70
    base_economy: 80
",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn from_config_seeds_neutral_regions() {
        let engine = TerritoryEngine::from_config(two_region_config())
            .await
            .unwrap();
        let ids = engine.region_ids().await;
        assert_eq!(ids.len(), 2);

        let states = engine.all_states().await;
        assert_eq!(states.len(), 2);
        for state in &states {
            assert_eq!(state.status, DistrictStatus::Stable);
            assert_eq!(state.heat_level, 0);
            assert!(state.in_bounds());
        }
    }

    #[tokio::test]
    async fn record_then_aggregate_moves_state() {
        let engine = TerritoryEngine::from_config(two_region_config())
            .await
            .unwrap();
        let region_id = *engine.region_ids().await.first().unwrap();

        engine
            .record_event(
                region_id,
                EventType::CrimeCommitted,
                5,
                None,
                None,
                serde_json::json!({"kind": "burglary"}),
            )
            .await
            .unwrap();

        let summary = engine.aggregate().await;
        assert_eq!(summary.events_consumed, 1);
        assert_eq!(summary.regions_processed, 2);

        let state = engine.region_state(region_id).await.unwrap();
        assert_eq!(state.events_today, 1);
        assert_eq!(state.heat_level, 5);

        let history = engine.region_history(region_id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history.first().unwrap().processed);
    }

    #[tokio::test]
    async fn fresh_world_has_no_modifiers() {
        let engine = TerritoryEngine::from_config(two_region_config())
            .await
            .unwrap();
        let region_id = *engine.region_ids().await.first().unwrap();
        assert!(engine.active_effects(region_id).await.unwrap().is_empty());
        assert!(engine
            .combined_modifiers(region_id)
            .await
            .unwrap()
            .is_empty());
    }
}
