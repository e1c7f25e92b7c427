//! The aggregator: folds unprocessed events into region state.
//!
//! Each run claims the region's unprocessed events (bounded batch), sums
//! their delta vectors, clamp-applies them to the current state, derives
//! the supplementary counters and status, then writes the new state and
//! marks the batch processed in one atomic step under the region's
//! lease. A run that finds zero events is a cheap no-op, so scheduling
//! is free to be aggressive.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use turf_types::{
    DeltaVector, RegionId, RegionState, SweepSummary, TerritoryEvent, clamp_metric,
};

use crate::config::AggregationConfig;
use crate::error::EngineError;
use crate::status::derive_status;
use crate::store::TerritoryStore;

/// Process one region's unprocessed events.
///
/// Returns the number of events folded in (zero when there was nothing
/// to do). Runs for different regions proceed in parallel; runs for the
/// same region are mutually exclusive via the region lease.
///
/// # Errors
///
/// - [`EngineError::NotFound`] for an unknown region.
/// - [`EngineError::Conflict`] when another mutation holds the region's
///   lease; the batch is untouched and the next tick retries.
pub async fn process_region(
    store: &TerritoryStore,
    config: &AggregationConfig,
    region_id: RegionId,
    now: DateTime<Utc>,
) -> Result<u32, EngineError> {
    if !store.region_exists(region_id).await {
        return Err(EngineError::NotFound(region_id));
    }

    let _lease = store.locks().try_acquire(region_id).await?;

    let batch = store
        .unprocessed_events(region_id, config.max_events_per_batch)
        .await;
    if batch.is_empty() {
        return Ok(0);
    }

    let state = store.state(region_id).await?;
    let crew_tension = rolling_tension(store, config, region_id, now).await;
    let new_state = fold_batch(&state, &batch, crew_tension, now);

    let batch_ids: Vec<_> = batch.iter().map(|e| e.id).collect();
    let folded = u32::try_from(batch_ids.len()).unwrap_or(u32::MAX);
    store.commit_aggregation(new_state, &batch_ids, now).await;

    debug!(%region_id, events = folded, "Aggregated region batch");
    Ok(folded)
}

/// Run aggregation across every region.
///
/// Each region is processed independently: a failure (or a held lease)
/// in one region is logged and does not stop the sweep.
pub async fn aggregation_sweep(
    store: &TerritoryStore,
    config: &AggregationConfig,
    now: DateTime<Utc>,
) -> SweepSummary {
    let mut summary = SweepSummary {
        ran_at: Some(now),
        ..SweepSummary::default()
    };

    for region_id in store.region_ids().await {
        summary.regions_processed = summary.regions_processed.saturating_add(1);
        match process_region(store, config, region_id, now).await {
            Ok(folded) => {
                summary.events_consumed = summary.events_consumed.saturating_add(folded);
            }
            Err(EngineError::Conflict(_)) => {
                debug!(%region_id, "Region lease held, deferring to next tick");
            }
            Err(err) => {
                warn!(%region_id, %err, "Aggregation failed for region");
            }
        }
    }

    summary
}

/// Recompute crew tension from the rolling conflict window.
async fn rolling_tension(
    store: &TerritoryStore,
    config: &AggregationConfig,
    region_id: RegionId,
    now: DateTime<Utc>,
) -> i64 {
    let cutoff = now - Duration::hours(config.tension_window_hours);
    let conflicts = store
        .conflict_count_since(region_id, cutoff, config.tension_min_severity)
        .await;
    clamp_metric(i64::from(conflicts).saturating_mul(config.tension_per_conflict))
}

/// Pure fold of one event batch into a region state.
///
/// Sums the precomputed delta vectors, clamp-applies them, bumps heat
/// from heat-drawing severities, advances the daily counters, and
/// re-derives the status. `crew_tension` arrives precomputed from the
/// rolling window.
fn fold_batch(
    state: &RegionState,
    batch: &[TerritoryEvent],
    crew_tension: i64,
    now: DateTime<Utc>,
) -> RegionState {
    let summed = batch
        .iter()
        .fold(DeltaVector::ZERO, |acc, e| acc.saturating_add(e.delta));
    let metrics = state.metrics.apply(summed);

    let heat_gain = batch
        .iter()
        .filter(|e| e.event_type.draws_heat())
        .fold(0_i64, |acc, e| acc.saturating_add(i64::from(e.severity)));
    let heat_level = clamp_metric(state.heat_level.saturating_add(heat_gain));

    let conflicts = batch.iter().filter(|e| e.event_type.is_conflict()).count();

    RegionState {
        region_id: state.region_id,
        metrics,
        heat_level,
        crew_tension,
        status: derive_status(&metrics, crew_tension),
        events_today: state
            .events_today
            .saturating_add(u32::try_from(batch.len()).unwrap_or(u32::MAX)),
        conflicts_today: state
            .conflicts_today
            .saturating_add(u32::try_from(conflicts).unwrap_or(u32::MAX)),
        updated_at: now,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use turf_types::{DistrictStatus, EventType, Region};

    use super::*;
    use crate::record;

    async fn seeded_store() -> (TerritoryStore, RegionId) {
        let store = TerritoryStore::new();
        let region = Region {
            id: RegionId::new(),
            name: String::from("Dockside"),
            base_police: 50,
            base_economy: 50,
            created_at: Utc::now(),
        };
        let id = region.id;
        store.insert_region(region, Utc::now()).await.unwrap();
        (store, id)
    }

    async fn record_one(
        store: &TerritoryStore,
        region_id: RegionId,
        event_type: EventType,
        severity: u8,
        now: DateTime<Utc>,
    ) {
        record::record_event_at(
            store,
            region_id,
            event_type,
            severity,
            None,
            None,
            serde_json::Value::Null,
            now,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn draining_leaves_no_unprocessed_events() {
        let (store, region_id) = seeded_store().await;
        let config = AggregationConfig::default();
        let now = Utc::now();

        record_one(&store, region_id, EventType::CrimeCommitted, 5, now).await;
        record_one(&store, region_id, EventType::BusinessOpened, 3, now).await;

        let folded = process_region(&store, &config, region_id, now).await.unwrap();
        assert_eq!(folded, 2);
        assert_eq!(store.unprocessed_count(region_id).await, 0);
    }

    #[tokio::test]
    async fn second_tick_is_a_no_op() {
        let (store, region_id) = seeded_store().await;
        let config = AggregationConfig::default();
        let now = Utc::now();

        record_one(&store, region_id, EventType::CrimeCommitted, 5, now).await;
        process_region(&store, &config, region_id, now).await.unwrap();
        let state_after_first = store.state(region_id).await.unwrap();

        let folded = process_region(&store, &config, region_id, now).await.unwrap();
        assert_eq!(folded, 0);
        assert_eq!(store.state(region_id).await.unwrap(), state_after_first);
    }

    #[tokio::test]
    async fn metrics_stay_bounded_under_extreme_input() {
        let (store, region_id) = seeded_store().await;
        let config = AggregationConfig::default();
        let now = Utc::now();

        for _ in 0..40 {
            record_one(&store, region_id, EventType::CrewBattle, 10, now).await;
        }
        process_region(&store, &config, region_id, now).await.unwrap();

        let state = store.state(region_id).await.unwrap();
        assert!(state.in_bounds());
        assert_eq!(state.metrics.crime_index, 100);
        assert_eq!(state.metrics.business_health, 0);
        assert_eq!(state.heat_level, 100);
        assert_eq!(state.crew_tension, 100);
    }

    #[tokio::test]
    async fn warzone_scenario_from_neutral() {
        // Three severity-8 crimes and one severity-9 crew battle from an
        // all-50 start: crime spikes to the ceiling, the economy tanks.
        let (store, region_id) = seeded_store().await;
        let config = AggregationConfig::default();
        let now = Utc::now();

        for _ in 0..3 {
            record_one(&store, region_id, EventType::CrimeCommitted, 8, now).await;
        }
        record_one(&store, region_id, EventType::CrewBattle, 9, now).await;

        let folded = process_region(&store, &config, region_id, now).await.unwrap();
        assert_eq!(folded, 4);

        let state = store.state(region_id).await.unwrap();
        // Sum: crime +75, police +42, property -42, business -42, street +6.
        assert_eq!(state.metrics.crime_index, 100);
        assert_eq!(state.metrics.police_presence, 92);
        assert_eq!(state.metrics.property_values, 8);
        assert_eq!(state.metrics.business_health, 8);
        assert_eq!(state.metrics.street_activity, 56);
        // One qualifying conflict in the window.
        assert_eq!(state.crew_tension, 25);
        // Heat: three crimes at 8 plus the battle at 9.
        assert_eq!(state.heat_level, 33);
        assert_eq!(state.events_today, 4);
        assert_eq!(state.conflicts_today, 1);
        // Crime is extreme but tension has not reached the warzone bar;
        // the collapsed economy dominates instead.
        assert_eq!(state.status, DistrictStatus::Declining);
        assert!(state.in_bounds());
    }

    #[tokio::test]
    async fn repeated_battles_reach_warzone() {
        let (store, region_id) = seeded_store().await;
        let config = AggregationConfig::default();
        let now = Utc::now();

        for _ in 0..3 {
            record_one(&store, region_id, EventType::CrewBattle, 9, now).await;
        }
        process_region(&store, &config, region_id, now).await.unwrap();

        let state = store.state(region_id).await.unwrap();
        assert_eq!(state.crew_tension, 75);
        assert_eq!(state.metrics.crime_index, 100);
        assert_eq!(state.status, DistrictStatus::Warzone);
    }

    #[tokio::test]
    async fn stored_status_matches_rederivation() {
        let (store, region_id) = seeded_store().await;
        let config = AggregationConfig::default();
        let now = Utc::now();

        record_one(&store, region_id, EventType::BusinessOpened, 9, now).await;
        record_one(&store, region_id, EventType::PropertySale, 7, now).await;
        record_one(&store, region_id, EventType::CrimeCommitted, 2, now).await;
        process_region(&store, &config, region_id, now).await.unwrap();

        let state = store.state(region_id).await.unwrap();
        assert_eq!(
            state.status,
            crate::status::derive_status(&state.metrics, state.crew_tension)
        );
    }

    #[tokio::test]
    async fn batch_cap_leaves_remainder_for_next_tick() {
        let (store, region_id) = seeded_store().await;
        let config = AggregationConfig {
            max_events_per_batch: 3,
            ..AggregationConfig::default()
        };
        let now = Utc::now();

        for _ in 0..5 {
            record_one(&store, region_id, EventType::PropertySale, 1, now).await;
        }
        assert_eq!(process_region(&store, &config, region_id, now).await.unwrap(), 3);
        assert_eq!(store.unprocessed_count(region_id).await, 2);
        assert_eq!(process_region(&store, &config, region_id, now).await.unwrap(), 2);
        assert_eq!(store.unprocessed_count(region_id).await, 0);
    }

    #[tokio::test]
    async fn unknown_region_is_not_found() {
        let store = TerritoryStore::new();
        let config = AggregationConfig::default();
        let missing = RegionId::new();
        let result = process_region(&store, &config, missing, Utc::now()).await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn held_lease_yields_conflict() {
        let (store, region_id) = seeded_store().await;
        let config = AggregationConfig::default();
        let now = Utc::now();
        record_one(&store, region_id, EventType::CrimeCommitted, 5, now).await;

        let _lease = store.locks().acquire(region_id).await;
        let result = process_region(&store, &config, region_id, now).await;
        assert!(matches!(result, Err(EngineError::Conflict(_))));
        // Batch untouched for the next tick.
        assert_eq!(store.unprocessed_count(region_id).await, 1);
    }

    #[tokio::test]
    async fn sweep_tolerates_a_locked_region() {
        let (store, region_a) = seeded_store().await;
        let region_b = Region {
            id: RegionId::new(),
            name: String::from("Uptown"),
            base_police: 50,
            base_economy: 50,
            created_at: Utc::now(),
        };
        let b_id = region_b.id;
        store.insert_region(region_b, Utc::now()).await.unwrap();

        let config = AggregationConfig::default();
        let now = Utc::now();
        record_one(&store, region_a, EventType::CrimeCommitted, 5, now).await;
        record_one(&store, b_id, EventType::CrimeCommitted, 5, now).await;

        let _lease = store.locks().acquire(region_a).await;
        let summary = aggregation_sweep(&store, &config, now).await;
        assert_eq!(summary.regions_processed, 2);
        assert_eq!(summary.events_consumed, 1);
        assert_eq!(store.unprocessed_count(b_id).await, 0);
        assert_eq!(store.unprocessed_count(region_a).await, 1);
    }
}
