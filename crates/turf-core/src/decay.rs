//! The decay process: a first-order low-pass filter on region state.
//!
//! Every decay interval, regions whose state has not been touched for at
//! least one interval have `crime_index` and `police_presence` pulled one
//! step toward the neutral baseline of 50 (never overshooting), their
//! heat and crew tension reduced by fixed amounts floored at 0, and
//! their daily counters reset. This is what keeps a single historic
//! burst from becoming a permanent world state. It is a nudge, not a
//! reset.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};
use turf_types::{METRIC_BASELINE, RegionId, RegionState, SweepSummary};

use crate::config::DecayConfig;
use crate::error::EngineError;
use crate::status::derive_status;
use crate::store::TerritoryStore;

/// Move `value` one `step` toward `target` without overshooting.
const fn step_toward(value: i64, target: i64, step: i64) -> i64 {
    if value > target {
        let next = value.saturating_sub(step);
        if next < target { target } else { next }
    } else if value < target {
        let next = value.saturating_add(step);
        if next > target { target } else { next }
    } else {
        value
    }
}

/// Apply one decay interval to a region, if it is idle.
///
/// A region is idle when its state was last written at least `idle`
/// ago. Returns `true` if decay was applied. Acquires the same
/// per-region lease as aggregation, so the two can never interleave on
/// one region.
///
/// # Errors
///
/// - [`EngineError::NotFound`] for an unknown region.
/// - [`EngineError::Conflict`] when another mutation holds the lease;
///   the next scheduled sweep retries.
pub async fn decay_region(
    store: &TerritoryStore,
    config: &DecayConfig,
    idle: Duration,
    region_id: RegionId,
    now: DateTime<Utc>,
) -> Result<bool, EngineError> {
    if !store.region_exists(region_id).await {
        return Err(EngineError::NotFound(region_id));
    }

    let _lease = store.locks().try_acquire(region_id).await?;

    let state = store.state(region_id).await?;
    if state.updated_at > now - idle {
        return Ok(false);
    }

    let decayed = decay_state(&state, config, now);
    store.write_state(decayed).await;
    debug!(%region_id, "Decayed region toward baseline");
    Ok(true)
}

/// Run decay across every region. One region's failure is logged and
/// does not stop the sweep. `regions_processed` counts every region
/// visited, whether or not it was idle long enough to decay.
pub async fn decay_sweep(
    store: &TerritoryStore,
    config: &DecayConfig,
    idle: Duration,
    now: DateTime<Utc>,
) -> SweepSummary {
    let mut summary = SweepSummary {
        ran_at: Some(now),
        ..SweepSummary::default()
    };

    for region_id in store.region_ids().await {
        summary.regions_processed = summary.regions_processed.saturating_add(1);
        match decay_region(store, config, idle, region_id, now).await {
            Ok(_) => {}
            Err(EngineError::Conflict(_)) => {
                debug!(%region_id, "Region lease held, deferring decay");
            }
            Err(err) => {
                warn!(%region_id, %err, "Decay failed for region");
            }
        }
    }

    summary
}

/// Pure decay of one state snapshot.
fn decay_state(state: &RegionState, config: &DecayConfig, now: DateTime<Utc>) -> RegionState {
    let mut metrics = state.metrics;
    metrics.crime_index = step_toward(metrics.crime_index, METRIC_BASELINE, config.metric_step);
    metrics.police_presence =
        step_toward(metrics.police_presence, METRIC_BASELINE, config.metric_step);

    let heat_level = state.heat_level.saturating_sub(config.heat_step).max(0);
    let crew_tension = state.crew_tension.saturating_sub(config.tension_step).max(0);

    RegionState {
        region_id: state.region_id,
        metrics,
        heat_level,
        crew_tension,
        status: derive_status(&metrics, crew_tension),
        events_today: 0,
        conflicts_today: 0,
        updated_at: now,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use turf_types::{DistrictStatus, Region};

    use super::*;

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

    #[test]
    fn step_toward_never_overshoots() {
        assert_eq!(step_toward(90, 50, 5), 85);
        assert_eq!(step_toward(52, 50, 5), 50);
        assert_eq!(step_toward(10, 50, 5), 15);
        assert_eq!(step_toward(48, 50, 5), 50);
        assert_eq!(step_toward(50, 50, 5), 50);
    }

    #[tokio::test]
    async fn idle_region_decays_by_exactly_one_step() {
        let (store, region_id) = seeded_store().await;
        let config = DecayConfig::default();
        let now = Utc::now();

        // Untouched for three hours with an extreme crime index.
        let mut state = store.state(region_id).await.unwrap();
        state.metrics.crime_index = 90;
        state.heat_level = 40;
        state.crew_tension = 7;
        state.events_today = 12;
        state.updated_at = now - Duration::hours(3);
        store.write_state(state).await;

        let applied = decay_region(&store, &config, Duration::hours(1), region_id, now)
            .await
            .unwrap();
        assert!(applied);

        let state = store.state(region_id).await.unwrap();
        // One step, not a jump to 50.
        assert_eq!(state.metrics.crime_index, 85);
        assert_eq!(state.heat_level, 30);
        // Floored at 0, never negative.
        assert_eq!(state.crew_tension, 0);
        assert_eq!(state.events_today, 0);
        assert_eq!(state.conflicts_today, 0);
    }

    #[tokio::test]
    async fn recently_touched_region_is_skipped() {
        let (store, region_id) = seeded_store().await;
        let config = DecayConfig::default();
        let now = Utc::now();

        let applied = decay_region(&store, &config, Duration::hours(1), region_id, now)
            .await
            .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn decay_recomputes_status() {
        let (store, region_id) = seeded_store().await;
        let config = DecayConfig {
            metric_step: 20,
            ..DecayConfig::default()
        };
        let now = Utc::now();

        let mut state = store.state(region_id).await.unwrap();
        state.metrics.crime_index = 60;
        state.crew_tension = 45;
        state.status = DistrictStatus::Volatile;
        state.updated_at = now - Duration::hours(2);
        store.write_state(state).await;

        decay_region(&store, &config, Duration::hours(1), region_id, now)
            .await
            .unwrap();

        let state = store.state(region_id).await.unwrap();
        assert_eq!(state.metrics.crime_index, 50);
        assert_eq!(state.status, DistrictStatus::Stable);
        assert_eq!(
            state.status,
            derive_status(&state.metrics, state.crew_tension)
        );
    }

    #[tokio::test]
    async fn sweep_counts_every_region_visited() {
        let store = TerritoryStore::new();
        let now = Utc::now();
        for name in ["Dockside", "Lowmarket"] {
            let region = Region {
                id: RegionId::new(),
                name: String::from(name),
                base_police: 50,
                base_economy: 50,
                created_at: now,
            };
            store.insert_region(region, now).await.unwrap();
        }

        // Both regions were just written, so neither is idle.
        let summary =
            decay_sweep(&store, &DecayConfig::default(), Duration::hours(1), now).await;
        assert_eq!(summary.regions_processed, 2);

        // Same count once they are idle and actually decay.
        for region_id in store.region_ids().await {
            let mut state = store.state(region_id).await.unwrap();
            state.metrics.crime_index = 90;
            state.updated_at = now - Duration::hours(3);
            store.write_state(state).await;
        }
        let summary =
            decay_sweep(&store, &DecayConfig::default(), Duration::hours(1), now).await;
        assert_eq!(summary.regions_processed, 2);
    }

    #[tokio::test]
    async fn decay_respects_the_region_lease() {
        let (store, region_id) = seeded_store().await;
        let config = DecayConfig::default();
        let now = Utc::now();

        let _lease = store.locks().acquire(region_id).await;
        let result = decay_region(&store, &config, Duration::hours(1), region_id, now).await;
        assert!(matches!(result, Err(EngineError::Conflict(_))));
    }
}
