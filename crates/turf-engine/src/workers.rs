//! Periodic sweep workers.
//!
//! Three tokio tasks drive the world forward. The aggregation worker
//! folds unprocessed events into region states, the decay worker pulls
//! idle regions back toward their baselines, and the trigger worker
//! fires and expires territory effects. Every tick broadcasts its
//! [`SweepSummary`](turf_types::SweepSummary) to `WebSocket`
//! subscribers and, when persistence is enabled, mirrors the touched
//! data into `PostgreSQL`.
//!
//! Mirror failures are logged and swallowed: the in-memory state is
//! authoritative, and every mirror write is idempotent, so the next
//! tick repairs any gap.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};
use turf_db::PostgresPool;
use turf_db::mirror;
use turf_observer::{AppState, SweepKind};

/// Join handles for the three periodic workers.
///
/// The workers run until the process exits; the handles exist so `main`
/// can keep them alive and detect a panic-free abort.
pub struct WorkerHandles {
    /// Event aggregation sweep task.
    pub aggregation: JoinHandle<()>,
    /// Decay sweep task.
    pub decay: JoinHandle<()>,
    /// Trigger evaluation / expiry sweep task.
    pub trigger: JoinHandle<()>,
}

/// Spawn the three periodic workers with intervals from the engine
/// configuration.
///
/// Each worker skips the interval's immediate first tick so a fresh
/// world is not swept before anything has happened.
pub fn spawn_workers(state: &Arc<AppState>, pool: Option<Arc<PostgresPool>>) -> WorkerHandles {
    let workers = &state.engine.config().workers;

    let aggregation = spawn_aggregation(
        Arc::clone(state),
        pool.clone(),
        Duration::from_secs(workers.aggregation_interval_secs),
    );
    let decay = spawn_decay(
        Arc::clone(state),
        pool.clone(),
        Duration::from_secs(workers.decay_interval_secs),
    );
    let trigger = spawn_trigger(
        Arc::clone(state),
        pool,
        Duration::from_secs(workers.trigger_interval_secs),
    );

    WorkerHandles {
        aggregation,
        decay,
        trigger,
    }
}

fn spawn_aggregation(
    state: Arc<AppState>,
    pool: Option<Arc<PostgresPool>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_skipping_first(period).await;
        loop {
            ticker.tick().await;
            let summary = state.engine.aggregate().await;
            info!(
                regions = summary.regions_processed,
                events = summary.events_consumed,
                "Aggregation sweep complete"
            );

            if let Some(pool) = pool.as_deref() {
                let events = state.engine.store().events_snapshot().await;
                let states = state.engine.all_states().await;
                if let Err(e) = mirror::mirror_aggregation(pool.pool(), &events, &states).await {
                    warn!(error = %e, "Aggregation mirror failed, will retry next tick");
                }
            }

            state.broadcast(SweepKind::Aggregation, summary);
        }
    })
}

fn spawn_decay(
    state: Arc<AppState>,
    pool: Option<Arc<PostgresPool>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_skipping_first(period).await;
        loop {
            ticker.tick().await;
            let summary = state.engine.decay().await;
            info!(regions = summary.regions_processed, "Decay sweep complete");

            if let Some(pool) = pool.as_deref() {
                let states = state.engine.all_states().await;
                if let Err(e) = mirror::mirror_states(pool.pool(), &states).await {
                    warn!(error = %e, "Decay mirror failed, will retry next tick");
                }
            }

            state.broadcast(SweepKind::Decay, summary);
        }
    })
}

fn spawn_trigger(
    state: Arc<AppState>,
    pool: Option<Arc<PostgresPool>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_skipping_first(period).await;
        loop {
            ticker.tick().await;
            let summary = state.engine.trigger().await;
            info!(
                triggered = summary.effects_triggered,
                expired = summary.effects_expired,
                "Trigger sweep complete"
            );

            if let Some(pool) = pool.as_deref() {
                let effects = state.engine.store().effects_snapshot().await;
                if let Err(e) = mirror::mirror_effects(pool.pool(), &effects).await {
                    warn!(error = %e, "Effect mirror failed, will retry next tick");
                }
            }

            state.broadcast(SweepKind::Trigger, summary);
        }
    })
}

/// Build an interval with the immediate first tick already consumed.
async fn interval_skipping_first(period: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await;
    ticker
}
