//! Producer-side event ingestion.
//!
//! `record_event` is the single inbound call game-action handlers make
//! when an action with territorial consequence completes (a crime, a
//! raid, a business opening, a crew battle, a property sale). It
//! validates, precomputes the delta vector, and appends -- it never
//! reads or writes region state, so producers never block on the
//! aggregation pipeline. Failures surface synchronously: an action that
//! cannot record its territorial consequence should fail loudly rather
//! than lose it.

use chrono::{DateTime, Utc};
use tracing::debug;
use turf_types::{
    ActorId, EventId, EventType, RegionId, SEVERITY_MAX, SEVERITY_MIN, TerritoryEvent,
};

use crate::error::EngineError;
use crate::impact::compute_delta;
use crate::store::TerritoryStore;

/// Record one territorial event at an explicit timestamp.
///
/// # Errors
///
/// - [`EngineError::NotFound`] for an unknown region.
/// - [`EngineError::InvalidEvent`] when severity falls outside 1-10.
#[allow(clippy::too_many_arguments)]
pub async fn record_event_at(
    store: &TerritoryStore,
    region_id: RegionId,
    event_type: EventType,
    severity: u8,
    actor_id: Option<ActorId>,
    target_id: Option<ActorId>,
    details: serde_json::Value,
    now: DateTime<Utc>,
) -> Result<TerritoryEvent, EngineError> {
    if !(SEVERITY_MIN..=SEVERITY_MAX).contains(&severity) {
        return Err(EngineError::InvalidEvent(format!(
            "severity {severity} outside {SEVERITY_MIN}-{SEVERITY_MAX}"
        )));
    }
    if !store.region_exists(region_id).await {
        return Err(EngineError::NotFound(region_id));
    }

    let event = TerritoryEvent {
        id: EventId::new(),
        region_id,
        event_type,
        severity,
        actor_id,
        target_id,
        details,
        delta: compute_delta(event_type, severity),
        processed: false,
        processed_at: None,
        created_at: now,
    };

    store.append_event(event.clone()).await;
    debug!(%region_id, ?event_type, severity, "Recorded territorial event");
    Ok(event)
}

/// Record one territorial event stamped with the current time.
///
/// # Errors
///
/// See [`record_event_at`].
pub async fn record_event(
    store: &TerritoryStore,
    region_id: RegionId,
    event_type: EventType,
    severity: u8,
    actor_id: Option<ActorId>,
    target_id: Option<ActorId>,
    details: serde_json::Value,
) -> Result<TerritoryEvent, EngineError> {
    record_event_at(
        store, region_id, event_type, severity, actor_id, target_id, details,
        Utc::now(),
    )
    .await
}
