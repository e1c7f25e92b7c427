//! Operator REST endpoints for running sweeps on demand.
//!
//! The periodic workers run these on their own intervals; these
//! endpoints exist for admin tooling and tests that need to force a
//! pass without waiting out an interval. Each returns the sweep's
//! summary and publishes it on the broadcast channel like a scheduled
//! run would.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/ops/aggregate` | Run one aggregation sweep |
//! | `POST` | `/api/ops/decay` | Run one decay sweep |
//! | `POST` | `/api/ops/trigger` | Run one trigger sweep |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::error::ObserverError;
use crate::state::{AppState, SweepKind};

/// Run one aggregation sweep over all regions.
pub async fn run_aggregate(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let summary = state.engine.aggregate().await;
    state.broadcast(SweepKind::Aggregation, summary);
    Ok(Json(summary))
}

/// Run one decay sweep over all regions.
pub async fn run_decay(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let summary = state.engine.decay().await;
    state.broadcast(SweepKind::Decay, summary);
    Ok(Json(summary))
}

/// Run one trigger sweep: expire lapsed effects, then evaluate
/// thresholds for every region.
pub async fn run_trigger(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let summary = state.engine.trigger().await;
    state.broadcast(SweepKind::Trigger, summary);
    Ok(Json(summary))
}
