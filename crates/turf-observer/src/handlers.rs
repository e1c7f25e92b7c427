//! REST API endpoint handlers for the Observer server.
//!
//! All reads go to the engine's in-memory store via the shared
//! [`AppState`]; the one write endpoint appends to the event store.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/regions` | List regions with current state |
//! | `GET` | `/api/regions/:id` | Single region + state |
//! | `GET` | `/api/regions/:id/effects` | Live effects |
//! | `GET` | `/api/regions/:id/modifiers` | Combined modifier map |
//! | `GET` | `/api/regions/:id/history` | Recent events |
//! | `POST` | `/api/regions/:id/events` | Record a territorial event |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use turf_types::{ActorId, EventType, RegionId};
use uuid::Uuid;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query types
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/regions/:id/history` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of events to return (default 100, max 1000).
    pub limit: Option<usize>,
}

/// Request body for `POST /api/regions/:id/events`.
#[derive(Debug, serde::Deserialize)]
pub struct RecordEventRequest {
    /// Event type name, e.g. `crime_committed`.
    pub event_type: String,
    /// Severity, 1-10.
    pub severity: u8,
    /// The acting player or crew, if any.
    pub actor_id: Option<Uuid>,
    /// The targeted player or crew, if any.
    pub target_id: Option<Uuid>,
    /// Free-form payload for display/audit.
    #[serde(default)]
    pub details: serde_json::Value,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing current district states and API
/// links, the placeholder until the game client renders the map.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let states = state.engine.all_states().await;
    let region_count = states.len();

    let mut rows = String::new();
    for s in &states {
        let region_name = state
            .engine
            .region(s.region_id)
            .await
            .map_or_else(|_| s.region_id.to_string(), |r| r.name);
        rows.push_str(&format!(
            "<tr><td>{}</td><td class=\"status-{}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            region_name,
            s.status.as_str(),
            s.status.as_str(),
            s.metrics.crime_index,
            s.metrics.police_presence,
            s.heat_level,
            s.crew_tension,
        ));
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Turf Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        table {{ border-collapse: collapse; margin: 1rem 0; width: 100%; }}
        th, td {{
            border: 1px solid #30363d;
            padding: 0.4rem 0.8rem;
            text-align: left;
        }}
        th {{ color: #8b949e; }}
        .status-stable {{ color: #3fb950; }}
        .status-volatile {{ color: #d29922; }}
        .status-declining {{ color: #f85149; }}
        .status-gentrifying {{ color: #58a6ff; }}
        .status-warzone {{ color: #ff7b72; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        li::before {{ content: "GET "; color: #7ee787; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Turf Observer</h1>
    <p class="subtitle">Territorial state monitor -- {region_count} districts</p>

    <table>
        <tr><th>District</th><th>Status</th><th>Crime</th><th>Police</th><th>Heat</th><th>Tension</th></tr>
{rows}    </table>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li><a href="/api/regions">/api/regions</a> -- All regions with current state</li>
        <li><a href="/api/regions/:id">/api/regions/:id</a> -- Single region detail</li>
        <li><a href="/api/regions/:id/effects">/api/regions/:id/effects</a> -- Live effects</li>
        <li><a href="/api/regions/:id/modifiers">/api/regions/:id/modifiers</a> -- Combined modifiers</li>
        <li><a href="/api/regions/:id/history">/api/regions/:id/history</a> -- Recent events (?limit=N)</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li style="list-style:none;"><code>ws://host:port/ws/sweeps</code> -- District snapshot on connect, then live sweep frames</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/regions -- list regions with state
// ---------------------------------------------------------------------------

/// List every region with its current state snapshot.
pub async fn list_regions(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let engine = &state.engine;
    let mut regions = Vec::new();
    for region_id in engine.region_ids().await {
        let region = engine.region(region_id).await?;
        let region_state = engine.region_state(region_id).await?;
        regions.push(serde_json::json!({
            "region": region,
            "state": region_state,
        }));
    }

    Ok(Json(serde_json::json!({
        "count": regions.len(),
        "regions": regions,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/regions/:id -- single region detail
// ---------------------------------------------------------------------------

/// Return a single region with its state, live effects, and merged
/// modifiers in one payload.
pub async fn get_region(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let region_id = parse_region_id(&id_str)?;
    let engine = &state.engine;

    let region = engine.region(region_id).await?;
    let region_state = engine.region_state(region_id).await?;
    let effects = engine.active_effects(region_id).await?;
    let modifiers = engine.combined_modifiers(region_id).await?;

    Ok(Json(serde_json::json!({
        "region": region,
        "state": region_state,
        "active_effects": effects,
        "modifiers": modifiers,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/regions/:id/effects -- live effects
// ---------------------------------------------------------------------------

/// Live (non-ended, non-expired) effects for a region.
pub async fn get_effects(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let region_id = parse_region_id(&id_str)?;
    let effects = state.engine.active_effects(region_id).await?;

    Ok(Json(serde_json::json!({
        "count": effects.len(),
        "effects": effects,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/regions/:id/modifiers -- combined modifier map
// ---------------------------------------------------------------------------

/// The merged modifier map from all live effects (later effect wins on
/// overlapping keys). Gameplay systems read this before resolving crime
/// attempts, payouts, and income.
pub async fn get_modifiers(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let region_id = parse_region_id(&id_str)?;
    let modifiers = state.engine.combined_modifiers(region_id).await?;

    Ok(Json(serde_json::json!({
        "modifiers": modifiers,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/regions/:id/history -- recent events
// ---------------------------------------------------------------------------

/// Recent events for a region, newest first.
///
/// # Query Parameters
///
/// - `limit`: Maximum number of events to return (default 100, max 1000).
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let region_id = parse_region_id(&id_str)?;
    let limit = params.limit.unwrap_or(100).min(1000);
    let events = state.engine.region_history(region_id, limit).await?;

    Ok(Json(serde_json::json!({
        "count": events.len(),
        "events": events,
    })))
}

// ---------------------------------------------------------------------------
// POST /api/regions/:id/events -- record a territorial event
// ---------------------------------------------------------------------------

/// Record a territorial event against a region.
///
/// The append is the whole operation: the event takes effect on the
/// next aggregation sweep, not immediately. Returns the stored event.
pub async fn record_event(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
    Json(body): Json<RecordEventRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    let region_id = parse_region_id(&id_str)?;

    let event_type = EventType::parse(&body.event_type).ok_or_else(|| {
        ObserverError::InvalidRequest(format!("unknown event type: {}", body.event_type))
    })?;

    let event = state
        .engine
        .record_event(
            region_id,
            event_type,
            body.severity,
            body.actor_id.map(ActorId::from),
            body.target_id.map(ActorId::from),
            body.details,
        )
        .await?;

    Ok(Json(serde_json::json!({ "event": event })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a region ID from a path segment.
fn parse_region_id(s: &str) -> Result<RegionId, ObserverError> {
    s.parse::<Uuid>()
        .map(RegionId::from)
        .map_err(|e| ObserverError::InvalidUuid(format!("{s}: {e}")))
}
