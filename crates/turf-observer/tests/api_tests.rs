//! Integration tests for the Observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. This validates handler logic and routing
//! without needing a live network connection.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use turf_core::{EngineConfig, TerritoryEngine};
use turf_observer::router::build_router;
use turf_observer::state::{AppState, SweepKind};
use turf_types::{Metrics, RegionId, SweepSummary};

async fn make_test_state() -> Arc<AppState> {
    let config = EngineConfig::parse(
        r"
regions:
  - name: Dockside
    base_police: 30
    base_economy: 40
  - name: Uptown
    base_police: 70
    # Kept below the EconomicBoom trigger so only effects a test
    # provokes on purpose can fire.
    base_economy: 60
",
    )
    .unwrap();
    let engine = TerritoryEngine::from_config(config).await.unwrap();
    Arc::new(AppState::new(Arc::new(engine)))
}

async fn first_region_id(state: &AppState) -> RegionId {
    *state.engine.region_ids().await.first().unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_post(path: &str, body: &Value) -> Request<Body> {
    Request::post(path)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let state = make_test_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_list_regions() {
    let state = make_test_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/api/regions").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 2);
    assert_eq!(json["regions"][0]["state"]["status"], "Stable");
}

#[tokio::test]
async fn test_get_region_by_id() {
    let state = make_test_state().await;
    let region_id = first_region_id(&state).await;

    let router = build_router(state);
    let path = format!("/api/regions/{region_id}");
    let response = router
        .oneshot(Request::get(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["region"]["name"], "Dockside");
    assert!(json["state"].is_object());
    assert!(json["active_effects"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_get_region_not_found() {
    let state = make_test_state().await;
    let router = build_router(state);

    let fake_id = uuid::Uuid::now_v7();
    let path = format!("/api/regions/{fake_id}");
    let response = router
        .oneshot(Request::get(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_region_invalid_uuid() {
    let state = make_test_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/regions/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_record_event_then_aggregate() {
    let state = make_test_state().await;
    let region_id = first_region_id(&state).await;
    let router = build_router(state.clone());

    // Record a crime.
    let path = format!("/api/regions/{region_id}/events");
    let body = serde_json::json!({
        "event_type": "crime_committed",
        "severity": 5,
        "details": {"kind": "burglary"},
    });
    let response = router
        .clone()
        .oneshot(json_post(&path, &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["event"]["severity"], 5);
    assert_eq!(json["event"]["processed"], false);

    // Nothing moves until aggregation runs.
    let state_before = state.engine.region_state(region_id).await.unwrap();
    assert_eq!(state_before.events_today, 0);

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/ops/aggregate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_to_json(response.into_body()).await;
    assert_eq!(summary["events_consumed"], 1);
    assert_eq!(summary["regions_processed"], 2);

    let state_after = state.engine.region_state(region_id).await.unwrap();
    assert_eq!(state_after.events_today, 1);
    assert_eq!(state_after.heat_level, 5);

    // History shows the processed event.
    let path = format!("/api/regions/{region_id}/history?limit=10");
    let response = router
        .oneshot(Request::get(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["events"][0]["processed"], true);
}

#[tokio::test]
async fn test_record_event_unknown_type_rejected() {
    let state = make_test_state().await;
    let region_id = first_region_id(&state).await;
    let router = build_router(state);

    let path = format!("/api/regions/{region_id}/events");
    let body = serde_json::json!({
        "event_type": "meteor_strike",
        "severity": 5,
    });
    let response = router.oneshot(json_post(&path, &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_record_event_bad_severity_rejected() {
    let state = make_test_state().await;
    let region_id = first_region_id(&state).await;
    let router = build_router(state);

    let path = format!("/api/regions/{region_id}/events");
    let body = serde_json::json!({
        "event_type": "crime_committed",
        "severity": 11,
    });
    let response = router.oneshot(json_post(&path, &body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trigger_sweep_fires_effect_and_serves_modifiers() {
    let state = make_test_state().await;
    let region_id = first_region_id(&state).await;

    // Push crime over the crackdown threshold directly in the store.
    let mut region_state = state.engine.region_state(region_id).await.unwrap();
    region_state.metrics = Metrics {
        crime_index: 85,
        ..region_state.metrics
    };
    region_state.updated_at = Utc::now();
    state.engine.store().write_state(region_state).await;

    let router = build_router(state.clone());

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/ops/trigger")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_to_json(response.into_body()).await;
    assert_eq!(summary["effects_triggered"], 1);

    let path = format!("/api/regions/{region_id}/effects");
    let response = router
        .clone()
        .oneshot(Request::get(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["effects"][0]["effect_type"], "PoliceCrackdown");

    // Modifiers are served as decimal strings.
    let path = format!("/api/regions/{region_id}/modifiers");
    let response = router
        .oneshot(Request::get(&path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["modifiers"]["CrimeSuccessRate"], "0.60");
}

#[tokio::test]
async fn test_decay_endpoint_returns_summary() {
    let state = make_test_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::post("/api/ops/decay")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_to_json(response.into_body()).await;
    // Fresh regions are not idle yet, so nothing decays.
    assert_eq!(summary["regions_processed"], 2);
    assert!(summary["ran_at"].is_string());
}

#[tokio::test]
async fn test_broadcast_channel() {
    let state = make_test_state().await;
    let mut rx = state.subscribe();

    let summary = SweepSummary {
        regions_processed: 2,
        events_consumed: 5,
        effects_triggered: 1,
        effects_expired: 0,
        ran_at: Some(Utc::now()),
    };

    let receivers = state.broadcast(SweepKind::Aggregation, summary);
    assert_eq!(receivers, 1);

    let received = rx.recv().await.unwrap();
    assert_eq!(received.kind, SweepKind::Aggregation);
    assert_eq!(received.summary.events_consumed, 5);
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let state = make_test_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
