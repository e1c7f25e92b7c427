//! `WebSocket` endpoint for live district watching.
//!
//! Clients connect to `GET /ws/sweeps` and receive tagged JSON text
//! frames:
//!
//! - one `snapshot` frame immediately on connect, carrying the current
//!   state of every district, so a client can render the map without a
//!   separate REST round trip;
//! - a `sweep` frame each time a worker completes a pass, after which
//!   the client re-fetches or patches whatever it cares about.
//!
//! The subscription is taken before the snapshot is read, so a sweep
//! that lands between the two is still delivered. If a client falls
//! behind, lagged sweeps are skipped and it resumes from the most
//! recent one.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tracing::{debug, warn};
use turf_types::RegionState;

use crate::state::{AppState, SweepBroadcast};

/// A text frame pushed to a `WebSocket` client, tagged by `frame`.
#[derive(Debug, serde::Serialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
enum WsFrame {
    /// Full district state, sent once on connect.
    Snapshot {
        /// Current state of every district.
        regions: Vec<RegionState>,
    },
    /// A completed worker pass.
    Sweep {
        /// Which worker ran and what it did.
        #[serde(flatten)]
        broadcast: SweepBroadcast,
    },
}

/// Upgrade an HTTP request to a `WebSocket` connection.
///
/// # Route
///
/// `GET /ws/sweeps`
pub async fn ws_sweeps(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Run the connection: snapshot first, then forward sweeps until
/// either side hangs up.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    debug!("WebSocket client connected");

    // Subscribe before reading the snapshot so no sweep is lost
    // between the two.
    let mut rx = state.subscribe();

    let snapshot = WsFrame::Snapshot {
        regions: state.engine.all_states().await,
    };
    let Some(frame) = encode_frame(&snapshot) else {
        return;
    };
    if socket.send(Message::Text(frame.into())).await.is_err() {
        debug!("WebSocket client disconnected before snapshot");
        return;
    }

    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(broadcast) => {
                        let Some(frame) = encode_frame(&WsFrame::Sweep { broadcast }) else {
                            continue;
                        };
                        if socket.send(Message::Text(frame.into())).await.is_err() {
                            debug!("WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        debug!("Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!("WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Clients have nothing to say to this endpoint.
                    }
                }
            }
        }
    }
}

/// Serialize a frame, logging rather than killing the connection on
/// the (unreachable in practice) serialization failure.
fn encode_frame(frame: &WsFrame) -> Option<String> {
    match serde_json::to_string(frame) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!("Failed to serialize WebSocket frame: {e}");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use turf_types::{Region, RegionId, SweepSummary};

    use super::*;
    use crate::state::SweepKind;

    #[test]
    fn snapshot_frame_is_tagged_and_lists_regions() {
        let region = Region {
            id: RegionId::new(),
            name: String::from("Dockside"),
            base_police: 30,
            base_economy: 40,
            created_at: Utc::now(),
        };
        let frame = WsFrame::Snapshot {
            regions: vec![RegionState::neutral_for(&region, Utc::now())],
        };
        let json: serde_json::Value =
            serde_json::from_str(&encode_frame(&frame).unwrap()).unwrap();

        assert_eq!(json["frame"], "snapshot");
        let regions = json["regions"].as_array().unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0]["status"], "Stable");
    }

    #[test]
    fn sweep_frame_flattens_the_broadcast() {
        let frame = WsFrame::Sweep {
            broadcast: SweepBroadcast {
                kind: SweepKind::Decay,
                summary: SweepSummary {
                    regions_processed: 3,
                    ran_at: Some(Utc::now()),
                    ..SweepSummary::default()
                },
            },
        };
        let json: serde_json::Value =
            serde_json::from_str(&encode_frame(&frame).unwrap()).unwrap();

        assert_eq!(json["frame"], "sweep");
        assert_eq!(json["kind"], "decay");
        assert_eq!(json["summary"]["regions_processed"], 3);
    }
}
