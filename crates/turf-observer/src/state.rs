//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds a handle to the running [`TerritoryEngine`] and
//! the broadcast channel for sweep summaries. All REST reads go
//! straight to the engine's in-memory store, so the observer never
//! blocks the worker loops.

use std::sync::Arc;

use tokio::sync::broadcast;
use turf_core::TerritoryEngine;
use turf_types::SweepSummary;

/// Capacity of the broadcast channel for sweep summaries.
///
/// If a subscriber falls behind by more than this many messages it will
/// receive a [`broadcast::error::RecvError::Lagged`] and skip to the
/// newest message.
const BROADCAST_CAPACITY: usize = 256;

/// The periodic worker a sweep summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepKind {
    /// The event aggregation worker.
    Aggregation,
    /// The decay worker.
    Decay,
    /// The trigger evaluation / expiry worker.
    Trigger,
}

/// JSON-serializable sweep report pushed over the `WebSocket`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SweepBroadcast {
    /// Which worker ran.
    pub kind: SweepKind,
    /// What it did.
    pub summary: SweepSummary,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The running engine.
    pub engine: Arc<TerritoryEngine>,
    /// Broadcast sender for sweep summaries.
    pub tx: broadcast::Sender<SweepBroadcast>,
}

impl AppState {
    /// Create application state around a running engine.
    pub fn new(engine: Arc<TerritoryEngine>) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { engine, tx }
    }

    /// Subscribe to the sweep broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<SweepBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a sweep summary to all connected clients.
    ///
    /// Returns the number of receivers that got the message; zero when
    /// no clients are connected, which is not an error.
    pub fn broadcast(&self, kind: SweepKind, summary: SweepSummary) -> usize {
        self.tx
            .send(SweepBroadcast { kind, summary })
            .unwrap_or(0)
    }
}
