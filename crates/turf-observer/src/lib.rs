//! Observer API server for the turf territorial engine.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **REST endpoints** for querying region state, live effects,
//!   combined modifiers, and event history, plus a write endpoint for
//!   recording territorial events
//! - **Operator endpoints** for running aggregation, decay, and trigger
//!   sweeps on demand
//! - **`WebSocket` endpoint** (`/ws/sweeps`) sending a district state
//!   snapshot on connect, then live sweep frames via
//!   [`tokio::sync::broadcast`]
//! - **Minimal HTML dashboard** (`GET /`) showing district statuses
//!
//! # Architecture
//!
//! The observer holds a handle to the running
//! [`TerritoryEngine`](turf_core::TerritoryEngine) and reads its
//! in-memory store directly. Reads never take a region lease, so they
//! never block the worker loops; they may be at most one aggregation
//! interval stale, which callers tolerate.

pub mod error;
pub mod handlers;
pub mod ops;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::{AppState, SweepBroadcast, SweepKind};
