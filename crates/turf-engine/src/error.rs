//! Error types for the territory engine binary.
//!
//! [`EngineBinError`] wraps the failure modes of engine startup so
//! `main` can propagate everything with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineBinError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: turf_core::ConfigError,
    },

    /// Engine setup failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: turf_core::EngineError,
    },

    /// Database connection or migration failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: turf_db::DbError,
    },

    /// Observer API server failed.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: turf_observer::ServerError,
    },
}
