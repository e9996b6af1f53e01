//! Error types for the dashboard engine.
//!
//! Normalization and derivation are total and never produce these; they come
//! from configuration, serialization and the transport boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("upstream error: {0}")]
    Upstream(#[from] dashboard_client::DashboardError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
