//! Error types for AnimForge

use thiserror::Error;

/// Core error type
///
/// Only `InvalidArgument` ever crosses the public façade; every other
/// failure in the scheduler is absorbed and logged. Animation requests are
/// fire-and-forget triggers from gameplay code and must never crash a frame.
#[derive(Debug, Error)]
pub enum AfError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type AfResult<T> = Result<T, AfError>;
