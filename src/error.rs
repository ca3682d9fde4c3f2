//! Error types for mission logic and ingestion.
//!
//! Mission errors are ordinary outcomes of a rover action: they are logged,
//! returned to the driver, and leave the engine usable. Configuration errors
//! signal a malformed program or mission layout and never reach the engine.

use thiserror::Error;

/// Failure of a single rover action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum MissionError {
    #[error("boundary violation: move would leave the grid")]
    BoundaryViolation,

    #[error("collision detected: obstacle ahead")]
    CollisionDetected,

    #[error("no substrate: drill attempted off the target")]
    NoSubstrate,

    #[error("no payload: transmit attempted without a sample")]
    NoPayload,
}

/// Programmer or ingestion error: bad action stream or bad mission layout.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("line {line}: unknown action `{name}`")]
    UnknownAction { line: usize, name: String },

    #[error("line {line}: invalid argument `{argument}` for `{action}`")]
    InvalidArgument {
        line: usize,
        action: String,
        argument: String,
    },

    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid { width: usize, height: usize },

    #[error("grid of {width}x{height} exceeds the {max}-cell limit")]
    GridTooLarge { width: usize, height: usize, max: usize },

    #[error("{what} at ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        what: &'static str,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("grid must contain exactly one target (found {0})")]
    TargetCount(usize),

    #[error("{what} at ({x}, {y}) overlaps an obstacle")]
    BlockedCell { what: &'static str, x: usize, y: usize },

    #[error("invalid JSON program: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, ConfigurationError>;
