//! Error types for the heat diffusion simulation.
//!
//! Every failure is fatal at the point of detection: there is no retry path
//! and no partial result is salvaged. Callers either get a finished grid or
//! one of these errors.

use thiserror::Error;

/// Errors raised while configuring, running or persisting a simulation.
#[derive(Debug, Error)]
pub enum HeatEqError {
    /// The time step violates the explicit scheme's stability bound.
    #[error("time step {delta_t} s is unstable; set a time interval less than {limit:.5} seconds")]
    UnstableTimeStep { delta_t: f64, limit: f64 },

    /// A configuration value is out of its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// An initial field does not match the configured grid shape.
    #[error("grid shape mismatch: expected {expected:?} (width, height), got {actual:?}")]
    GridShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// Grid storage could not be allocated.
    #[error("failed to allocate storage for {cells} grid cells")]
    Allocation { cells: usize },

    /// A stencil worker panicked; the shared grid is no longer trustworthy.
    #[error("stencil worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },

    /// Reading configuration or writing results failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl HeatEqError {
    /// Creates an invalid-parameter error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HeatEqError>;
