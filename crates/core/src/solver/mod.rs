//! FTCS diffusion solvers
//!
//! The core abstraction is the `DiffusionBackend` trait, with three
//! implementations sharing one cell kernel:
//!
//! - [`ParallelStencilEngine`]: fixed pool of OS threads on disjoint row
//!   bands, synchronized by a barrier each round (the primary backend)
//! - [`CpuStencilSolver`]: rayon row tasks over ping-pong buffers
//! - [`SequentialStencilSolver`]: single-threaded reference
//!
//! # Example
//!
//! ```rust
//! use heateq_core::solver::{create_backend, BackendKind, EngineConfig, TemperatureField};
//!
//! let mut field = TemperatureField::new(8, 8, 100.0).unwrap();
//! let backend = create_backend(BackendKind::Barrier, &EngineConfig::default());
//! backend.advance(&mut field, 0.2, 10).unwrap();
//! assert!(field.as_slice().iter().all(|&t| t == 100.0));
//! ```

mod cpu;
pub mod double_buffer;
pub mod engine;
mod fields;
pub mod heat_transfer;
pub mod partition;
pub mod profiler;
pub mod stability;
#[allow(clippy::module_name_repetitions)]
mod r#trait;

// Re-exports
pub use cpu::{CpuStencilSolver, SequentialStencilSolver};
pub use double_buffer::{BandWriter, DoubleBuffer, ReadView, WriteView};
pub use engine::{EngineConfig, ParallelStencilEngine, SwapProtocol};
pub use fields::TemperatureField;
pub use heat_transfer::{has_horizontal_derivative, has_vertical_derivative, BoundaryMode};
pub use partition::{partition_rows, WorkChunk};
pub use profiler::ProfilerScope;
pub use r#trait::DiffusionBackend;
pub use stability::{check_stability, stability_limit};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Which backend drives the stencil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// Barrier-synchronized worker pool
    #[default]
    Barrier,
    /// Rayon row tasks
    Rayon,
    /// Single-threaded reference
    Sequential,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Barrier => "barrier",
            BackendKind::Rayon => "rayon",
            BackendKind::Sequential => "sequential",
        };
        f.write_str(name)
    }
}

impl FromStr for BackendKind {
    type Err = crate::error::HeatEqError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.to_lowercase().as_str() {
            "barrier" | "threads" => Ok(BackendKind::Barrier),
            "rayon" => Ok(BackendKind::Rayon),
            "sequential" | "reference" => Ok(BackendKind::Sequential),
            other => Err(crate::error::HeatEqError::invalid(
                "backend",
                format!("unknown backend '{other}' (barrier, rayon, sequential)"),
            )),
        }
    }
}

/// Create a diffusion backend
///
/// # Arguments
///
/// * `kind` - Which implementation to use
/// * `config` - Worker count, swap protocol and boundary mode; the rayon and
///   sequential backends only use the boundary mode
///
/// # Returns
///
/// A boxed `DiffusionBackend` trait object
pub fn create_backend(kind: BackendKind, config: &EngineConfig) -> Box<dyn DiffusionBackend> {
    let backend: Box<dyn DiffusionBackend> = match kind {
        BackendKind::Barrier => Box::new(ParallelStencilEngine::new(*config)),
        BackendKind::Rayon => Box::new(CpuStencilSolver::new(config.boundary)),
        BackendKind::Sequential => Box::new(SequentialStencilSolver::new(config.boundary)),
    };
    info!(
        "Using {} backend ({} worker(s))",
        backend.name(),
        backend.workers()
    );
    backend.describe();
    backend
}
