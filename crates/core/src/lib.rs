//! Heat Equation Core Library
//!
//! Explicit finite-difference (FTCS) simulation of heat diffusion across a
//! rectangular metal plate.
//!
//! ## Parallel Stencil Engine
//!
//! The primary backend splits the grid into contiguous row bands, one per
//! worker thread, and advances every band in lock-step:
//! - Double-buffered grid, each round reads "previous" and writes "current"
//! - One `std::sync::Barrier` rendezvous per round, no locks on cells
//! - Stability check (`Δt < Δs² / 2α`) before anything is allocated
//! - Bit-identical results for any worker count
//!
//! ## Example
//!
//! ```rust
//! use heateq_core::{
//!     BackendKind, EngineConfig, HeatSimulation, SimulationParameters, SplitPlate, TextGridWriter,
//! };
//!
//! let params = SimulationParameters { num_iterations: 50, ..SimulationParameters::default() };
//! let mut sim = HeatSimulation::new(params, EngineConfig::default(), BackendKind::Barrier).unwrap();
//! sim.populate(&SplitPlate::default());
//!
//! let mut writer = TextGridWriter::new(Vec::new());
//! let summary = sim.run(&mut writer).unwrap();
//! assert!(summary.max_temperature <= 550.5);
//! ```

// Configuration and physical quantities
pub mod config;
pub mod core_types;
pub mod error;

// Solvers and orchestration
pub mod io;
pub mod simulation;
pub mod solver;

pub use config::SimulationParameters;
pub use core_types::{Material, Meters, Seconds, ThermalDiffusivity};
pub use error::{HeatEqError, Result};
pub use io::{GridInitializer, HotSpot, ResultWriter, SplitPlate, TextGridWriter, UniformTemperature};
pub use simulation::{HeatSimulation, RunSummary};
pub use solver::{
    create_backend, BackendKind, BoundaryMode, DiffusionBackend, EngineConfig, ParallelStencilEngine,
    SwapProtocol, TemperatureField,
};
