//! Run orchestration

pub mod heat_simulation;

pub use heat_simulation::{HeatSimulation, RunSummary};
