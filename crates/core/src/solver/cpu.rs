//! Rayon and sequential diffusion backends
//!
//! Both keep a plain `Vec<f64>` ping-pong pair: read from one, write the
//! other, then `std::mem::swap`. The rayon backend splits each round into
//! parallel row tasks; the sequential backend is the single-threaded
//! reference the parallel paths are tested against.

use super::fields::TemperatureField;
use super::heat_transfer::{
    step_heat_diffusion_cpu, step_heat_diffusion_sequential, BoundaryMode,
};
use super::profiler::ProfilerScope;
use super::DiffusionBackend;
use crate::error::Result;
use tracing::info;

type StepFn = fn(&[f64], &mut [f64], usize, usize, f64, BoundaryMode);

/// Run `iterations` ping-pong rounds of `step` on `field`.
fn ping_pong(
    field: &mut TemperatureField,
    coeff: f64,
    iterations: usize,
    boundary: BoundaryMode,
    step: StepFn,
) -> Result<()> {
    if iterations == 0 {
        return Ok(());
    }

    let (width, height) = field.dimensions();
    let mut back = TemperatureField::new(width, height, 0.0)?;

    for _ in 0..iterations {
        step(
            field.as_slice(),
            back.as_mut_slice(),
            width,
            height,
            coeff,
            boundary,
        );

        // Swap buffers
        std::mem::swap(field, &mut back);
    }
    Ok(())
}

/// Diffusion backend using rayon's work-stealing pool, one task per row
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuStencilSolver {
    boundary: BoundaryMode,
}

impl CpuStencilSolver {
    /// Create a rayon-backed solver
    #[must_use]
    pub fn new(boundary: BoundaryMode) -> Self {
        Self { boundary }
    }
}

impl DiffusionBackend for CpuStencilSolver {
    fn advance(&self, field: &mut TemperatureField, coeff: f64, iterations: usize) -> Result<()> {
        let _scope = ProfilerScope::new("rayon_stencil_run");
        ping_pong(field, coeff, iterations, self.boundary, step_heat_diffusion_cpu)
    }

    fn name(&self) -> &'static str {
        "rayon"
    }

    fn workers(&self) -> usize {
        rayon::current_num_threads()
    }

    fn describe(&self) {
        info!(
            "Rayon solver: {} pool threads, {:?} boundary",
            self.workers(),
            self.boundary
        );
    }
}

/// Single-threaded reference solver
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialStencilSolver {
    boundary: BoundaryMode,
}

impl SequentialStencilSolver {
    /// Create the reference solver
    #[must_use]
    pub fn new(boundary: BoundaryMode) -> Self {
        Self { boundary }
    }
}

impl DiffusionBackend for SequentialStencilSolver {
    fn advance(&self, field: &mut TemperatureField, coeff: f64, iterations: usize) -> Result<()> {
        let _scope = ProfilerScope::new("sequential_stencil_run");
        ping_pong(
            field,
            coeff,
            iterations,
            self.boundary,
            step_heat_diffusion_sequential,
        )
    }

    fn name(&self) -> &'static str {
        "sequential"
    }

    fn workers(&self) -> usize {
        1
    }

    fn describe(&self) {
        info!("Sequential reference solver, {:?} boundary", self.boundary);
    }
}
