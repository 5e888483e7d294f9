//! Diffusion backend trait definition
//!
//! This module defines the `DiffusionBackend` trait, the interface shared by
//! the barrier engine, the rayon solver and the sequential reference.

use super::fields::TemperatureField;
use crate::error::Result;

/// Backend-agnostic interface for advancing a temperature field
///
/// Every implementation applies the same FTCS cell update, so for identical
/// inputs all backends produce bit-identical fields.
pub trait DiffusionBackend: Send + Sync {
    /// Advance `field` in place by `iterations` stencil rounds
    ///
    /// # Arguments
    ///
    /// * `field` - Temperatures after the last completed round; replaced by
    ///   the result
    /// * `coeff` - Per-step update coefficient `α·Δt / Δs²`
    /// * `iterations` - Rounds to run; zero leaves `field` untouched
    ///
    /// # Errors
    ///
    /// `Allocation` if working buffers cannot be reserved, `WorkerPanicked`
    /// if a parallel worker failed.
    fn advance(&self, field: &mut TemperatureField, coeff: f64, iterations: usize) -> Result<()>;

    /// Short backend name for logs and CLI output
    fn name(&self) -> &'static str;

    /// Degree of parallelism (1 for the sequential reference)
    fn workers(&self) -> usize;

    /// Log the backend's configuration at info level
    fn describe(&self);
}
