//! FTCS heat diffusion kernel
//!
//! The explicit update for the 2-D heat equation:
//! ```text
//! ∂T/∂t = α∇²T
//! T'(i,j) = T(i,j) + coeff · (δ²ᵢT + δ²ⱼT),    coeff = α·Δt / Δs²
//! ```
//!
//! Every cell is updated, boundary cells included. A second difference along
//! an axis only exists where both neighbours on that axis are in range; what
//! happens when one is missing is selected by [`BoundaryMode`].
//!
//! All backends funnel through [`update_cell`], so the barrier engine, the
//! rayon solver and the sequential reference agree bit for bit.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Treatment of a derivative term whose stencil leaves the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryMode {
    /// Drop the term. Corners get no term at all and keep their value.
    #[default]
    Omitted,
    /// Mirror the centre value into the missing neighbour (zero flux).
    /// The term degenerates to a one-sided difference and heat is conserved.
    Insulated,
}

/// Whether `δ²ᵢ` exists at `row`: both `row - 1` and `row + 1` are in range.
#[inline]
#[must_use]
pub fn has_vertical_derivative(row: usize, height: usize) -> bool {
    row >= 1 && row + 1 < height
}

/// Whether `δ²ⱼ` exists at `col`: both `col - 1` and `col + 1` are in range.
#[inline]
#[must_use]
pub fn has_horizontal_derivative(col: usize, width: usize) -> bool {
    col >= 1 && col + 1 < width
}

/// Second difference along one axis.
///
/// `before`/`after` are the neighbours on that axis, `None` when outside the
/// grid.
#[inline(always)]
fn axis_term(before: Option<f64>, center: f64, after: Option<f64>, boundary: BoundaryMode) -> f64 {
    match (before, after, boundary) {
        (Some(b), Some(a), _) => b + a - 2.0 * center,
        (_, _, BoundaryMode::Omitted) => 0.0,
        (b, a, BoundaryMode::Insulated) => b.unwrap_or(center) + a.unwrap_or(center) - 2.0 * center,
    }
}

/// New value of cell `(row, col)` read through `prev`.
///
/// `prev(r, c)` must return the previous-round value at `(r, c)`; it is only
/// called for in-range coordinates.
#[inline(always)]
pub fn update_cell<F>(
    prev: F,
    row: usize,
    col: usize,
    width: usize,
    height: usize,
    coeff: f64,
    boundary: BoundaryMode,
) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    let center = prev(row, col);
    let mut sum = 0.0;

    if has_vertical_derivative(row, height) || boundary == BoundaryMode::Insulated {
        let up = (row >= 1).then(|| prev(row - 1, col));
        let down = (row + 1 < height).then(|| prev(row + 1, col));
        sum += axis_term(up, center, down, boundary);
    }

    if has_horizontal_derivative(col, width) || boundary == BoundaryMode::Insulated {
        let left = (col >= 1).then(|| prev(row, col - 1));
        let right = (col + 1 < width).then(|| prev(row, col + 1));
        sum += axis_term(left, center, right, boundary);
    }

    center + coeff * sum
}

/// Compute one row of `temp_out` from `temp_in`.
#[inline]
fn diffuse_row(
    temp_in: &[f64],
    row_out: &mut [f64],
    row: usize,
    width: usize,
    height: usize,
    coeff: f64,
    boundary: BoundaryMode,
) {
    let prev = |r: usize, c: usize| temp_in[r * width + c];
    for (col, cell) in row_out.iter_mut().enumerate() {
        *cell = update_cell(prev, row, col, width, height, coeff, boundary);
    }
}

/// One diffusion step over the whole grid, rows in parallel (rayon)
///
/// # Arguments
///
/// * `temp_in` - Previous-round temperatures (row-major)
/// * `temp_out` - Receives the new temperatures; same length as `temp_in`
/// * `width` - Grid width in cells
/// * `height` - Grid height in cells
/// * `coeff` - `α·Δt / Δs²`
/// * `boundary` - Treatment of edge derivative terms
pub fn step_heat_diffusion_cpu(
    temp_in: &[f64],
    temp_out: &mut [f64],
    width: usize,
    height: usize,
    coeff: f64,
    boundary: BoundaryMode,
) {
    debug_assert_eq!(temp_in.len(), width * height);
    debug_assert_eq!(temp_out.len(), width * height);

    temp_out
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, row_out)| {
            diffuse_row(temp_in, row_out, row, width, height, coeff, boundary);
        });
}

/// One diffusion step, single-threaded. This is the reference the parallel
/// backends are checked against.
pub fn step_heat_diffusion_sequential(
    temp_in: &[f64],
    temp_out: &mut [f64],
    width: usize,
    height: usize,
    coeff: f64,
    boundary: BoundaryMode,
) {
    debug_assert_eq!(temp_in.len(), width * height);
    debug_assert_eq!(temp_out.len(), width * height);

    for (row, row_out) in temp_out.chunks_mut(width).enumerate() {
        diffuse_row(temp_in, row_out, row, width, height, coeff, boundary);
    }
}
