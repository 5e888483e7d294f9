//! Time-step stability gate
//!
//! The explicit scheme is only bounded while `Δt < Δs² / (2α)`. The check is
//! pure and runs before any buffer is allocated.

use crate::error::{HeatEqError, Result};
use tracing::warn;

/// Above this coefficient the 2-D scheme loses the discrete maximum principle.
pub const MAX_PRINCIPLE_COEFF: f64 = 0.25;

/// Largest stable time step `Δs² / (2α)`
#[inline]
#[must_use]
pub fn stability_limit(alpha: f64, delta_s: f64) -> f64 {
    (delta_s * delta_s) / (2.0 * alpha)
}

/// Accept `delta_t` if it is strictly below the stability limit.
///
/// Returns the limit on success. On failure the error carries the limit as
/// guidance for choosing a smaller step.
pub fn check_stability(alpha: f64, delta_s: f64, delta_t: f64) -> Result<f64> {
    let limit = stability_limit(alpha, delta_s);
    if delta_t.is_nan() || delta_t >= limit {
        return Err(HeatEqError::UnstableTimeStep { delta_t, limit });
    }

    let coeff = alpha * delta_t / (delta_s * delta_s);
    if coeff > MAX_PRINCIPLE_COEFF {
        warn!(
            "coeff {:.4} exceeds {} (Δt = {} s): values may overshoot the initial range",
            coeff, MAX_PRINCIPLE_COEFF, delta_t
        );
    }
    Ok(limit)
}
