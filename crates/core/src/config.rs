//! Run configuration
//!
//! [`SimulationParameters`] holds everything that defines the numerical
//! problem. It is immutable once a run starts. Parameters can be built in code
//! or loaded from a JSON document; absent fields take the classic `heateq`
//! defaults (10 × 10 mm copper plate, Δt = 0.1 ms, 500
//! iterations).

use crate::core_types::{Material, Meters, Seconds, ThermalDiffusivity};
use crate::error::{HeatEqError, Result};
use crate::solver::stability::{check_stability, stability_limit};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default grid width in cells (each cell is one millimetre)
pub const DEFAULT_WIDTH: usize = 10;
/// Default grid height in cells
pub const DEFAULT_HEIGHT: usize = 10;
/// Default number of iterations
pub const DEFAULT_ITERATIONS: usize = 500;
/// Default time step (s)
pub const DEFAULT_DELTA_T: f64 = 0.0001;
/// Spacing between grid points (m)
pub const DEFAULT_DELTA_S: f64 = 0.001;

/// Immutable per-run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
    /// Time step
    pub delta_t: Seconds,
    /// Spatial step
    pub delta_s: Meters,
    /// Number of stencil rounds
    pub num_iterations: usize,
    /// Plate material
    pub material: Material,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            delta_t: Seconds::new_unchecked(DEFAULT_DELTA_T),
            delta_s: Meters::new_unchecked(DEFAULT_DELTA_S),
            num_iterations: DEFAULT_ITERATIONS,
            material: Material::default(),
        }
    }
}

impl SimulationParameters {
    /// Parse parameters from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load parameters from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Diffusivity α of the configured material
    #[must_use]
    pub fn alpha(&self) -> ThermalDiffusivity {
        self.material.diffusivity()
    }

    /// Per-step update coefficient `α·Δt / Δs²`
    #[must_use]
    pub fn coeff(&self) -> f64 {
        *self.alpha() * *self.delta_t / (*self.delta_s * *self.delta_s)
    }

    /// Largest stable time step for this material and spacing
    #[must_use]
    pub fn stability_limit(&self) -> f64 {
        stability_limit(*self.alpha(), *self.delta_s)
    }

    /// Number of cells in one buffer, or `Allocation` if it overflows.
    pub fn cell_count(&self) -> Result<usize> {
        self.width
            .checked_mul(self.height)
            .ok_or(HeatEqError::Allocation { cells: usize::MAX })
    }

    /// Check ranges, then the stability bound.
    ///
    /// Returns the stability limit on success so callers can report headroom.
    pub fn validate(&self) -> Result<f64> {
        if self.width == 0 {
            return Err(HeatEqError::invalid("width", "must be at least 1"));
        }
        if self.height == 0 {
            return Err(HeatEqError::invalid("height", "must be at least 1"));
        }
        self.cell_count()?;
        if !self.delta_t.is_valid() {
            return Err(HeatEqError::invalid("delta_t", "must be finite and positive"));
        }
        if !self.delta_s.is_valid() {
            return Err(HeatEqError::invalid("delta_s", "must be finite and positive"));
        }
        self.material.validate()?;
        check_stability(*self.alpha(), *self.delta_s, *self.delta_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_stable() {
        let params = SimulationParameters::default();
        let limit = params.validate().unwrap();
        assert_relative_eq!(limit, 0.004357107231920199, max_relative = 1e-12);
        assert_relative_eq!(params.coeff(), 0.011475503663003664, max_relative = 1e-12);
    }

    #[test]
    fn test_unstable_time_step_rejected() {
        let params = SimulationParameters {
            delta_t: Seconds::new(0.01),
            ..SimulationParameters::default()
        };
        match params.validate() {
            Err(HeatEqError::UnstableTimeStep { delta_t, limit }) => {
                assert_eq!(delta_t, 0.01);
                assert_relative_eq!(limit, params.stability_limit());
            }
            other => panic!("expected UnstableTimeStep, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let params = SimulationParameters {
            width: 0,
            ..SimulationParameters::default()
        };
        assert!(matches!(
            params.validate(),
            Err(HeatEqError::InvalidParameter { name: "width", .. })
        ));
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        let params = SimulationParameters {
            width: usize::MAX,
            height: 2,
            ..SimulationParameters::default()
        };
        assert!(matches!(params.validate(), Err(HeatEqError::Allocation { .. })));
    }

    #[test]
    fn test_json_partial_document_uses_defaults() {
        let params = SimulationParameters::from_json_str(
            r#"{ "width": 32, "height": 16, "delta_t": 0.0002, "num_iterations": 7 }"#,
        )
        .unwrap();
        assert_eq!(params.width, 32);
        assert_eq!(params.height, 16);
        assert_eq!(*params.delta_t, 0.0002);
        assert_eq!(params.num_iterations, 7);
        assert_eq!(*params.delta_s, DEFAULT_DELTA_S);
        assert_eq!(params.material, Material::COPPER);
    }

    #[test]
    fn test_json_material_override() {
        let params = SimulationParameters::from_json_str(
            r#"{ "material": { "density": 2700.0, "conductivity": 237.0, "specific_heat_capacity": 897.0 } }"#,
        )
        .unwrap();
        assert_eq!(params.material, Material::ALUMINIUM);
    }

    #[test]
    fn test_json_garbage_is_config_error() {
        assert!(matches!(
            SimulationParameters::from_json_str("{ width: }"),
            Err(HeatEqError::Config(_))
        ));
    }
}
