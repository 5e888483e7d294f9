//! Plate material constants
//!
//! A [`Material`] bundles the three constants that fix the plate's thermal
//! diffusivity. Presets cover a handful of common metals; copper is the
//! default.

use super::units::{KgPerCubicMeter, SpecificHeatCapacity, ThermalConductivity, ThermalDiffusivity};
use crate::error::{HeatEqError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Thermal properties of the plate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Density (kg/m³)
    pub density: KgPerCubicMeter,
    /// Thermal conductivity (W/(m·K))
    pub conductivity: ThermalConductivity,
    /// Specific heat capacity (J/(kg·K))
    pub specific_heat_capacity: SpecificHeatCapacity,
}

impl Material {
    /// Copper
    pub const COPPER: Material = Material::from_raw(8.96e3, 401.0, 390.0);
    /// Aluminium
    pub const ALUMINIUM: Material = Material::from_raw(2.70e3, 237.0, 897.0);
    /// Pure iron
    pub const IRON: Material = Material::from_raw(7.87e3, 80.2, 449.0);
    /// Silver
    pub const SILVER: Material = Material::from_raw(10.49e3, 429.0, 235.0);

    const fn from_raw(density: f64, conductivity: f64, specific_heat_capacity: f64) -> Self {
        Self {
            density: KgPerCubicMeter::new_unchecked(density),
            conductivity: ThermalConductivity::new_unchecked(conductivity),
            specific_heat_capacity: SpecificHeatCapacity::new_unchecked(specific_heat_capacity),
        }
    }

    /// Thermal diffusivity α = k / (ρ · c)
    #[must_use]
    pub fn diffusivity(&self) -> ThermalDiffusivity {
        ThermalDiffusivity::from_material(self.conductivity, self.density, self.specific_heat_capacity)
    }

    /// Check every constant is finite and positive.
    pub fn validate(&self) -> Result<()> {
        if !self.density.is_valid() {
            return Err(HeatEqError::invalid("density", "must be finite and positive"));
        }
        if !self.conductivity.is_valid() {
            return Err(HeatEqError::invalid("conductivity", "must be finite and positive"));
        }
        if !self.specific_heat_capacity.is_valid() {
            return Err(HeatEqError::invalid(
                "specific_heat_capacity",
                "must be finite and positive",
            ));
        }
        Ok(())
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::COPPER
    }
}

impl FromStr for Material {
    type Err = HeatEqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "copper" | "cu" => Ok(Self::COPPER),
            "aluminium" | "aluminum" | "al" => Ok(Self::ALUMINIUM),
            "iron" | "fe" => Ok(Self::IRON),
            "silver" | "ag" => Ok(Self::SILVER),
            other => Err(HeatEqError::invalid(
                "material",
                format!("unknown preset '{other}' (copper, aluminium, iron, silver)"),
            )),
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ρ={}, k={}, c={}",
            self.density, self.conductivity, self.specific_heat_capacity
        )
    }
}
