//! Initial temperature assignment
//!
//! The core never judges whether initial temperatures are physically
//! plausible; an initializer just fills every cell.

use crate::solver::TemperatureField;
use serde::{Deserialize, Serialize};

/// Fills a freshly allocated field with starting temperatures
pub trait GridInitializer {
    /// Write initial values into every cell of `field`
    fn populate(&self, field: &mut TemperatureField);
}

/// Left half hot, right half cold (columns `< width / 2` are hot)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitPlate {
    /// Temperature of the left half
    pub hot: f64,
    /// Temperature of the right half
    pub cold: f64,
}

impl Default for SplitPlate {
    fn default() -> Self {
        Self {
            hot: 550.5,
            cold: 200.2,
        }
    }
}

impl GridInitializer for SplitPlate {
    fn populate(&self, field: &mut TemperatureField) {
        let width = field.width();
        let split = width / 2;
        for row in field.as_mut_slice().chunks_exact_mut(width) {
            let (hot, cold) = row.split_at_mut(split);
            hot.fill(self.hot);
            cold.fill(self.cold);
        }
    }
}

/// Every cell at the same temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformTemperature(pub f64);

impl GridInitializer for UniformTemperature {
    fn populate(&self, field: &mut TemperatureField) {
        field.fill(self.0);
    }
}

/// Uniform background with one cell at a different temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotSpot {
    /// Temperature everywhere else
    pub background: f64,
    /// Row of the spot (clamped to the grid)
    pub row: usize,
    /// Column of the spot (clamped to the grid)
    pub col: usize,
    /// Temperature of the spot
    pub temperature: f64,
}

impl GridInitializer for HotSpot {
    fn populate(&self, field: &mut TemperatureField) {
        field.fill(self.background);
        let row = self.row.min(field.height() - 1);
        let col = self.col.min(field.width() - 1);
        field.set(row, col, self.temperature);
    }
}
