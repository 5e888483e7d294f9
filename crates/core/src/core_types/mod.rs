//! Physical quantities and material constants

pub mod material;
pub mod units;

pub use material::Material;
pub use units::{
    KgPerCubicMeter, Meters, Seconds, SpecificHeatCapacity, ThermalConductivity,
    ThermalDiffusivity,
};
