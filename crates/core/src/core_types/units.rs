//! Semantic unit types for the physical constants of a run
//!
//! Newtype wrappers keep the material constants and step sizes from being
//! mixed up when they are threaded through configuration. All quantities are
//! `f64`: the stencil works in double precision end to end.
//!
//! # Usage
//! ```
//! use heateq_core::core_types::units::{Meters, Seconds};
//!
//! let dt = Seconds::new(0.0001);
//! let ds = Meters::new(0.001);
//! assert!(*dt < *ds);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Declares a strictly positive `f64` quantity with a display suffix.
macro_rules! positive_quantity {
    ($(#[$meta:meta])* $name:ident, $suffix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(f64);

        impl $name {
            /// Create a new value. Asserts the value is finite and > 0.
            #[inline]
            #[must_use]
            #[track_caller]
            pub fn new(value: f64) -> Self {
                assert!(
                    value.is_finite() && value > 0.0,
                    concat!(stringify!($name), "::new: value must be finite and positive")
                );
                $name(value)
            }

            /// Create without validation; `validate()` on the owning
            /// configuration catches bad values.
            #[inline]
            #[must_use]
            pub const fn new_unchecked(value: f64) -> Self {
                $name(value)
            }

            /// Get the raw f64 value
            #[inline]
            #[must_use]
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the value is usable as a physical constant.
            #[inline]
            #[must_use]
            pub fn is_valid(self) -> bool {
                self.0.is_finite() && self.0 > 0.0
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $suffix)
            }
        }
    };
}

positive_quantity!(
    /// Duration in seconds
    Seconds,
    "s"
);

positive_quantity!(
    /// Length in meters
    Meters,
    "m"
);

positive_quantity!(
    /// Density in kg/m³
    KgPerCubicMeter,
    "kg/m³"
);

positive_quantity!(
    /// Thermal conductivity in W/(m·K)
    ThermalConductivity,
    "W/(m·K)"
);

positive_quantity!(
    /// Specific heat capacity in J/(kg·K)
    SpecificHeatCapacity,
    "J/(kg·K)"
);

positive_quantity!(
    /// Thermal diffusivity α in m²/s
    ThermalDiffusivity,
    "m²/s"
);

impl ThermalDiffusivity {
    /// α = k / (ρ · c)
    #[must_use]
    pub fn from_material(
        conductivity: ThermalConductivity,
        density: KgPerCubicMeter,
        specific_heat: SpecificHeatCapacity,
    ) -> Self {
        ThermalDiffusivity(*conductivity / (*density * *specific_heat))
    }
}
