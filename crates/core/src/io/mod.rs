//! Collaborators at the edges of a run: filling the initial grid and
//! writing results.

pub mod initializer;
pub mod writer;

pub use initializer::{GridInitializer, HotSpot, SplitPlate, UniformTemperature};
pub use writer::{ResultWriter, TextGridWriter, DEFAULT_OUTPUT_PATH};
