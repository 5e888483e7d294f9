//! Plate simulation driving a `DiffusionBackend`
//!
//! `HeatSimulation` owns the grid and the chosen backend. Construction
//! validates the parameters and performs the stability check, so an unstable
//! configuration never allocates.

use crate::config::SimulationParameters;
use crate::error::{HeatEqError, Result};
use crate::io::{GridInitializer, ResultWriter};
use crate::solver::{create_backend, BackendKind, DiffusionBackend, EngineConfig, TemperatureField};
use std::num::NonZeroUsize;
use tracing::{debug, info};

/// Statistics of the grid after a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Rounds completed
    pub iterations: usize,
    /// Simulated seconds (`iterations · Δt`)
    pub simulated_seconds: f64,
    /// Coldest cell
    pub min_temperature: f64,
    /// Hottest cell
    pub max_temperature: f64,
    /// Mean over all cells
    pub mean_temperature: f64,
}

/// A configured plate, ready to run
pub struct HeatSimulation {
    params: SimulationParameters,
    backend: Box<dyn DiffusionBackend>,
    field: TemperatureField,
    coeff: f64,
    completed: usize,
    snapshot_every: Option<NonZeroUsize>,
    initial_snapshot: bool,
}

impl HeatSimulation {
    /// Create a new heat simulation
    ///
    /// # Arguments
    ///
    /// * `params` - Grid size, time step and material
    /// * `engine` - Worker count, swap protocol and boundary mode
    /// * `kind` - Which backend advances the grid
    ///
    /// # Errors
    ///
    /// `UnstableTimeStep` or `InvalidParameter` from validation, `Allocation`
    /// if the grid cannot be reserved.
    pub fn new(params: SimulationParameters, engine: EngineConfig, kind: BackendKind) -> Result<Self> {
        let limit = params.validate()?;
        let coeff = params.coeff();

        info!(
            "Heat simulation: {}x{} plate, dt={}s (limit {:.5}s), coeff={:.6}, {} iterations",
            params.width, params.height, *params.delta_t, limit, coeff, params.num_iterations
        );

        let field = TemperatureField::new(params.width, params.height, 0.0)?;
        let backend = create_backend(kind, &engine);

        Ok(Self {
            params,
            backend,
            field,
            coeff,
            completed: 0,
            snapshot_every: None,
            initial_snapshot: false,
        })
    }

    /// Write an intermediate snapshot every `every` iterations
    pub fn with_snapshot_every(mut self, every: Option<NonZeroUsize>) -> Self {
        self.snapshot_every = every;
        self
    }

    /// Write the starting grid before any iteration runs
    pub fn with_initial_snapshot(mut self, initial: bool) -> Self {
        self.initial_snapshot = initial;
        self
    }

    /// Fill the grid with starting temperatures
    pub fn populate(&mut self, initializer: &dyn GridInitializer) {
        initializer.populate(&mut self.field);
        self.completed = 0;
        let (min, max) = self.field.min_max();
        debug!("Grid populated, range [{:.2}, {:.2}]", min, max);
    }

    /// Replace the grid with a caller-built one
    ///
    /// # Errors
    ///
    /// `GridShapeMismatch` if the dimensions differ from the parameters.
    pub fn set_field(&mut self, field: TemperatureField) -> Result<()> {
        let expected = (self.params.width, self.params.height);
        if field.dimensions() != expected {
            return Err(HeatEqError::GridShapeMismatch {
                expected,
                actual: field.dimensions(),
            });
        }
        self.field = field;
        self.completed = 0;
        Ok(())
    }

    /// Run every configured iteration and hand snapshots to `writer`
    ///
    /// The final grid is always written exactly once. The starting grid is
    /// written first when `initial_snapshot` or `snapshot_every` is set, and
    /// with `snapshot_every` every intermediate segment is written too.
    pub fn run(&mut self, writer: &mut dyn ResultWriter) -> Result<RunSummary> {
        let total = self.params.num_iterations;
        info!(
            "Running {} iterations on the {} backend",
            total,
            self.backend.name()
        );

        let write_initial = self.initial_snapshot || self.snapshot_every.is_some();
        if write_initial {
            writer.write_snapshot(self.completed, self.elapsed_seconds(), &self.field)?;
        }

        let segment_len = self.snapshot_every.map_or(total, NonZeroUsize::get);
        let mut remaining = total;
        while remaining > 0 {
            let segment = remaining.min(segment_len);
            self.advance(segment)?;
            remaining -= segment;
            writer.write_snapshot(self.completed, self.elapsed_seconds(), &self.field)?;
        }

        // With no iterations the starting grid is the final grid
        if total == 0 && !write_initial {
            writer.write_snapshot(self.completed, self.elapsed_seconds(), &self.field)?;
        }

        let summary = self.summary();
        info!(
            "Finished after {} iterations ({:.6}s simulated): min={:.2}, max={:.2}, mean={:.2}",
            summary.iterations,
            summary.simulated_seconds,
            summary.min_temperature,
            summary.max_temperature,
            summary.mean_temperature
        );
        Ok(summary)
    }

    /// Advance the grid by `iterations` rounds without writing anything
    pub fn advance(&mut self, iterations: usize) -> Result<()> {
        self.backend.advance(&mut self.field, self.coeff, iterations)?;
        self.completed += iterations;
        debug!("Completed {} iterations", self.completed);
        Ok(())
    }

    /// Latest grid
    pub fn field(&self) -> &TemperatureField {
        &self.field
    }

    /// Run parameters
    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Per-step coefficient `α·Δt / Δs²`
    pub fn coeff(&self) -> f64 {
        self.coeff
    }

    /// Backend driving the grid
    pub fn backend(&self) -> &dyn DiffusionBackend {
        self.backend.as_ref()
    }

    /// Rounds completed since the grid was last populated
    pub fn completed_iterations(&self) -> usize {
        self.completed
    }

    fn elapsed_seconds(&self) -> f64 {
        self.completed as f64 * *self.params.delta_t
    }

    /// Statistics of the current grid
    pub fn summary(&self) -> RunSummary {
        let (min_temperature, max_temperature) = self.field.min_max();
        RunSummary {
            iterations: self.completed,
            simulated_seconds: self.elapsed_seconds(),
            min_temperature,
            max_temperature,
            mean_temperature: self.field.mean(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Seconds;
    use crate::io::{SplitPlate, UniformTemperature};
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder {
        snapshots: Vec<(usize, f64, TemperatureField)>,
    }

    impl ResultWriter for Recorder {
        fn write_snapshot(&mut self, iteration: usize, elapsed: f64, field: &TemperatureField) -> Result<()> {
            self.snapshots.push((iteration, elapsed, field.clone()));
            Ok(())
        }
    }

    fn small_params(iterations: usize) -> SimulationParameters {
        SimulationParameters {
            width: 6,
            height: 4,
            num_iterations: iterations,
            ..SimulationParameters::default()
        }
    }

    #[test]
    fn test_unstable_parameters_rejected_before_allocation() {
        let params = SimulationParameters {
            delta_t: Seconds::new(1.0),
            ..SimulationParameters::default()
        };
        let result = HeatSimulation::new(params, EngineConfig::default(), BackendKind::Barrier);
        assert!(matches!(result, Err(HeatEqError::UnstableTimeStep { .. })));
    }

    #[test]
    fn test_single_final_snapshot() {
        let mut sim =
            HeatSimulation::new(small_params(7), EngineConfig::default(), BackendKind::Barrier).unwrap();
        sim.populate(&SplitPlate::default());
        let mut recorder = Recorder::default();
        let summary = sim.run(&mut recorder).unwrap();

        assert_eq!(recorder.snapshots.len(), 1);
        assert_eq!(recorder.snapshots[0].0, 7);
        assert_eq!(summary.iterations, 7);
        assert_relative_eq!(summary.simulated_seconds, 7.0 * 0.0001);
        assert!(summary.min_temperature >= 200.2 && summary.max_temperature <= 550.5);
    }

    #[test]
    fn test_segmented_snapshots() {
        let mut sim = HeatSimulation::new(small_params(10), EngineConfig::default(), BackendKind::Sequential)
            .unwrap()
            .with_snapshot_every(NonZeroUsize::new(4));
        sim.populate(&SplitPlate::default());
        let mut recorder = Recorder::default();
        sim.run(&mut recorder).unwrap();

        let iterations: Vec<usize> = recorder.snapshots.iter().map(|s| s.0).collect();
        assert_eq!(iterations, vec![0, 4, 8, 10]);

        let mut straight =
            HeatSimulation::new(small_params(10), EngineConfig::default(), BackendKind::Sequential).unwrap();
        straight.populate(&SplitPlate::default());
        straight.run(&mut Recorder::default()).unwrap();
        assert_eq!(straight.field(), &recorder.snapshots[3].2);
    }

    #[test]
    fn test_zero_iterations_writes_initial_grid() {
        let mut sim =
            HeatSimulation::new(small_params(0), EngineConfig::default(), BackendKind::Barrier).unwrap();
        sim.populate(&UniformTemperature(42.0));
        let mut recorder = Recorder::default();
        let summary = sim.run(&mut recorder).unwrap();
        assert_eq!(recorder.snapshots.len(), 1);
        assert_eq!(summary.mean_temperature, 42.0);
        assert_eq!(summary.simulated_seconds, 0.0);
    }

    #[test]
    fn test_initial_snapshot_precedes_final() {
        let mut sim = HeatSimulation::new(small_params(5), EngineConfig::default(), BackendKind::Barrier)
            .unwrap()
            .with_initial_snapshot(true);
        sim.populate(&SplitPlate::default());
        let initial = sim.field().clone();
        let mut recorder = Recorder::default();
        sim.run(&mut recorder).unwrap();

        let iterations: Vec<usize> = recorder.snapshots.iter().map(|s| s.0).collect();
        assert_eq!(iterations, vec![0, 5]);
        assert_eq!(recorder.snapshots[0].1, 0.0);
        assert_eq!(recorder.snapshots[0].2, initial);
        assert_eq!(&recorder.snapshots[1].2, sim.field());
    }

    #[test]
    fn test_initial_snapshot_not_repeated_without_iterations() {
        let mut sim = HeatSimulation::new(small_params(0), EngineConfig::default(), BackendKind::Barrier)
            .unwrap()
            .with_initial_snapshot(true);
        sim.populate(&UniformTemperature(10.0));
        let mut recorder = Recorder::default();
        sim.run(&mut recorder).unwrap();
        assert_eq!(recorder.snapshots.len(), 1);
    }

    #[test]
    fn test_set_field_checks_shape() {
        let mut sim =
            HeatSimulation::new(small_params(1), EngineConfig::default(), BackendKind::Rayon).unwrap();
        let wrong = TemperatureField::new(4, 6, 1.0).unwrap();
        match sim.set_field(wrong) {
            Err(HeatEqError::GridShapeMismatch { expected, actual }) => {
                assert_eq!(expected, (6, 4));
                assert_eq!(actual, (4, 6));
            }
            other => panic!("expected GridShapeMismatch, got {other:?}"),
        }
        sim.set_field(TemperatureField::new(6, 4, 1.0).unwrap()).unwrap();
    }
}
