//! Behavioural checks of the barrier-synchronized stencil engine
//!
//! Every backend and worker count must agree bit for bit with the
//! single-threaded reference, and the scheme must respect the physical
//! properties of diffusion.
//!
//! Run tests with: cargo test --test `engine_properties`

use approx::assert_relative_eq;
use ctor::ctor;
use heateq_core::solver::{
    create_backend, BackendKind, BoundaryMode, DiffusionBackend, DoubleBuffer, EngineConfig,
    ParallelStencilEngine, SequentialStencilSolver, SwapProtocol, TemperatureField,
};
use proptest::prelude::*;
use std::num::NonZeroUsize;
use tracing_subscriber::EnvFilter;

#[ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn engine(workers: usize, swap_protocol: SwapProtocol, boundary: BoundaryMode) -> ParallelStencilEngine {
    ParallelStencilEngine::new(EngineConfig {
        workers: NonZeroUsize::new(workers).unwrap(),
        swap_protocol,
        boundary,
    })
}

/// Deterministic but irregular starting grid
fn patterned(width: usize, height: usize) -> TemperatureField {
    let data = (0..width * height)
        .map(|i| 20.0 + ((i * 37 + 11) % 101) as f64 * 4.5)
        .collect();
    TemperatureField::from_vec(width, height, data).unwrap()
}

fn reference(field: &TemperatureField, coeff: f64, iterations: usize, boundary: BoundaryMode) -> TemperatureField {
    let mut out = field.clone();
    SequentialStencilSolver::new(boundary)
        .advance(&mut out, coeff, iterations)
        .unwrap();
    out
}

// ═══════════════════════════════════════════════════════════════════════════════
// Identity and determinism
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn zero_iterations_leave_grid_unchanged() {
    let initial = patterned(7, 5);
    for kind in [BackendKind::Barrier, BackendKind::Rayon, BackendKind::Sequential] {
        let mut field = initial.clone();
        create_backend(kind, &EngineConfig::default())
            .advance(&mut field, 0.2, 0)
            .unwrap();
        assert_eq!(field, initial, "{kind} changed the grid with zero iterations");
    }
}

#[test]
fn single_worker_matches_reference() {
    let initial = patterned(10, 10);
    let expected = reference(&initial, 0.011475503663003664, 500, BoundaryMode::Omitted);

    let mut field = initial.clone();
    engine(1, SwapProtocol::LocalFlip, BoundaryMode::Omitted)
        .advance(&mut field, 0.011475503663003664, 500)
        .unwrap();
    assert_eq!(field, expected);
}

#[test]
fn every_worker_count_and_protocol_agree() {
    for boundary in [BoundaryMode::Omitted, BoundaryMode::Insulated] {
        let initial = patterned(9, 13);
        let expected = reference(&initial, 0.2, 23, boundary);

        for workers in [1, 2, 3, 4, 5, 8, 13, 20] {
            for protocol in [SwapProtocol::LocalFlip, SwapProtocol::LeaderBarrier] {
                let mut field = initial.clone();
                engine(workers, protocol, boundary)
                    .advance(&mut field, 0.2, 23)
                    .unwrap();
                assert_eq!(
                    field, expected,
                    "{workers} workers with {protocol:?} diverged under {boundary:?}"
                );
            }
        }
    }
}

#[test]
fn rayon_backend_matches_reference() {
    let initial = patterned(16, 11);
    let mut field = initial.clone();
    create_backend(BackendKind::Rayon, &EngineConfig::default())
        .advance(&mut field, 0.24, 40)
        .unwrap();
    assert_eq!(field, reference(&initial, 0.24, 40, BoundaryMode::Omitted));
}

#[test]
fn buffer_roles_track_round_parity() {
    let initial = patterned(6, 6);
    for iterations in 1..=6 {
        for protocol in [SwapProtocol::LocalFlip, SwapProtocol::LeaderBarrier] {
            let buffer = DoubleBuffer::from_field(&initial).unwrap();
            let start = buffer.read_index();
            engine(3, protocol, BoundaryMode::Omitted)
                .run(&buffer, 0.1, iterations)
                .unwrap();

            assert_eq!(buffer.read_index(), start ^ (iterations % 2));
            assert_eq!(
                buffer.current_snapshot().unwrap(),
                reference(&initial, 0.1, iterations, BoundaryMode::Omitted)
            );
            assert_eq!(
                buffer.previous_snapshot().unwrap(),
                reference(&initial, 0.1, iterations - 1, BoundaryMode::Omitted)
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Physical properties
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn corner_scenario_per_boundary_mode() {
    let mut initial = TemperatureField::new(4, 4, 100.0).unwrap();
    initial.set(0, 0, 200.0);

    let mut omitted = initial.clone();
    engine(4, SwapProtocol::LocalFlip, BoundaryMode::Omitted)
        .advance(&mut omitted, 0.1, 1)
        .unwrap();
    assert_eq!(omitted.get(0, 0), 200.0);
    assert_eq!(omitted.get(2, 2), 100.0);
    assert_eq!(omitted.get(1, 1), 100.0);

    let mut insulated = initial.clone();
    engine(4, SwapProtocol::LocalFlip, BoundaryMode::Insulated)
        .advance(&mut insulated, 0.1, 1)
        .unwrap();
    assert_relative_eq!(insulated.get(0, 0), 180.0, epsilon = 1e-12);
    assert_relative_eq!(insulated.get(0, 1), 110.0, epsilon = 1e-12);
    assert_relative_eq!(insulated.get(1, 0), 110.0, epsilon = 1e-12);
    assert_eq!(insulated.get(2, 2), 100.0);
}

#[test]
fn uniform_grid_is_steady_state() {
    let initial = TemperatureField::new(12, 9, 293.15).unwrap();
    for protocol in [SwapProtocol::LocalFlip, SwapProtocol::LeaderBarrier] {
        let mut field = initial.clone();
        engine(4, protocol, BoundaryMode::Insulated)
            .advance(&mut field, 0.25, 1000)
            .unwrap();
        assert_eq!(field, initial);
    }
}

#[test]
fn insulated_plate_conserves_heat() {
    let initial = patterned(11, 7);
    let mut field = initial.clone();
    engine(3, SwapProtocol::LeaderBarrier, BoundaryMode::Insulated)
        .advance(&mut field, 0.2, 300)
        .unwrap();
    assert_relative_eq!(field.total(), initial.total(), max_relative = 1e-9);

    // Spread narrows towards the mean
    let (lo0, hi0) = initial.min_max();
    let (lo, hi) = field.min_max();
    assert!(hi - lo < hi0 - lo0);
}

#[test]
fn split_plate_converges_towards_mean_when_insulated() {
    let mut field = TemperatureField::new(8, 8, 200.0).unwrap();
    for row in 0..8 {
        for col in 0..4 {
            field.set(row, col, 600.0);
        }
    }
    engine(4, SwapProtocol::LocalFlip, BoundaryMode::Insulated)
        .advance(&mut field, 0.24, 5000)
        .unwrap();
    let (lo, hi) = field.min_max();
    assert_relative_eq!(lo, 400.0, epsilon = 1e-3);
    assert_relative_eq!(hi, 400.0, epsilon = 1e-3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn max_principle_holds(
        width in 1usize..12,
        height in 1usize..12,
        workers in 1usize..7,
        coeff in 0.0f64..=0.25,
        iterations in 0usize..30,
        insulated in any::<bool>(),
        seed in 0usize..1000,
    ) {
        let data: Vec<f64> = (0..width * height)
            .map(|i| ((i * 7919 + seed * 31) % 997) as f64)
            .collect();
        let initial = TemperatureField::from_vec(width, height, data).unwrap();
        let (lo, hi) = initial.min_max();
        let boundary = if insulated { BoundaryMode::Insulated } else { BoundaryMode::Omitted };

        let mut field = initial.clone();
        engine(workers, SwapProtocol::LocalFlip, boundary)
            .advance(&mut field, coeff, iterations)
            .unwrap();

        for &t in field.as_slice() {
            prop_assert!(t >= lo - 1e-9 && t <= hi + 1e-9, "{} escaped [{}, {}]", t, lo, hi);
        }
        prop_assert_eq!(field, reference(&initial, coeff, iterations, boundary));
    }
}
