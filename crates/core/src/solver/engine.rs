//! Barrier-synchronized parallel stencil engine
//!
//! A fixed pool of scoped OS threads, one per row band, is spawned once per
//! run and joined once at the end. Each round every worker:
//!
//! 1. computes its band of "current" from "previous",
//! 2. waits on the shared barrier,
//! 3. swaps the buffer roles according to the [`SwapProtocol`].
//!
//! The barrier is the only blocking point inside the round loop and the only
//! source of ordering between rounds: every write of round *k* happens-before
//! every read of round *k + 1*.
//!
//! # Buffer roles across a run
//!
//! The caller's data is expected in "current". The run first promotes it to
//! "previous", performs the rounds (each ending in a role flip, so the newest
//! plane is always "previous" between rounds), and finishes with one more
//! unconditional flip that moves the newest plane back to "current".

use super::double_buffer::DoubleBuffer;
use super::fields::TemperatureField;
use super::heat_transfer::{update_cell, BoundaryMode};
use super::partition::{partition_rows, WorkChunk};
use super::profiler::ProfilerScope;
use super::r#trait::DiffusionBackend;
use crate::error::{HeatEqError, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Barrier;
use std::thread;
use tracing::{debug, error, info, trace};

/// Worker that owns the shared role flip under [`SwapProtocol::LeaderBarrier`]
pub const LEADER_WORKER: usize = 0;

/// Default degree of parallelism
pub const DEFAULT_WORKERS: usize = 4;

/// How the previous/current roles are swapped after each round's barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SwapProtocol {
    /// Every worker flips its own copy of the role index after the barrier.
    /// One barrier per round and no shared mutation inside the loop.
    #[default]
    LocalFlip,
    /// The leader flips the shared role index after the barrier; a second
    /// barrier holds everyone else until the flip is visible.
    LeaderBarrier,
}

impl SwapProtocol {
    /// Barrier waits per round
    #[must_use]
    pub fn barriers_per_round(self) -> usize {
        match self {
            SwapProtocol::LocalFlip => 1,
            SwapProtocol::LeaderBarrier => 2,
        }
    }
}

/// Construction-time engine settings; none of them change the numerical
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of worker threads (and row bands)
    pub workers: NonZeroUsize,
    /// Role swap protocol
    pub swap_protocol: SwapProtocol,
    /// Edge treatment for the stencil
    pub boundary: BoundaryMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
            swap_protocol: SwapProtocol::default(),
            boundary: BoundaryMode::default(),
        }
    }
}

impl EngineConfig {
    /// Config with `workers` threads and default protocol/boundary.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when `workers` is zero.
    pub fn with_workers(workers: usize) -> Result<Self> {
        let workers = NonZeroUsize::new(workers)
            .ok_or_else(|| HeatEqError::invalid("workers", "at least one worker is required"))?;
        Ok(Self {
            workers,
            ..Self::default()
        })
    }
}

/// State shared by every worker for one run.
///
/// Owned by [`ParallelStencilEngine::run`] and borrowed by each worker; there
/// is no process-wide simulation state.
pub(crate) struct SimulationContext<'a> {
    /// Grid planes and role index
    pub buffer: &'a DoubleBuffer,
    /// Round barrier sized to the worker count
    pub barrier: &'a Barrier,
    /// `α·Δt / Δs²`
    pub coeff: f64,
    /// Rounds to run
    pub iterations: usize,
    /// Edge treatment
    pub boundary: BoundaryMode,
    /// Role swap protocol
    pub protocol: SwapProtocol,
    /// Set when any worker fails; the others stop computing but keep meeting
    /// the barrier so nobody blocks forever.
    poisoned: AtomicBool,
}

/// Compute every cell of `chunk` for the round whose "previous" plane is
/// `read_index`.
fn compute_band(ctx: &SimulationContext<'_>, chunk: &WorkChunk, read_index: usize) {
    let width = ctx.buffer.width();
    let height = ctx.buffer.height();
    let prev = ctx.buffer.read_view_at(read_index);
    let out = ctx.buffer.write_view_at(read_index).band(chunk);

    for row in chunk.rows() {
        for col in 0..width {
            let value = update_cell(
                |r, c| prev.get(r, c),
                row,
                col,
                width,
                height,
                ctx.coeff,
                ctx.boundary,
            );
            out.set(row, col, value);
        }
    }
}

/// Round loop run by one worker thread. `kernel(ctx, chunk, read_index, round)`
/// fills the band for one round. Returns `false` if the worker's own
/// computation panicked.
fn worker_loop<K>(ctx: &SimulationContext<'_>, chunk: WorkChunk, start_index: usize, kernel: &K) -> bool
where
    K: Fn(&SimulationContext<'_>, &WorkChunk, usize, usize) + Sync,
{
    let mut read_index = start_index;
    let mut healthy = true;

    for round in 0..ctx.iterations {
        if !ctx.poisoned.load(Ordering::Relaxed) {
            let computed = catch_unwind(AssertUnwindSafe(|| kernel(ctx, &chunk, read_index, round)));
            if computed.is_err() {
                error!("worker {} panicked in round {}", chunk.worker_id, round);
                ctx.poisoned.store(true, Ordering::Relaxed);
                healthy = false;
            }
        }

        ctx.barrier.wait();

        match ctx.protocol {
            SwapProtocol::LocalFlip => read_index ^= 1,
            SwapProtocol::LeaderBarrier => {
                if chunk.worker_id == LEADER_WORKER {
                    ctx.buffer.flip();
                }
                ctx.barrier.wait();
                read_index = ctx.buffer.read_index();
            }
        }

        if chunk.worker_id == LEADER_WORKER {
            trace!("round {} complete", round + 1);
        }
    }

    healthy
}

/// Fixed-pool, barrier-synchronized FTCS engine
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelStencilEngine {
    config: EngineConfig,
}

impl ParallelStencilEngine {
    /// Create an engine with the given settings
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine settings
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `iterations` rounds on `buffer` in place.
    ///
    /// On success the newest plane is in the "current" role. With zero
    /// iterations nothing is spawned and the buffer is untouched.
    ///
    /// # Errors
    ///
    /// `WorkerPanicked` if any worker failed; the buffer contents are then
    /// unspecified.
    pub fn run(&self, buffer: &DoubleBuffer, coeff: f64, iterations: usize) -> Result<()> {
        self.run_with_kernel(
            buffer,
            coeff,
            iterations,
            &|ctx: &SimulationContext<'_>, chunk: &WorkChunk, read_index: usize, _round: usize| {
                compute_band(ctx, chunk, read_index);
            },
        )
    }

    fn run_with_kernel<K>(&self, buffer: &DoubleBuffer, coeff: f64, iterations: usize, kernel: &K) -> Result<()>
    where
        K: Fn(&SimulationContext<'_>, &WorkChunk, usize, usize) + Sync,
    {
        if iterations == 0 {
            debug!("zero iterations requested, grid left as is");
            return Ok(());
        }

        let workers = self.config.workers.get();
        let chunks = partition_rows(buffer.height(), workers)?;
        let barrier = Barrier::new(workers);

        // Promote the caller's "current" plane to "previous" for round one
        buffer.flip();
        let start_index = buffer.read_index();

        let ctx = SimulationContext {
            buffer,
            barrier: &barrier,
            coeff,
            iterations,
            boundary: self.config.boundary,
            protocol: self.config.swap_protocol,
            poisoned: AtomicBool::new(false),
        };

        let _scope = ProfilerScope::new("parallel_stencil_run");
        let failed_worker = thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .iter()
                .map(|&chunk| {
                    let ctx = &ctx;
                    scope.spawn(move || worker_loop(ctx, chunk, start_index, kernel))
                })
                .collect();

            // Join every worker before reporting, lowest failing id wins
            handles
                .into_iter()
                .enumerate()
                .filter_map(|(worker_id, handle)| match handle.join() {
                    Ok(true) => None,
                    Ok(false) | Err(_) => Some(worker_id),
                })
                .min()
        });

        if let Some(worker_id) = failed_worker {
            return Err(HeatEqError::WorkerPanicked { worker_id });
        }

        // Local flips never touched the shared index; bring it level with
        // the rounds that ran.
        if self.config.swap_protocol == SwapProtocol::LocalFlip && iterations % 2 == 1 {
            buffer.flip();
        }

        // Newest plane back to "current"
        buffer.flip();
        Ok(())
    }
}

impl DiffusionBackend for ParallelStencilEngine {
    fn advance(&self, field: &mut TemperatureField, coeff: f64, iterations: usize) -> Result<()> {
        if iterations == 0 {
            return Ok(());
        }
        let buffer = DoubleBuffer::from_field(field)?;
        self.run(&buffer, coeff, iterations)?;
        *field = buffer.current_snapshot()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "barrier"
    }

    fn workers(&self) -> usize {
        self.config.workers.get()
    }

    fn describe(&self) {
        info!(
            "Barrier engine: {} workers, {:?} swap ({} barrier(s)/round), {:?} boundary",
            self.config.workers,
            self.config.swap_protocol,
            self.config.swap_protocol.barriers_per_round(),
            self.config.boundary
        );
    }
}
