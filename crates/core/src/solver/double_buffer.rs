//! Shared double buffer for the barrier engine
//!
//! Two equal planes of cells with a 0/1 role index. The plane at
//! `read_index` is "previous" (read-only this round), the other is
//! "current" (write-only this round). Flipping the index swaps the roles; no
//! plane is ever moved or reallocated.
//!
//! Cells are `AtomicU64` holding `f64` bit patterns so that disjoint row bands
//! can be written from several threads through a shared reference. All cell
//! accesses are `Relaxed`: ordering between rounds comes from the engine's
//! barrier, not from the cells.
//!
//! # Buffer layout
//!
//! ```text
//! planes[read_index]      ←─── previous (read_view)
//! planes[read_index ^ 1]  ←─── current  (write_view)
//! ```

use super::fields::{try_alloc, TemperatureField};
use super::partition::WorkChunk;
use crate::error::{HeatEqError, Result};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// One row-major plane of atomically accessed cells
struct Plane {
    cells: Box<[AtomicU64]>,
}

impl Plane {
    fn from_values(values: &[f64]) -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(values.len())
            .map_err(|_| HeatEqError::Allocation { cells: values.len() })?;
        cells.extend(values.iter().map(|v| AtomicU64::new(v.to_bits())));
        Ok(Self {
            cells: cells.into_boxed_slice(),
        })
    }

    #[inline(always)]
    fn load(&self, index: usize) -> f64 {
        f64::from_bits(self.cells[index].load(Ordering::Relaxed))
    }

    #[inline(always)]
    fn store(&self, index: usize, value: f64) {
        self.cells[index].store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Two planes whose previous/current roles are selected by a 0/1 index
pub struct DoubleBuffer {
    planes: [Plane; 2],
    read_index: AtomicUsize,
    width: usize,
    height: usize,
}

impl DoubleBuffer {
    /// Load `field` into both planes, so either role starts from the
    /// initial condition.
    pub fn from_field(field: &TemperatureField) -> Result<Self> {
        Ok(Self {
            planes: [
                Plane::from_values(field.as_slice())?,
                Plane::from_values(field.as_slice())?,
            ],
            read_index: AtomicUsize::new(0),
            width: field.width(),
            height: field.height(),
        })
    }

    /// Grid width in cells
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Index (0 or 1) of the plane currently playing "previous"
    #[must_use]
    pub fn read_index(&self) -> usize {
        self.read_index.load(Ordering::Acquire)
    }

    /// Swap the previous/current roles.
    ///
    /// Only one thread may flip per round: the orchestrator outside a run, or
    /// the leader worker under [`super::engine::SwapProtocol::LeaderBarrier`].
    pub fn flip(&self) {
        self.read_index.fetch_xor(1, Ordering::AcqRel);
    }

    /// View of the "previous" plane under the shared role index
    #[must_use]
    pub fn read_view(&self) -> ReadView<'_> {
        self.read_view_at(self.read_index())
    }

    /// View of the "current" plane under the shared role index
    #[must_use]
    pub fn write_view(&self) -> WriteView<'_> {
        self.write_view_at(self.read_index())
    }

    /// View of the plane that is "previous" when `read_index` selects roles.
    ///
    /// Workers that track the role index locally use this instead of
    /// [`Self::read_view`].
    #[must_use]
    pub fn read_view_at(&self, read_index: usize) -> ReadView<'_> {
        ReadView {
            plane: &self.planes[read_index & 1],
            width: self.width,
        }
    }

    /// View of the plane that is "current" when `read_index` selects roles.
    #[must_use]
    pub fn write_view_at(&self, read_index: usize) -> WriteView<'_> {
        WriteView {
            plane: &self.planes[(read_index & 1) ^ 1],
            width: self.width,
        }
    }

    /// Copy of the "current" plane: the latest completed round once a run
    /// has finished.
    pub fn current_snapshot(&self) -> Result<TemperatureField> {
        self.snapshot(self.write_view().plane)
    }

    /// Copy of the "previous" plane
    pub fn previous_snapshot(&self) -> Result<TemperatureField> {
        self.snapshot(self.read_view().plane)
    }

    fn snapshot(&self, plane: &Plane) -> Result<TemperatureField> {
        let mut data = try_alloc(plane.cells.len(), 0.0)?;
        for (dst, cell) in data.iter_mut().zip(plane.cells.iter()) {
            *dst = f64::from_bits(cell.load(Ordering::Relaxed));
        }
        TemperatureField::from_vec(self.width, self.height, data)
    }
}

/// Read-only access to the "previous" plane for one round
#[derive(Clone, Copy)]
pub struct ReadView<'a> {
    plane: &'a Plane,
    width: usize,
}

impl ReadView<'_> {
    /// Value at `(row, col)`
    #[inline(always)]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.plane.load(row * self.width + col)
    }
}

/// Write access to the "current" plane for one round
#[derive(Clone, Copy)]
pub struct WriteView<'a> {
    plane: &'a Plane,
    width: usize,
}

impl<'a> WriteView<'a> {
    /// Narrow this view to the rows a worker owns.
    #[must_use]
    pub fn band(self, chunk: &WorkChunk) -> BandWriter<'a> {
        BandWriter {
            plane: self.plane,
            width: self.width,
            start_row: chunk.start_row,
            end_row: chunk.end_row,
        }
    }
}

/// Writer restricted to one worker's row band
pub struct BandWriter<'a> {
    plane: &'a Plane,
    width: usize,
    start_row: usize,
    end_row: usize,
}

impl BandWriter<'_> {
    /// Store `value` at `(row, col)`; `row` must lie in the band.
    #[inline(always)]
    pub fn set(&self, row: usize, col: usize, value: f64) {
        debug_assert!(
            (self.start_row..self.end_row).contains(&row),
            "row {row} outside band {}..{}",
            self.start_row,
            self.end_row
        );
        self.plane.store(row * self.width + col, value);
    }
}
