//! Row-band partitioning
//!
//! Splits `[0, height)` into one contiguous band per worker. Every band but
//! the last gets exactly `height / workers` rows; the last band absorbs the
//! remainder.

use crate::error::{HeatEqError, Result};
use std::ops::Range;

/// Half-open row range owned by one worker for writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkChunk {
    /// First row (inclusive)
    pub start_row: usize,
    /// One past the last row
    pub end_row: usize,
    /// Owning worker; worker 0 is the leader
    pub worker_id: usize,
}

impl WorkChunk {
    /// Rows covered by this chunk
    #[must_use]
    pub fn rows(&self) -> Range<usize> {
        self.start_row..self.end_row
    }

    /// Number of rows in the chunk
    #[must_use]
    pub fn len(&self) -> usize {
        self.end_row - self.start_row
    }

    /// True when the chunk owns no rows (more workers than rows)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_row == self.end_row
    }
}

/// Partition `height` rows across `worker_count` workers.
///
/// # Errors
///
/// `InvalidParameter` when `worker_count` is zero.
pub fn partition_rows(height: usize, worker_count: usize) -> Result<Vec<WorkChunk>> {
    if worker_count == 0 {
        return Err(HeatEqError::invalid("workers", "at least one worker is required"));
    }

    let quota = height / worker_count;
    let chunks = (0..worker_count)
        .map(|worker_id| {
            let start_row = worker_id * quota;
            let end_row = if worker_id + 1 == worker_count {
                height
            } else {
                start_row + quota
            };
            WorkChunk {
                start_row,
                end_row,
                worker_id,
            }
        })
        .collect();
    Ok(chunks)
}
