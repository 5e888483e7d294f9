//! Temperature field storage
//!
//! [`TemperatureField`] is a single row-major `f64` plane. It is what
//! initializers fill, what backends consume and return, and what writers
//! persist. The engine's shared double buffer lives in
//! [`super::double_buffer`].

use crate::error::{HeatEqError, Result};

/// Allocate `cells` copies of `value`, surfacing allocation failure as an error.
pub(crate) fn try_alloc(cells: usize, value: f64) -> Result<Vec<f64>> {
    let mut data = Vec::new();
    data.try_reserve_exact(cells)
        .map_err(|_| HeatEqError::Allocation { cells })?;
    data.resize(cells, value);
    Ok(data)
}

/// A `height × width` plane of temperatures in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureField {
    data: Vec<f64>,
    width: usize,
    height: usize,
}

impl TemperatureField {
    /// Create a field with every cell set to `value`
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for a zero dimension, `Allocation` if the storage
    /// cannot be reserved.
    pub fn new(width: usize, height: usize, value: f64) -> Result<Self> {
        let cells = Self::checked_cells(width, height)?;
        Ok(Self {
            data: try_alloc(cells, value)?,
            width,
            height,
        })
    }

    /// Wrap existing row-major data
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        let cells = Self::checked_cells(width, height)?;
        if data.len() != cells {
            return Err(HeatEqError::invalid(
                "data",
                format!("{} values cannot fill a {width}x{height} grid", data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    fn checked_cells(width: usize, height: usize) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(HeatEqError::invalid(
                "dimensions",
                format!("grid must be at least 1x1 (got {width}x{height})"),
            ));
        }
        width
            .checked_mul(height)
            .ok_or(HeatEqError::Allocation { cells: usize::MAX })
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

    /// `(width, height)`
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Row-major cell values
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major cell values
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.width)
    }

    /// Value at `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(
            row < self.height && col < self.width,
            "Coordinates out of bounds"
        );
        self.data[row * self.width + col]
    }

    /// Set the value at `(row, col)`
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(
            row < self.height && col < self.width,
            "Coordinates out of bounds"
        );
        self.data[row * self.width + col] = value;
    }

    /// Fill entire field with a value
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Smallest and largest cell value
    #[must_use]
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Sum of all cell values
    #[must_use]
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Mean cell value
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.total() / self.data.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_creation() {
        let field = TemperatureField::new(10, 20, 0.0).unwrap();
        assert_eq!(field.width(), 10);
        assert_eq!(field.height(), 20);
        assert_eq!(field.as_slice().len(), 200);
        assert!(field.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_field_get_set() {
        let mut field = TemperatureField::new(10, 10, 0.0).unwrap();
        field.set(4, 3, 123.45);
        assert_eq!(field.get(4, 3), 123.45);

        // Verify row-major indexing
        assert_eq!(field.as_slice()[4 * 10 + 3], 123.45);
    }

    #[test]
    fn test_rows_are_width_long() {
        let field = TemperatureField::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let rows: Vec<&[f64]> = field.rows().collect();
        assert_eq!(rows, vec![&[1.0, 2.0, 3.0][..], &[4.0, 5.0, 6.0][..]]);
    }

    #[test]
    fn test_statistics() {
        let field = TemperatureField::from_vec(2, 2, vec![1.0, 5.0, -2.0, 4.0]).unwrap();
        assert_eq!(field.min_max(), (-2.0, 5.0));
        assert_eq!(field.total(), 8.0);
        assert_eq!(field.mean(), 2.0);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            TemperatureField::new(0, 4, 1.0),
            Err(HeatEqError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_from_vec_length_checked() {
        assert!(matches!(
            TemperatureField::from_vec(3, 3, vec![0.0; 8]),
            Err(HeatEqError::InvalidParameter { name: "data", .. })
        ));
    }

    #[test]
    fn test_huge_allocation_reports_error() {
        assert!(matches!(
            TemperatureField::new(usize::MAX / 16, 2, 0.0),
            Err(HeatEqError::Allocation { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "Coordinates out of bounds")]
    fn test_field_bounds_check() {
        let field = TemperatureField::new(10, 10, 0.0).unwrap();
        let _ = field.get(5, 10);
    }
}
