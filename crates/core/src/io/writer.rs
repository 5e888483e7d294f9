//! Text output of temperature grids
//!
//! One line per row, values with two decimals separated by single spaces.
//! Rows are formatted on the rayon pool and written in order.

use crate::error::Result;
use crate::solver::TemperatureField;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Default output file of the CLI
pub const DEFAULT_OUTPUT_PATH: &str = "output.txt";

/// Receives grids as the simulation produces them
pub trait ResultWriter {
    /// Record the grid after `iteration` rounds (`elapsed_seconds` of
    /// simulated time)
    fn write_snapshot(
        &mut self,
        iteration: usize,
        elapsed_seconds: f64,
        field: &TemperatureField,
    ) -> Result<()>;
}

/// Writes each snapshot as a plain-text grid
#[derive(Debug)]
pub struct TextGridWriter<W: Write> {
    out: W,
    header: bool,
}

impl TextGridWriter<BufWriter<File>> {
    /// Create (or truncate) `path` and write to it through a buffer
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        debug!("Writing grid output to {}", path.as_ref().display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TextGridWriter<W> {
    /// Wrap any writer; the `~~ t = ...s ~~` header is on by default
    pub fn new(out: W) -> Self {
        Self { out, header: true }
    }

    /// Enable or disable the time header before each grid
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Flush buffered output
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

fn format_row(row: &[f64]) -> String {
    let mut line = String::with_capacity(row.len() * 8);
    for (i, value) in row.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&format!("{value:.2}"));
    }
    line
}

impl<W: Write> ResultWriter for TextGridWriter<W> {
    fn write_snapshot(
        &mut self,
        iteration: usize,
        elapsed_seconds: f64,
        field: &TemperatureField,
    ) -> Result<()> {
        let lines: Vec<String> = field
            .as_slice()
            .par_chunks(field.width())
            .map(format_row)
            .collect();

        if self.header {
            writeln!(self.out, "~~ t = {elapsed_seconds:.6}s ~~")?;
        }
        for line in &lines {
            writeln!(self.out, "{line}")?;
        }
        debug!(iteration, rows = lines.len(), "snapshot written");
        Ok(())
    }
}
