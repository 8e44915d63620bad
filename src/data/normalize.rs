//! Per-dimension min/max bounds and linear rescaling.

use crate::data::{LineSource, LineStatus, RowParser};
use crate::error::{Result, SomError};
use crate::som::anneal::{blend, progress_for};
use crate::som::Grid;
use log::{info, warn};

/// Per-dimension minimum and maximum of a data set.
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    min: Vec<f64>,
    max: Vec<f64>,
}

impl Bounds {
    /// Creates bounds from explicit vectors. Requires `min[i] <= max[i]`.
    pub fn new(min: Vec<f64>, max: Vec<f64>) -> Result<Self> {
        if min.len() != max.len() {
            return Err(SomError::DimensionMismatch {
                expected: min.len(),
                actual: max.len(),
            });
        }
        let invalid = |i: &usize| min[*i] > max[*i] || min[*i].is_nan() || max[*i].is_nan();
        if let Some(i) = (0..min.len()).find(invalid) {
            return Err(SomError::Config(format!(
                "bound {} has min {} above max {}",
                i, min[i], max[i]
            )));
        }
        Ok(Self { min, max })
    }

    /// Scans a whole source once and records the range of every dimension.
    ///
    /// Empty lines are ignored and malformed rows are skipped with a warning.
    /// The source is restarted before and after the scan.
    pub fn scan<S: LineSource>(source: &mut S, parser: &RowParser) -> Result<Self> {
        let dims = parser.dims();
        let mut min = vec![f64::INFINITY; dims];
        let mut max = vec![f64::NEG_INFINITY; dims];
        let mut rows = 0usize;
        let mut row = Vec::with_capacity(dims);

        source.restart()?;
        loop {
            let line = match source.next_line() {
                Ok(LineStatus::Line(line)) => line,
                Ok(LineStatus::Empty) => continue,
                Ok(LineStatus::End) => break,
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping row while scanning bounds: {}", e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if let Err(e) = parser.parse_into(&line, source.line_number(), &mut row) {
                warn!("Skipping row while scanning bounds: {}", e);
                continue;
            }
            for (i, &x) in row.iter().enumerate() {
                min[i] = min[i].min(x);
                max[i] = max[i].max(x);
            }
            rows += 1;
        }
        source.restart()?;

        if rows == 0 {
            return Err(SomError::EmptySource("no valid rows to scan bounds from".into()));
        }

        let bounds = Self { min, max };
        for i in bounds.degenerate_dims() {
            warn!("Dimension {} is constant ({}); it normalizes to 0", i, bounds.min[i]);
        }
        info!("Scanned bounds over {} rows", rows);
        Ok(bounds)
    }

    /// Number of dimensions.
    #[inline]
    pub fn dims(&self) -> usize {
        self.min.len()
    }

    /// Per-dimension minima.
    #[inline]
    pub fn min(&self) -> &[f64] {
        &self.min
    }

    /// Per-dimension maxima.
    #[inline]
    pub fn max(&self) -> &[f64] {
        &self.max
    }

    /// Indices of dimensions whose min equals their max.
    pub fn degenerate_dims(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.dims()).filter(move |&i| self.min[i] == self.max[i])
    }

    fn check_dims(&self, len: usize) -> Result<()> {
        if len != self.dims() {
            return Err(SomError::DimensionMismatch {
                expected: self.dims(),
                actual: len,
            });
        }
        Ok(())
    }

    /// Rescales a vector into [0, 1] per dimension, in place.
    ///
    /// A constant dimension maps to 0.
    pub fn normalize(&self, v: &mut [f64]) -> Result<()> {
        self.check_dims(v.len())?;
        for (i, x) in v.iter_mut().enumerate() {
            *x = progress_for(self.min[i], self.max[i], *x);
        }
        Ok(())
    }

    /// Maps a vector from [0, 1] back into original units, in place.
    pub fn denormalize(&self, v: &mut [f64]) -> Result<()> {
        self.check_dims(v.len())?;
        for (i, x) in v.iter_mut().enumerate() {
            *x = blend(self.min[i], self.max[i], *x);
        }
        Ok(())
    }
}

/// Rescales every neuron of a grid into normalized space.
pub fn normalize_grid(grid: &mut Grid, bounds: &Bounds) -> Result<()> {
    bounds.check_dims(grid.dims())?;
    for neuron in grid.neurons_mut() {
        bounds.normalize(neuron)?;
    }
    Ok(())
}

/// Maps every neuron of a grid from normalized space back into original units.
pub fn denormalize_grid(grid: &mut Grid, bounds: &Bounds) -> Result<()> {
    bounds.check_dims(grid.dims())?;
    for neuron in grid.neurons_mut() {
        bounds.denormalize(neuron)?;
    }
    Ok(())
}
