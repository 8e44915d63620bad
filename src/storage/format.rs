//! Flat text format for trained grids.
//!
//! ## Format Layout
//!
//! ```text
//! rows,cols,dims
//! w(0,0),w(0,1),...,w(0,dims-1)
//! w(1,0),w(1,1),...,w(1,dims-1)
//! ...
//! ```
//!
//! The header line carries the grid shape. It is followed by exactly
//! `rows * cols` lines, one per neuron in row-major order, each holding `dims`
//! comma-separated weights.

use crate::error::{Result, SomError};
use crate::som::Grid;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Default number of decimals written per weight.
pub const DEFAULT_PRECISION: usize = 6;

/// Grid file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridHeader {
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
    /// Weight vector dimensionality.
    pub dims: usize,
}

impl GridHeader {
    /// Header describing an existing grid.
    pub fn of(grid: &Grid) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            dims: grid.dims(),
        }
    }

    /// Number of neuron lines following the header.
    pub fn neuron_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Parses the header line.
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.trim().split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(SomError::InvalidFormat(format!(
                "header must be rows,cols,dims, got {:?}",
                line.trim()
            )));
        }

        let field = |i: usize, name: &str| -> Result<usize> {
            let value: usize = fields[i].parse().map_err(|_| {
                SomError::InvalidFormat(format!("header {} is not a count: {:?}", name, fields[i]))
            })?;
            if value == 0 {
                return Err(SomError::InvalidFormat(format!("header {} is zero", name)));
            }
            Ok(value)
        };

        Ok(Self {
            rows: field(0, "rows")?,
            cols: field(1, "cols")?,
            dims: field(2, "dims")?,
        })
    }
}

/// Reader and writer for the text grid format.
#[derive(Debug, Clone, Copy)]
pub struct GridFormat {
    precision: usize,
}

impl Default for GridFormat {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl GridFormat {
    /// Creates a format writing `precision` decimals per weight.
    pub fn with_precision(precision: usize) -> Self {
        Self { precision }
    }

    /// Writes a grid to a file, creating parent directories as needed.
    pub fn write<P: AsRef<Path>>(&self, grid: &Grid, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(grid, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Writes a grid to any writer.
    pub fn write_to<W: Write>(&self, grid: &Grid, writer: &mut W) -> Result<()> {
        writeln!(writer, "{},{},{}", grid.rows(), grid.cols(), grid.dims())?;

        for neuron in grid.neurons() {
            for (i, w) in neuron.iter().enumerate() {
                if i > 0 {
                    writer.write_all(b",")?;
                }
                write!(writer, "{:.*}", self.precision, w)?;
            }
            writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// Reads a grid from a file.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Grid> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SomError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        self.read_from(BufReader::new(file))
    }

    /// Reads a grid from any buffered reader.
    pub fn read_from<R: BufRead>(&self, reader: R) -> Result<Grid> {
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => GridHeader::parse(&line?)?,
            None => return Err(SomError::InvalidFormat("missing header line".to_string())),
        };

        let mut grid = Grid::new(header.rows, header.cols, header.dims)?;
        let mut neuron = 0;

        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = i + 2;
            if neuron >= header.neuron_count() {
                return Err(SomError::InvalidFormat(format!(
                    "line {}: more than {} neuron lines",
                    line_no,
                    header.neuron_count()
                )));
            }

            let weights = grid.neuron_mut(neuron)?;
            let mut count = 0;
            for token in line.split(',') {
                if count == header.dims {
                    count += 1;
                    break;
                }
                weights[count] = token.trim().parse().map_err(|_| {
                    SomError::InvalidFormat(format!("line {}: not a number: {:?}", line_no, token))
                })?;
                count += 1;
            }
            if count != header.dims {
                return Err(SomError::InvalidFormat(format!(
                    "line {}: expected {} weights",
                    line_no, header.dims
                )));
            }
            neuron += 1;
        }

        if neuron != header.neuron_count() {
            return Err(SomError::InvalidFormat(format!(
                "expected {} neuron lines, found {}",
                header.neuron_count(),
                neuron
            )));
        }

        Ok(grid)
    }
}
