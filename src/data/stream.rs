//! Endless stream of training vectors over a restartable source.

use crate::data::{LineSource, LineStatus, RowParser};
use crate::error::{Result, SomError};
use log::{debug, warn};

/// Cycles over the rows of a [`LineSource`] forever.
///
/// When the source is exhausted it is restarted and reading continues, so the
/// consumer's iteration count is independent of the source length. Empty
/// lines and malformed rows are skipped and counted, never returned.
pub struct CyclicRows<S> {
    source: S,
    parser: RowParser,
    rewinds: usize,
    empty_lines: usize,
    malformed_rows: usize,
    rows_since_rewind: usize,
    from_start: bool,
}

impl<S: LineSource> CyclicRows<S> {
    /// Wraps a source. Reading starts from the source's current position.
    pub fn new(source: S, parser: RowParser) -> Self {
        let from_start = source.line_number() == 0;
        Self {
            source,
            parser,
            rewinds: 0,
            empty_lines: 0,
            malformed_rows: 0,
            rows_since_rewind: 0,
            from_start,
        }
    }

    /// Reads the next valid row into `out`.
    ///
    /// Undecodable lines count as malformed rows. Fails on I/O errors, and with [`SomError::EmptySource`] when a full pass
    /// over the source yields no valid row.
    pub fn next_into(&mut self, out: &mut Vec<f64>) -> Result<()> {
        loop {
            let status = match self.source.next_line() {
                Ok(status) => status,
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping row: {}", e);
                    self.malformed_rows += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            match status {
                LineStatus::Line(line) => {
                    let line_no = self.source.line_number();
                    match self.parser.parse_into(&line, line_no, out) {
                        Ok(()) => {
                            self.rows_since_rewind += 1;
                            return Ok(());
                        }
                        Err(e) if e.is_recoverable() => {
                            warn!("Skipping row: {}", e);
                            self.malformed_rows += 1;
                        }
                        Err(e) => return Err(e),
                    }
                }
                LineStatus::Empty => {
                    debug!("Skipping empty line {}", self.source.line_number());
                    self.empty_lines += 1;
                }
                LineStatus::End => {
                    // Only a pass that began at the first line proves the source is empty
                    if self.rows_since_rewind == 0 && (self.rewinds > 0 || self.from_start) {
                        return Err(SomError::EmptySource(
                            "a full pass over the source produced no valid rows".into(),
                        ));
                    }
                    self.source.restart()?;
                    self.rewinds += 1;
                    self.rows_since_rewind = 0;
                    debug!("Rewinding data source (rewind {})", self.rewinds);
                }
            }
        }
    }

    /// Reads the next valid row.
    pub fn next_vector(&mut self) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(self.parser.dims());
        self.next_into(&mut out)?;
        Ok(out)
    }

    /// Restarts the underlying source and clears the counters.
    pub fn restart(&mut self) -> Result<()> {
        self.source.restart()?;
        self.rewinds = 0;
        self.empty_lines = 0;
        self.malformed_rows = 0;
        self.rows_since_rewind = 0;
        self.from_start = true;
        Ok(())
    }

    /// Number of times the source wrapped around.
    pub fn rewinds(&self) -> usize {
        self.rewinds
    }

    /// Number of empty lines skipped.
    pub fn empty_lines(&self) -> usize {
        self.empty_lines
    }

    /// Number of malformed rows skipped.
    pub fn malformed_rows(&self) -> usize {
        self.malformed_rows
    }

    /// Returns the wrapped source.
    pub fn into_inner(self) -> S {
        self.source
    }
}
