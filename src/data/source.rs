//! Line sources for training data.

use crate::error::{Result, SomError};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Outcome of reading one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineStatus {
    /// A line with content (trailing newline removed).
    Line(String),
    /// A line containing only whitespace.
    Empty,
    /// The source is exhausted.
    End,
}

/// A restartable, line-oriented data source.
pub trait LineSource {
    /// Reads the next line.
    ///
    /// A line that cannot be decoded yields a recoverable
    /// [`SomError::MalformedRow`]; the cursor still moves past it.
    fn next_line(&mut self) -> Result<LineStatus>;

    /// Moves the cursor back to the first line.
    fn restart(&mut self) -> Result<()>;

    /// 1-based number of the line most recently returned (0 before any read).
    fn line_number(&self) -> usize;
}

fn classify(line: String) -> LineStatus {
    if line.trim().is_empty() {
        LineStatus::Empty
    } else {
        LineStatus::Line(line)
    }
}

/// A buffered file source. Restarting seeks the open handle back to the start.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    line: usize,
}

impl FileSource {
    /// Opens a file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| SomError::SourceUnavailable {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            reader: BufReader::new(file),
            buf: Vec::new(),
            line: 0,
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileSource {
    fn next_line(&mut self) -> Result<LineStatus> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(LineStatus::End);
        }
        self.line += 1;

        let line = std::str::from_utf8(&self.buf).map_err(|e| SomError::MalformedRow {
            line: self.line,
            reason: format!("not valid UTF-8: {}", e),
        })?;
        Ok(classify(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn restart(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.line = 0;
        Ok(())
    }

    fn line_number(&self) -> usize {
        self.line
    }
}

/// An in-memory source over owned lines.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    lines: Vec<String>,
    cursor: usize,
}

impl MemorySource {
    /// Creates a source over the given lines.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            cursor: 0,
        }
    }

    /// Splits a block of text into lines.
    pub fn from_text(text: &str) -> Self {
        Self::new(text.lines())
    }
}

impl LineSource for MemorySource {
    fn next_line(&mut self) -> Result<LineStatus> {
        match self.lines.get(self.cursor) {
            Some(line) => {
                self.cursor += 1;
                Ok(classify(line.clone()))
            }
            None => Ok(LineStatus::End),
        }
    }

    fn restart(&mut self) -> Result<()> {
        self.cursor = 0;
        Ok(())
    }

    fn line_number(&self) -> usize {
        self.cursor
    }
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn next_line(&mut self) -> Result<LineStatus> {
        (**self).next_line()
    }

    fn restart(&mut self) -> Result<()> {
        (**self).restart()
    }

    fn line_number(&self) -> usize {
        (**self).line_number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_memory_source() {
        let mut source = MemorySource::from_text("1,2\n   \n3,4");

        assert_eq!(source.next_line().unwrap(), LineStatus::Line("1,2".into()));
        assert_eq!(source.next_line().unwrap(), LineStatus::Empty);
        assert_eq!(source.next_line().unwrap(), LineStatus::Line("3,4".into()));
        assert_eq!(source.line_number(), 3);
        assert_eq!(source.next_line().unwrap(), LineStatus::End);
        assert_eq!(source.next_line().unwrap(), LineStatus::End);

        source.restart().unwrap();
        assert_eq!(source.line_number(), 0);
        assert_eq!(source.next_line().unwrap(), LineStatus::Line("1,2".into()));
    }

    #[test]
    fn test_file_source_restart() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "1.0,2.0\r\n\n3.0,4.0\n").unwrap();

        let mut source = FileSource::open(file.path()).unwrap();
        assert_eq!(source.next_line().unwrap(), LineStatus::Line("1.0,2.0".into()));
        assert_eq!(source.next_line().unwrap(), LineStatus::Empty);
        assert_eq!(source.next_line().unwrap(), LineStatus::Line("3.0,4.0".into()));
        assert_eq!(source.next_line().unwrap(), LineStatus::End);

        source.restart().unwrap();
        assert_eq!(source.next_line().unwrap(), LineStatus::Line("1.0,2.0".into()));
        assert_eq!(source.line_number(), 1);
    }

    #[test]
    fn test_file_source_invalid_utf8_line() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"0.1,0.2\n0.\xff5,0.3\n0.9,0.8\n").unwrap();

        let mut source = FileSource::open(file.path()).unwrap();
        assert_eq!(source.next_line().unwrap(), LineStatus::Line("0.1,0.2".into()));

        let err = source.next_line().unwrap_err();
        assert!(matches!(err, SomError::MalformedRow { line: 2, .. }));
        assert!(err.is_recoverable());

        // Reading continues with the following line
        assert_eq!(source.next_line().unwrap(), LineStatus::Line("0.9,0.8".into()));
        assert_eq!(source.line_number(), 3);
    }

    #[test]
    fn test_missing_file() {
        let result = FileSource::open("/nonexistent/train.csv");
        assert!(matches!(result, Err(SomError::SourceUnavailable { .. })));
    }
}
