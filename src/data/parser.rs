//! CSV-like row parsing.

use crate::error::{Result, SomError};

/// Field delimiter of training rows.
pub const DELIMITER: char = ',';

/// Parses delimited rows into fixed-dimension vectors.
///
/// One column may be excluded (typically a class label); every other column
/// is parsed as a finite float in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowParser {
    dims: usize,
    excluded_column: Option<usize>,
}

impl RowParser {
    /// Creates a parser producing `dims`-length vectors.
    pub fn new(dims: usize, excluded_column: Option<usize>) -> Self {
        Self {
            dims,
            excluded_column,
        }
    }

    /// Output dimensionality.
    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Column skipped while parsing, if any.
    #[inline]
    pub fn excluded_column(&self) -> Option<usize> {
        self.excluded_column
    }

    /// Parses one row.
    ///
    /// `line_no` is only used for error reporting.
    pub fn parse(&self, line: &str, line_no: usize) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(self.dims);
        self.parse_into(line, line_no, &mut out)?;
        Ok(out)
    }

    /// Parses one row into `out`, replacing its contents.
    pub fn parse_into(&self, line: &str, line_no: usize, out: &mut Vec<f64>) -> Result<()> {
        out.clear();
        let malformed = |reason: String| SomError::MalformedRow {
            line: line_no,
            reason,
        };

        let mut columns = 0;
        for (i, token) in line.split(DELIMITER).enumerate() {
            columns += 1;
            if Some(i) == self.excluded_column {
                continue;
            }
            if out.len() == self.dims {
                // keep counting so the error reports the real width
                continue;
            }
            let token = token.trim();
            let value: f64 = token
                .parse()
                .map_err(|_| malformed(format!("column {} is not a number: {:?}", i, token)))?;
            if !value.is_finite() {
                return Err(malformed(format!("column {} is not finite: {:?}", i, token)));
            }
            out.push(value);
        }

        let expected = match self.excluded_column {
            Some(col) if col < columns => self.dims + 1,
            _ => self.dims,
        };
        if columns != expected {
            return Err(malformed(format!(
                "expected {} columns, found {}",
                expected, columns
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_excluded_column() {
        let parser = RowParser::new(2, Some(1));
        assert_eq!(parser.parse("1.0,2.0,3.0", 1).unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_parse_without_excluded_column() {
        let parser = RowParser::new(3, None);
        assert_eq!(parser.parse(" 1.5, -2 ,3e2 ", 1).unwrap(), vec![1.5, -2.0, 300.0]);
    }

    #[test]
    fn test_excluded_label_column() {
        let parser = RowParser::new(4, Some(4));
        let v = parser.parse("5.1,3.5,1.4,0.2,Iris-setosa", 1).unwrap();
        assert_eq!(v, vec![5.1, 3.5, 1.4, 0.2]);
    }

    #[test]
    fn test_wrong_column_count() {
        let parser = RowParser::new(3, None);
        assert!(matches!(
            parser.parse("1.0,2.0", 4),
            Err(SomError::MalformedRow { line: 4, .. })
        ));
        assert!(matches!(
            parser.parse("1.0,2.0,3.0,4.0", 5),
            Err(SomError::MalformedRow { line: 5, .. })
        ));

        let parser = RowParser::new(2, Some(0));
        assert!(parser.parse("a,1.0", 1).is_err());
        assert!(parser.parse("a,1.0,2.0,3.0", 1).is_err());
    }

    #[test]
    fn test_unparsable_value() {
        let parser = RowParser::new(2, None);
        let err = parser.parse("1.0,abc", 9).unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("line 9"));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let parser = RowParser::new(2, None);
        for line in ["nan,1.0", "1.0,NaN", "inf,1.0", "1.0,-inf", "infinity,0.0"] {
            let err = parser.parse(line, 2).unwrap_err();
            assert!(err.is_recoverable(), "{:?} was not rejected as malformed", line);
        }

        // The excluded column is never parsed
        let parser = RowParser::new(1, Some(1));
        assert_eq!(parser.parse("0.5,nan", 1).unwrap(), vec![0.5]);
    }
}
