//! Text matrix (`.amat`) serialization.
//!
//! One sample per line: flattened pixels followed by the 4 normalized box
//! fields, separated by single spaces and printed with 6 decimal digits.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{DatasetError, DatasetResult};

/// Decimal digits printed for every field
pub const FIELD_PRECISION: usize = 6;

/// File extension of matrix files
pub const MATRIX_EXTENSION: &str = "amat";

/// Number of trailing label columns on each row
pub const LABEL_COLUMNS: usize = 4;

/// Write one row: pixels then label fields, newline-terminated
pub fn write_row<W: Write>(out: &mut W, pixels: &[f32], label: &[f64; 4]) -> io::Result<()> {
    let mut first = true;
    for value in pixels.iter().map(|&v| f64::from(v)).chain(label.iter().copied()) {
        if !first {
            out.write_all(b" ")?;
        }
        write!(out, "{:.*}", FIELD_PRECISION, value)?;
        first = false;
    }
    out.write_all(b"\n")
}

/// One parsed matrix row
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow(Vec<f32>);

impl MatrixRow {
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into pixel values and the trailing box fields
    pub fn split_label(&self) -> Option<(&[f32], [f32; 4])> {
        let split_at = self.0.len().checked_sub(LABEL_COLUMNS)?;
        let (pixels, label) = self.0.split_at(split_at);
        Some((pixels, [label[0], label[1], label[2], label[3]]))
    }
}

/// A parsed matrix file with a constant column count
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: Vec<MatrixRow>,
    columns: usize,
}

impl Matrix {
    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }
}

pub fn read_matrix(path: &Path) -> DatasetResult<Matrix> {
    let content = fs::read_to_string(path).map_err(|e| DatasetError::io(path, e))?;
    parse_matrix(&content, path)
}

/// Parse matrix text; `path` is only used for error context
pub fn parse_matrix(content: &str, path: &Path) -> DatasetResult<Matrix> {
    let mut rows = Vec::new();
    let mut columns: Option<usize> = None;

    for (index, line) in content.lines().enumerate() {
        let line_num = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let values = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f32>().map_err(|_| DatasetError::MalformedMatrix {
                    path: path.to_path_buf(),
                    line: line_num,
                    message: format!("invalid value '{}'", token),
                })
            })
            .collect::<DatasetResult<Vec<f32>>>()?;

        match columns {
            None => columns = Some(values.len()),
            Some(expected) if expected != values.len() => {
                return Err(DatasetError::MalformedMatrix {
                    path: path.to_path_buf(),
                    line: line_num,
                    message: format!("expected {} columns, found {}", expected, values.len()),
                });
            }
            Some(_) => {}
        }
        rows.push(MatrixRow(values));
    }

    Ok(Matrix {
        rows,
        columns: columns.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_row_format() {
        let mut out = Vec::new();
        write_row(&mut out, &[0.0, 255.0, 12.5], &[0.5, 0.25, 0.2, 0.1]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0.000000 255.000000 12.500000 0.500000 0.250000 0.200000 0.100000\n"
        );
    }

    #[test]
    fn test_parse_and_split_rows() {
        let text = "1.000000 2.000000 0.500000 0.500000 0.200000 0.100000\n\
                    3.000000 4.000000 0.100000 0.200000 0.300000 0.400000\n";
        let matrix = parse_matrix(text, Path::new("m.amat")).unwrap();
        assert_eq!(matrix.row_count(), 2);
        assert_eq!(matrix.columns(), 6);

        let (pixels, label) = matrix.rows()[1].split_label().unwrap();
        assert_eq!(pixels, &[3.0, 4.0]);
        assert_eq!(label, [0.1, 0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let text = "1 2 3 4 5\n1 2 3 4\n";
        match parse_matrix(text, Path::new("m.amat")) {
            Err(DatasetError::MalformedMatrix { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_short_row_has_no_label() {
        let matrix = parse_matrix("1 2 3\n", Path::new("m.amat")).unwrap();
        assert!(matrix.rows()[0].split_label().is_none());
    }
}
