//! Sample-by-sample dissimilarity matrices.

use crate::error::{CompareError, Result};
use nalgebra::DMatrix;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A square dissimilarity matrix indexed by sample ID.
///
/// Rows and columns share the order of `sample_ids`. Symmetry and a zero
/// diagonal are expected but not enforced; see [`is_symmetric`].
///
/// [`is_symmetric`]: DistanceMatrix::is_symmetric
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    sample_ids: Vec<String>,
    data: DMatrix<f64>,
}

impl DistanceMatrix {
    /// Create a distance matrix from sample IDs and a square matrix.
    pub fn new(sample_ids: Vec<String>, data: DMatrix<f64>) -> Result<Self> {
        if data.nrows() != data.ncols() {
            return Err(CompareError::DimensionMismatch {
                expected: data.nrows(),
                actual: data.ncols(),
            });
        }
        if data.nrows() != sample_ids.len() {
            return Err(CompareError::DimensionMismatch {
                expected: data.nrows(),
                actual: sample_ids.len(),
            });
        }
        Ok(Self { sample_ids, data })
    }

    /// Build from row-major nested vectors.
    pub fn from_rows(sample_ids: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let n = rows.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != n) {
            return Err(CompareError::DimensionMismatch {
                expected: n,
                actual: bad.len(),
            });
        }
        let data = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
        Self::new(sample_ids, data)
    }

    /// Load a tab-delimited distance matrix.
    ///
    /// Expected format:
    /// - First row: empty corner cell followed by sample IDs
    /// - Subsequent rows: sample ID followed by distances, in header order
    pub fn from_tsv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Self::from_lines(&lines)
    }

    /// Parse a distance matrix from already-read lines.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut rows = lines
            .iter()
            .map(|l| l.as_ref().trim_end_matches(['\r', '\n']))
            .filter(|l| !l.trim().is_empty());

        let header = rows
            .next()
            .ok_or_else(|| CompareError::EmptyData("Empty distance matrix".to_string()))?;
        let sample_ids: Vec<String> = header
            .split('\t')
            .skip(1)
            .map(|s| s.trim().to_string())
            .collect();
        let n = sample_ids.len();
        if n == 0 {
            return Err(CompareError::EmptyData(
                "Distance matrix has no samples".to_string(),
            ));
        }

        let mut values = Vec::with_capacity(n * n);
        let mut n_rows = 0;
        for line in rows {
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != n + 1 {
                return Err(CompareError::unparsable_line(line));
            }
            if n_rows >= n {
                return Err(CompareError::DimensionMismatch {
                    expected: n,
                    actual: n_rows + 1,
                });
            }
            if fields[0].trim() != sample_ids[n_rows] {
                return Err(CompareError::SampleMismatch(format!(
                    "Row '{}' does not match header order",
                    fields[0]
                )));
            }
            for field in &fields[1..] {
                let value: f64 = field.trim().parse().map_err(|_| CompareError::Conversion {
                    token: field.to_string(),
                })?;
                values.push(value);
            }
            n_rows += 1;
        }

        if n_rows != n {
            return Err(CompareError::DimensionMismatch {
                expected: n,
                actual: n_rows,
            });
        }

        Self::new(sample_ids, DMatrix::from_row_slice(n, n, &values))
    }

    /// Write the matrix in the layout read by [`from_tsv`](Self::from_tsv).
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for id in &self.sample_ids {
            write!(writer, "\t{}", id)?;
        }
        writeln!(writer)?;
        for (i, id) in self.sample_ids.iter().enumerate() {
            write!(writer, "{}", id)?;
            for j in 0..self.n_samples() {
                write!(writer, "\t{}", self.data[(i, j)])?;
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Sample IDs in row/column order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Distance between samples `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[(i, j)]
    }

    /// Underlying matrix.
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Strict lower triangle, row by row: `d(1,0), d(2,0), d(2,1), d(3,0), ...`.
    pub fn lower_triangle(&self) -> Vec<f64> {
        let n = self.n_samples();
        let mut flat = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 1..n {
            for j in 0..i {
                flat.push(self.data[(i, j)]);
            }
        }
        flat
    }

    /// Lower triangle after reordering rows and columns by `order`.
    pub fn permuted_lower_triangle(&self, order: &[usize]) -> Vec<f64> {
        let n = self.n_samples();
        let mut flat = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 1..n {
            for j in 0..i {
                flat.push(self.data[(order[i], order[j])]);
            }
        }
        flat
    }

    /// True if `d(i,j)` and `d(j,i)` differ by at most `tolerance` everywhere.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.n_samples();
        (0..n).all(|i| (0..i).all(|j| (self.data[(i, j)] - self.data[(j, i)]).abs() <= tolerance))
    }

    /// Index of a sample ID.
    pub fn index_of(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|s| s == sample_id)
    }
}
