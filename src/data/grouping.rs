//! Per-sample grouping and gradient vectors aligned to a distance matrix.

use crate::data::{DistanceMatrix, Metadata};
use crate::error::{CompareError, Result};

/// Group membership of each sample, as dense group indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grouping {
    /// Group index per sample.
    labels: Vec<usize>,
    /// Group names, indexed by group index, in order of first appearance.
    levels: Vec<String>,
}

impl Grouping {
    /// Build from one label per sample.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let mut levels: Vec<String> = Vec::new();
        let labels = labels
            .iter()
            .map(|l| {
                let l = l.as_ref();
                match levels.iter().position(|level| level == l) {
                    Some(idx) => idx,
                    None => {
                        levels.push(l.to_string());
                        levels.len() - 1
                    }
                }
            })
            .collect();
        Self { labels, levels }
    }

    /// Group labels from a metadata column, in the sample order of `dm`.
    ///
    /// # Errors
    ///
    /// Fails if the column is unknown, a sample is absent from the metadata, or
    /// a sample has a missing value.
    pub fn from_metadata(metadata: &Metadata, column: &str, dm: &DistanceMatrix) -> Result<Self> {
        let values = metadata.values_for(column, dm.sample_ids())?;
        let labels = values
            .iter()
            .zip(dm.sample_ids())
            .map(|(v, sid)| {
                v.as_label().ok_or_else(|| {
                    CompareError::EmptyData(format!(
                        "Sample '{}' has no value for '{}'",
                        sid, column
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_labels(&labels))
    }

    /// Group index per sample.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Group names.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Number of distinct groups.
    pub fn n_groups(&self) -> usize {
        self.levels.len()
    }

    /// Number of samples in each group.
    pub fn group_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.n_groups()];
        for &g in &self.labels {
            sizes[g] += 1;
        }
        sizes
    }
}

/// Numeric metadata value of each sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    values: Vec<f64>,
}

impl Gradient {
    /// Build from one value per sample.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Gradient values from a numeric metadata column, in the sample order of
    /// `dm`.
    pub fn from_metadata(metadata: &Metadata, column: &str, dm: &DistanceMatrix) -> Result<Self> {
        let values = metadata.values_for(column, dm.sample_ids())?;
        let values = values
            .iter()
            .zip(dm.sample_ids())
            .map(|(v, sid)| {
                v.as_continuous().ok_or_else(|| {
                    CompareError::InvalidParameter(format!(
                        "Sample '{}' has no numeric value for '{}'",
                        sid, column
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { values })
    }

    /// Values per sample.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Distance matrix of absolute differences, `|x_i - x_j|`, for use as the
    /// second matrix of a Mantel test.
    pub fn to_distance_matrix(&self, sample_ids: Vec<String>) -> Result<DistanceMatrix> {
        let n = self.values.len();
        let data = nalgebra::DMatrix::from_fn(n, n, |i, j| (self.values[i] - self.values[j]).abs());
        DistanceMatrix::new(sample_ids, data)
    }
}
