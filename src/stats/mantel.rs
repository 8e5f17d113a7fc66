//! Mantel test: correlation between two distance matrices.
//!
//! Pearson correlation of the lower triangles; permutations reorder the rows
//! and columns of the first matrix together.

use super::correlation::pearson_unchecked;
use super::permutation::{permutation_test, PermutationConfig, PermutationOutcome, Permute, TestStatistic};
use crate::data::DistanceMatrix;
use crate::error::{CompareError, Result};

/// Mantel statistic for a pair of matrices over the same samples.
#[derive(Debug, Clone)]
pub struct Mantel<'a> {
    x: &'a DistanceMatrix,
    y_flat: Vec<f64>,
}

impl<'a> Mantel<'a> {
    /// Both matrices must list the same sample IDs in the same order.
    pub fn new(x: &'a DistanceMatrix, y: &DistanceMatrix) -> Result<Self> {
        if x.n_samples() != y.n_samples() {
            return Err(CompareError::DimensionMismatch {
                expected: x.n_samples(),
                actual: y.n_samples(),
            });
        }
        if x.sample_ids() != y.sample_ids() {
            return Err(CompareError::SampleMismatch(
                "Distance matrices must have the same sample order".to_string(),
            ));
        }
        Ok(Self {
            x,
            y_flat: y.lower_triangle(),
        })
    }
}

impl TestStatistic for Mantel<'_> {
    fn n_samples(&self) -> usize {
        self.x.n_samples()
    }

    fn statistic(&self, order: &[usize]) -> f64 {
        pearson_unchecked(&self.x.permuted_lower_triangle(order), &self.y_flat)
    }
}

/// Mantel r. NaN if either matrix is constant off the diagonal.
pub fn mantel(x: &DistanceMatrix, y: &DistanceMatrix) -> Result<f64> {
    let test = Mantel::new(x, y)?;
    Ok(test.statistic(&(0..x.n_samples()).collect::<Vec<_>>()))
}

/// Mantel r with a permutation p-value from an explicit permutation strategy.
///
/// A NaN statistic (see [`mantel`]) comes back with the smallest possible p-value,
/// `1 / (n_permutations + 1)`, not a meaningful one.
pub fn mantel_test<P: Permute + ?Sized>(
    x: &DistanceMatrix,
    y: &DistanceMatrix,
    n_permutations: usize,
    permuter: &mut P,
) -> Result<PermutationOutcome> {
    let test = Mantel::new(x, y)?;
    Ok(permutation_test(&test, n_permutations, permuter))
}

/// Mantel r with a seeded permutation p-value.
pub fn mantel_with_config(
    x: &DistanceMatrix,
    y: &DistanceMatrix,
    config: &PermutationConfig,
) -> Result<PermutationOutcome> {
    let test = Mantel::new(x, y)?;
    Ok(config.run(&test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::permutation::rotate_left;
    use crate::stats::test_fixtures::four_sample_dm;
    use approx::assert_relative_eq;

    #[test]
    fn test_identical_matrices() {
        let dm = four_sample_dm(5.0);
        assert_relative_eq!(mantel(&dm, &dm).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_known_correlation() {
        // lower triangles: x = [1, 5, 3, 4, 2, 3], y = [1, 2, 3, 4, 5, 6]
        let x = four_sample_dm(5.0);
        let y = DistanceMatrix::from_rows(
            x.sample_ids().to_vec(),
            &[
                vec![0.0, 1.0, 2.0, 4.0],
                vec![1.0, 0.0, 3.0, 5.0],
                vec![2.0, 3.0, 0.0, 6.0],
                vec![4.0, 5.0, 6.0, 0.0],
            ],
        )
        .unwrap();
        // mean x = 3, mean y = 3.5; cov = 1.0, var_x = 10, var_y = 17.5
        let expected = 1.0 / (10.0f64 * 17.5).sqrt();
        assert_relative_eq!(mantel(&x, &y).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_matrix_is_nan() {
        let x = four_sample_dm(5.0);
        let y = DistanceMatrix::from_rows(
            x.sample_ids().to_vec(),
            &(0..4)
                .map(|i| (0..4).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
                .collect::<Vec<Vec<f64>>>(),
        )
        .unwrap();
        assert!(mantel(&x, &y).unwrap().is_nan());
    }

    #[test]
    fn test_sample_order_must_match() {
        let x = four_sample_dm(5.0);
        let mut ids = x.sample_ids().to_vec();
        ids.swap(0, 1);
        let y = DistanceMatrix::new(ids, x.data().clone()).unwrap();
        assert!(matches!(mantel(&x, &y), Err(CompareError::SampleMismatch(_))));
    }

    #[test]
    fn test_rotation_p_value() {
        let dm = four_sample_dm(5.0);
        // a full cycle of 4 rotations returns to the identity once
        let outcome = mantel_test(&dm, &dm, 4, &mut rotate_left).unwrap();
        assert_relative_eq!(outcome.statistic, 1.0, epsilon = 1e-12);
        assert!(outcome.n_extreme >= 1);
        assert_eq!(
            outcome.p_value,
            (outcome.n_extreme as f64 + 1.0) / 5.0
        );
    }

    #[test]
    fn test_seeded() {
        let dm = four_sample_dm(5.0);
        let outcome = mantel_with_config(&dm, &dm, &PermutationConfig::quick()).unwrap();
        assert!(outcome.p_value <= 1.0);
        assert_eq!(outcome.n_permutations, 99);
    }
}
