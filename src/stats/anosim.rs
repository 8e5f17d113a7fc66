//! ANOSIM: analysis of similarities.
//!
//! Compares mean ranks of between-group distances to mean ranks of
//! within-group distances: `R = (r_B - r_W) / (N(N-1)/4)`.

use super::permutation::{permutation_test, PermutationConfig, PermutationOutcome, Permute, TestStatistic};
use super::rank::average_ranks;
use crate::data::{DistanceMatrix, Grouping};
use crate::error::{CompareError, Result};

/// ANOSIM statistic over a fixed distance matrix; the group labels are what
/// permutations move.
#[derive(Debug, Clone)]
pub struct Anosim<'a> {
    grouping: &'a Grouping,
    /// Ranks of the strict lower triangle, row by row.
    ranks: Vec<f64>,
    n: usize,
}

impl<'a> Anosim<'a> {
    /// Rank the distances of `dm` once for repeated evaluation.
    pub fn new(dm: &DistanceMatrix, grouping: &'a Grouping) -> Result<Self> {
        check_sizes(dm, grouping)?;
        Ok(Self {
            grouping,
            ranks: average_ranks(&dm.lower_triangle()),
            n: dm.n_samples(),
        })
    }
}

pub(crate) fn check_sizes(dm: &DistanceMatrix, grouping: &Grouping) -> Result<()> {
    if dm.n_samples() != grouping.n_samples() {
        return Err(CompareError::DimensionMismatch {
            expected: dm.n_samples(),
            actual: grouping.n_samples(),
        });
    }
    Ok(())
}

impl TestStatistic for Anosim<'_> {
    fn n_samples(&self) -> usize {
        self.n
    }

    fn statistic(&self, order: &[usize]) -> f64 {
        let labels = self.grouping.labels();
        let mut within_sum = 0.0;
        let mut between_sum = 0.0;
        let mut n_within = 0usize;
        let mut n_between = 0usize;

        let mut idx = 0;
        for i in 1..self.n {
            for j in 0..i {
                if labels[order[i]] == labels[order[j]] {
                    within_sum += self.ranks[idx];
                    n_within += 1;
                } else {
                    between_sum += self.ranks[idx];
                    n_between += 1;
                }
                idx += 1;
            }
        }

        // empty partitions yield NaN
        let r_w = within_sum / n_within as f64;
        let r_b = between_sum / n_between as f64;
        let divisor = (self.n * self.n.saturating_sub(1)) as f64 / 4.0;
        (r_b - r_w) / divisor
    }
}

/// ANOSIM R statistic.
///
/// Group counts are not validated: a single group or a partition with no
/// within-group pairs gives NaN.
pub fn anosim(dm: &DistanceMatrix, grouping: &Grouping) -> Result<f64> {
    let test = Anosim::new(dm, grouping)?;
    Ok(test.statistic(&(0..test.n).collect::<Vec<_>>()))
}

/// ANOSIM with a permutation p-value from an explicit permutation strategy.
///
/// A NaN statistic (see [`anosim`]) comes back with the smallest possible p-value,
/// `1 / (n_permutations + 1)`, not a meaningful one.
pub fn anosim_test<P: Permute + ?Sized>(
    dm: &DistanceMatrix,
    grouping: &Grouping,
    n_permutations: usize,
    permuter: &mut P,
) -> Result<PermutationOutcome> {
    let test = Anosim::new(dm, grouping)?;
    Ok(permutation_test(&test, n_permutations, permuter))
}

/// ANOSIM with a seeded permutation p-value.
pub fn anosim_with_config(
    dm: &DistanceMatrix,
    grouping: &Grouping,
    config: &PermutationConfig,
) -> Result<PermutationOutcome> {
    let test = Anosim::new(dm, grouping)?;
    Ok(config.run(&test))
}
