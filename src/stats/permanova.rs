//! PERMANOVA: permutational multivariate analysis of variance.
//!
//! Partitions squared distances into among-group and within-group sums of
//! squares and reports the pseudo-F ratio
//! `F = (s_A / (a - 1)) / (s_W / (N - a))`.

use super::anosim::check_sizes;
use super::permutation::{permutation_test, PermutationConfig, PermutationOutcome, Permute, TestStatistic};
use crate::data::{DistanceMatrix, Grouping};
use crate::error::Result;

/// Pseudo-F statistic over a fixed distance matrix.
#[derive(Debug, Clone)]
pub struct Permanova<'a> {
    grouping: &'a Grouping,
    /// Squared strict lower triangle, row by row.
    squared: Vec<f64>,
    group_sizes: Vec<usize>,
    s_total: f64,
    n: usize,
}

impl<'a> Permanova<'a> {
    pub fn new(dm: &DistanceMatrix, grouping: &'a Grouping) -> Result<Self> {
        check_sizes(dm, grouping)?;
        let n = dm.n_samples();
        let squared: Vec<f64> = dm.lower_triangle().iter().map(|d| d * d).collect();
        let s_total = squared.iter().sum::<f64>() / n as f64;
        Ok(Self {
            grouping,
            squared,
            group_sizes: grouping.group_sizes(),
            s_total,
            n,
        })
    }
}

impl TestStatistic for Permanova<'_> {
    fn n_samples(&self) -> usize {
        self.n
    }

    fn statistic(&self, order: &[usize]) -> f64 {
        let labels = self.grouping.labels();
        let mut s_within = 0.0;
        let mut idx = 0;
        for i in 1..self.n {
            for j in 0..i {
                let g = labels[order[i]];
                if g == labels[order[j]] {
                    s_within += self.squared[idx] / self.group_sizes[g] as f64;
                }
                idx += 1;
            }
        }

        let s_among = self.s_total - s_within;
        let a = self.group_sizes.len() as f64;
        let n = self.n as f64;
        (s_among / (a - 1.0)) / (s_within / (n - a))
    }
}

/// PERMANOVA pseudo-F statistic.
///
/// Group counts are not validated: one group, or one sample per group, gives
/// a NaN or infinite ratio.
pub fn permanova(dm: &DistanceMatrix, grouping: &Grouping) -> Result<f64> {
    let test = Permanova::new(dm, grouping)?;
    Ok(test.statistic(&(0..test.n).collect::<Vec<_>>()))
}

/// PERMANOVA with a permutation p-value from an explicit permutation strategy.
///
/// A NaN statistic (see [`permanova`]) comes back with the smallest possible p-value,
/// `1 / (n_permutations + 1)`, not a meaningful one.
pub fn permanova_test<P: Permute + ?Sized>(
    dm: &DistanceMatrix,
    grouping: &Grouping,
    n_permutations: usize,
    permuter: &mut P,
) -> Result<PermutationOutcome> {
    let test = Permanova::new(dm, grouping)?;
    Ok(permutation_test(&test, n_permutations, permuter))
}

/// PERMANOVA with a seeded permutation p-value.
pub fn permanova_with_config(
    dm: &DistanceMatrix,
    grouping: &Grouping,
    config: &PermutationConfig,
) -> Result<PermutationOutcome> {
    let test = Permanova::new(dm, grouping)?;
    Ok(config.run(&test))
}
