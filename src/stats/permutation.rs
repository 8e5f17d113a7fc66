//! Permutation p-values for distance-based test statistics.
//!
//! # Algorithm
//!
//! 1. Compute the observed statistic with samples in their original order
//! 2. Permute the sample order `n_permutations` times; each permutation is
//!    applied to the order produced by the previous one
//! 3. Count permuted statistics >= observed (`n_extreme`)
//! 4. P-value = (n_extreme + 1) / (n_permutations + 1)
//!
//! The permutation strategy is injected through [`Permute`], so tests can
//! replace random shuffling with a fixed sequence.

use crate::data::ParsedStatResult;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A test statistic evaluated under a relabelling of the samples.
pub trait TestStatistic: Sync {
    /// Number of samples being permuted.
    fn n_samples(&self) -> usize;

    /// Statistic when sample `i` takes the label (or matrix position) of
    /// sample `order[i]`. The identity order gives the observed statistic.
    fn statistic(&self, order: &[usize]) -> f64;
}

/// Strategy producing the next permutation of a sample order in place.
pub trait Permute {
    fn permute(&mut self, order: &mut [usize]);
}

impl<F: FnMut(&mut [usize])> Permute for F {
    fn permute(&mut self, order: &mut [usize]) {
        self(order)
    }
}

/// Seeded Fisher-Yates shuffle (xorshift64).
#[derive(Debug, Clone)]
pub struct SeededShuffle {
    state: u64,
}

impl SeededShuffle {
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the all-zero state
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

impl Permute for SeededShuffle {
    fn permute(&mut self, order: &mut [usize]) {
        for i in (1..order.len()).rev() {
            let j = (self.next_u64() % (i as u64 + 1)) as usize;
            order.swap(i, j);
        }
    }
}

/// Cyclic left rotation by one position. Deterministic; useful for tests.
pub fn rotate_left(order: &mut [usize]) {
    if !order.is_empty() {
        order.rotate_left(1);
    }
}

/// Outcome of a permutation test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PermutationOutcome {
    /// Observed statistic.
    pub statistic: f64,
    /// Permutation p-value.
    pub p_value: f64,
    /// Number of permutations run.
    pub n_permutations: usize,
    /// Number of permuted statistics >= observed.
    pub n_extreme: usize,
}

impl From<PermutationOutcome> for ParsedStatResult {
    fn from(outcome: PermutationOutcome) -> Self {
        ParsedStatResult::new(outcome.statistic, outcome.p_value)
    }
}

/// `(n_extreme + 1) / (n_permutations + 1)`.
pub fn permutation_p_value(n_extreme: usize, n_permutations: usize) -> f64 {
    (n_extreme as f64 + 1.0) / (n_permutations as f64 + 1.0)
}

/// Run a permutation test with an explicit permutation strategy.
///
/// A NaN observed statistic is never matched or beaten, so the p-value is the
/// smallest possible, `1 / (n_permutations + 1)`. Check the statistic before
/// reading significance from a degenerate input.
pub fn permutation_test<T, P>(test: &T, n_permutations: usize, permuter: &mut P) -> PermutationOutcome
where
    T: TestStatistic + ?Sized,
    P: Permute + ?Sized,
{
    let mut order: Vec<usize> = (0..test.n_samples()).collect();
    let observed = test.statistic(&order);

    let mut n_extreme = 0;
    for _ in 0..n_permutations {
        permuter.permute(&mut order);
        if test.statistic(&order) >= observed {
            n_extreme += 1;
        }
    }

    PermutationOutcome {
        statistic: observed,
        p_value: permutation_p_value(n_extreme, n_permutations),
        n_permutations,
        n_extreme,
    }
}

/// Configuration for permutation testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermutationConfig {
    /// Number of permutations to run.
    pub n_permutations: usize,
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Whether to run permutations in parallel.
    pub parallel: bool,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            n_permutations: 999,
            seed: 42,
            parallel: false,
        }
    }
}

impl PermutationConfig {
    /// Create a quick configuration for testing (fewer permutations).
    pub fn quick() -> Self {
        Self {
            n_permutations: 99,
            ..Default::default()
        }
    }

    /// Create a thorough configuration (more permutations).
    pub fn thorough() -> Self {
        Self {
            n_permutations: 9999,
            ..Default::default()
        }
    }

    /// Run a permutation test with seeded shuffling.
    ///
    /// Sequential runs shuffle one order cumulatively from `seed`. Parallel
    /// runs shuffle a fresh order per permutation, seeded with
    /// `seed + permutation index`; the tally and correction are the same.
    /// A NaN observed statistic gives the smallest p-value, as in
    /// [`permutation_test`].
    pub fn run<T: TestStatistic + ?Sized>(&self, test: &T) -> PermutationOutcome {
        debug!(
            n_samples = test.n_samples(),
            n_permutations = self.n_permutations,
            parallel = self.parallel,
            "running permutation test"
        );

        if !self.parallel {
            let mut shuffle = SeededShuffle::new(self.seed);
            return permutation_test(test, self.n_permutations, &mut shuffle);
        }

        let n = test.n_samples();
        let identity: Vec<usize> = (0..n).collect();
        let observed = test.statistic(&identity);

        let n_extreme = (0..self.n_permutations)
            .into_par_iter()
            .filter(|&perm_idx| {
                let mut shuffle = SeededShuffle::new(self.seed.wrapping_add(perm_idx as u64));
                let mut order = identity.clone();
                shuffle.permute(&mut order);
                test.statistic(&order) >= observed
            })
            .count();

        PermutationOutcome {
            statistic: observed,
            p_value: permutation_p_value(n_extreme, self.n_permutations),
            n_permutations: self.n_permutations,
            n_extreme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Statistic = position of sample 0's label in the order, so the number of
    /// permutations beating the observed value is easy to count.
    struct FirstLabel {
        n: usize,
    }

    impl TestStatistic for FirstLabel {
        fn n_samples(&self) -> usize {
            self.n
        }

        fn statistic(&self, order: &[usize]) -> f64 {
            order[0] as f64
        }
    }

    #[test]
    fn test_p_value_correction() {
        assert_eq!(permutation_p_value(0, 99), 0.01);
        assert_eq!(permutation_p_value(99, 99), 1.0);
        assert_eq!(permutation_p_value(0, 0), 1.0);
    }

    #[test]
    fn test_rotation_is_cumulative() {
        let mut order = vec![0, 1, 2, 3];
        let mut rotate = rotate_left;
        rotate.permute(&mut order);
        rotate.permute(&mut order);
        assert_eq!(order, vec![2, 3, 0, 1]);
    }

    #[test]
    fn test_closure_strategy() {
        // every permutation ties the observed value
        let test = FirstLabel { n: 3 };
        let mut calls = 0;
        let mut identity = |_: &mut [usize]| calls += 1;
        let outcome = permutation_test(&test, 4, &mut identity);
        assert_eq!(calls, 4);
        assert_eq!(outcome.n_extreme, 4);
        assert_eq!(outcome.p_value, 1.0);
    }

    #[test]
    fn test_rotation_counts() {
        // observed = 0; rotations give order[0] = 1, 2, 0, 1 -> all >= 0
        let test = FirstLabel { n: 3 };
        let outcome = permutation_test(&test, 4, &mut rotate_left);
        assert_eq!(outcome.statistic, 0.0);
        assert_eq!(outcome.n_extreme, 4);
    }

    struct Degenerate;

    impl TestStatistic for Degenerate {
        fn n_samples(&self) -> usize {
            4
        }

        fn statistic(&self, _order: &[usize]) -> f64 {
            f64::NAN
        }
    }

    #[test]
    fn test_nan_statistic_is_never_extreme() {
        let outcome = permutation_test(&Degenerate, 9, &mut rotate_left);
        assert!(outcome.statistic.is_nan());
        assert_eq!(outcome.n_extreme, 0);
        assert_eq!(outcome.p_value, 0.1);

        let config = PermutationConfig {
            n_permutations: 9,
            seed: 1,
            parallel: true,
        };
        assert_eq!(config.run(&Degenerate).n_extreme, 0);
    }

    #[test]
    fn test_seeded_shuffle_is_permutation() {
        let mut shuffle = SeededShuffle::new(7);
        let mut order: Vec<usize> = (0..20).collect();
        for _ in 0..10 {
            shuffle.permute(&mut order);
            let mut sorted = order.clone();
            sorted.sort();
            assert_eq!(sorted, (0..20).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_seed_zero() {
        let mut shuffle = SeededShuffle::new(0);
        let mut order: Vec<usize> = (0..10).collect();
        shuffle.permute(&mut order);
        assert_ne!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_config_reproducible() {
        let test = FirstLabel { n: 10 };
        for parallel in [false, true] {
            let config = PermutationConfig {
                n_permutations: 200,
                seed: 12345,
                parallel,
            };
            let a = config.run(&test);
            let b = config.run(&test);
            assert_eq!(a, b);
            assert_eq!(a.n_permutations, 200);
            assert!(a.p_value > 0.0 && a.p_value <= 1.0);
        }
    }
}
