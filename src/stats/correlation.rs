//! Correlation coefficients and their parametric significance.

use super::rank::average_ranks;
use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Correlation coefficient to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    #[default]
    Pearson,
    Spearman,
}

impl CorrelationKind {
    /// Correlation between `x` and `y`.
    pub fn compute(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        match self {
            Self::Pearson => pearson(x, y),
            Self::Spearman => spearman(x, y),
        }
    }
}

/// Pearson correlation. NaN if either series has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(CompareError::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    Ok(pearson_unchecked(x, y))
}

pub(crate) fn pearson_unchecked(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    cov / (var_x * var_y).sqrt()
}

/// Spearman rank correlation (Pearson on mid-ranks).
pub fn spearman(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(CompareError::DimensionMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    Ok(pearson_unchecked(&average_ranks(x), &average_ranks(y)))
}

/// Two-sided parametric p-value of a correlation `r` over `n` pairs, from
/// Student's t with `n - 2` degrees of freedom.
///
/// `None` when `n < 3` or `r` is NaN.
pub fn correlation_t_test(r: f64, n: usize) -> Option<f64> {
    if n < 3 || r.is_nan() {
        return None;
    }
    if r.abs() >= 1.0 {
        return Some(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pearson() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(pearson(&x, &[2.0, 4.0, 6.0, 8.0, 10.0]).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(pearson(&x, &[5.0, 4.0, 3.0, 2.0, 1.0]).unwrap(), -1.0, epsilon = 1e-12);
        assert_relative_eq!(
            pearson(&x, &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap(),
            0.8,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_pearson_constant_is_nan() {
        assert!(pearson(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0]).unwrap().is_nan());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(matches!(
            pearson(&[1.0, 2.0], &[1.0]),
            Err(CompareError::DimensionMismatch { .. })
        ));
        assert!(spearman(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_spearman_monotone() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [1.0, 10.0, 100.0, 1000.0];
        assert_relative_eq!(spearman(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(CorrelationKind::Spearman.compute(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_t_test() {
        assert_eq!(correlation_t_test(0.5, 2), None);
        assert_eq!(correlation_t_test(1.0, 10), Some(0.0));

        // r = 0.8, n = 5: t = 0.8 * sqrt(3 / 0.36) = 2.3094, df = 3
        let p = correlation_t_test(0.8, 5).unwrap();
        assert_relative_eq!(p, 0.1040, epsilon = 1e-3);

        assert_relative_eq!(correlation_t_test(0.0, 10).unwrap(), 1.0, epsilon = 1e-12);
    }
}
