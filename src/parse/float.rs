//! Float token conversion with range checks.
//!
//! Every result-file parser converts its numeric tokens through [`parse_float`]
//! so that malformed numbers, NaNs and out-of-range values fail the same way
//! regardless of which external tool produced them.

use crate::error::{CompareError, Result};

/// Bounds applied when converting a token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatBounds {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
    /// Accept NaN instead of failing with a domain error. Range checks are
    /// skipped for NaN values.
    pub allow_nan: bool,
}

impl Default for FloatBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl FloatBounds {
    /// No range restriction, NaN rejected.
    pub const fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
            allow_nan: false,
        }
    }

    /// Inclusive `[min, max]`, NaN rejected.
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            allow_nan: false,
        }
    }

    /// Only an upper bound.
    pub const fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
            allow_nan: false,
        }
    }

    /// Only a lower bound.
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
            allow_nan: false,
        }
    }

    /// Same bounds, but NaN is passed through.
    pub const fn allowing_nan(mut self) -> Self {
        self.allow_nan = true;
        self
    }
}

/// Convert a token to `f64`, enforcing `bounds`.
///
/// # Errors
///
/// * [`CompareError::Conversion`] if the token is not a decimal float.
/// * [`CompareError::Domain`] if the value is NaN and NaN is not allowed.
/// * [`CompareError::Range`] if the value falls outside `[min, max]`.
pub fn parse_float(token: &str, bounds: FloatBounds) -> Result<f64> {
    let value: f64 = token
        .trim()
        .parse()
        .map_err(|_| CompareError::Conversion {
            token: token.to_string(),
        })?;

    if value.is_nan() {
        if bounds.allow_nan {
            return Ok(value);
        }
        return Err(CompareError::Domain {
            token: token.to_string(),
        });
    }

    let min = bounds.min.unwrap_or(f64::NEG_INFINITY);
    let max = bounds.max.unwrap_or(f64::INFINITY);
    if value < min || value > max {
        return Err(CompareError::Range { value, min, max });
    }

    Ok(value)
}

/// Parse a p-value token, which must fall in `[0, 1]`.
pub fn parse_p_value(token: &str) -> Result<f64> {
    parse_float(token, FloatBounds::between(0.0, 1.0))
}

/// Parse a correlation coefficient token, which must fall in `[-1, 1]`.
pub fn parse_correlation(token: &str) -> Result<f64> {
    parse_float(token, FloatBounds::between(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_plain() {
        assert_relative_eq!(parse_float("0.045", FloatBounds::default()).unwrap(), 0.045);
        assert_relative_eq!(parse_float(" -3e-2 ", FloatBounds::default()).unwrap(), -0.03);
    }

    #[test]
    fn test_parse_not_a_number() {
        let err = parse_float("foo", FloatBounds::default()).unwrap_err();
        assert!(matches!(err, CompareError::Conversion { ref token } if token == "foo"));

        assert!(matches!(
            parse_float("", FloatBounds::default()),
            Err(CompareError::Conversion { .. })
        ));
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(matches!(
            parse_float("5.0", FloatBounds::between(0.0, 1.0)),
            Err(CompareError::Range { .. })
        ));
        assert!(matches!(
            parse_float("11.2", FloatBounds::at_most(10.0)),
            Err(CompareError::Range { .. })
        ));
        assert!(matches!(
            parse_float("-0.5", FloatBounds::at_least(0.0)),
            Err(CompareError::Range { .. })
        ));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert_eq!(parse_float("0", FloatBounds::between(0.0, 1.0)).unwrap(), 0.0);
        assert_eq!(parse_float("1.0", FloatBounds::between(0.0, 1.0)).unwrap(), 1.0);
    }

    #[test]
    fn test_nan_handling() {
        assert!(matches!(
            parse_float("nan", FloatBounds::default()),
            Err(CompareError::Domain { .. })
        ));

        // NaN skips range checks when allowed
        let v = parse_float("NaN", FloatBounds::between(-1.0, 1.0).allowing_nan()).unwrap();
        assert!(v.is_nan());
    }

    #[test]
    fn test_helpers() {
        assert_relative_eq!(parse_p_value("0.01").unwrap(), 0.01);
        assert!(parse_p_value("1.01").is_err());
        assert_relative_eq!(parse_correlation("-0.75").unwrap(), -0.75);
        assert!(parse_correlation("-1.5").is_err());
    }
}
