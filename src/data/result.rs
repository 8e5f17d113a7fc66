//! Parsed statistical results and the per-cell trial accumulator.

use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rendering of a [`StatsResults`] with no recorded trials.
pub const EMPTY_RESULTS: &str = "Empty results";

/// Effect size and p-value extracted from one result file or computed by one
/// permutation test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedStatResult {
    /// Method-specific statistic (R, pseudo-F, r, R², A, I, ...).
    pub effect_size: f64,
    /// Significance, or `None` when too few permutations were run to compute
    /// one. Always in `[0, 1]` when present.
    pub p_value: Option<f64>,
}

impl ParsedStatResult {
    /// A result with a p-value.
    pub fn new(effect_size: f64, p_value: f64) -> Self {
        Self {
            effect_size,
            p_value: Some(p_value),
        }
    }

    /// A result whose p-value could not be computed.
    pub fn without_p_value(effect_size: f64) -> Self {
        Self {
            effect_size,
            p_value: None,
        }
    }
}

impl fmt::Display for ParsedStatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.p_value {
            Some(p) => write!(f, "{}\t{}", self.effect_size, p),
            None => write!(f, "{}\tN/A", self.effect_size),
        }
    }
}

/// Significance band of a p-value, as used in comparison tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Significance {
    /// p <= 0.001
    VeryHigh,
    /// p <= 0.01
    High,
    /// p <= 0.05
    Moderate,
    /// p <= 0.1
    Low,
    /// p > 0.1
    NotSignificant,
}

impl Significance {
    /// Classify a p-value. Bands are inclusive at their upper threshold.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::Range`] if `p_value` is NaN or outside `[0, 1]`.
    pub fn from_p_value(p_value: f64) -> Result<Self> {
        check_p_value(p_value)?;
        Ok(if p_value <= 0.001 {
            Self::VeryHigh
        } else if p_value <= 0.01 {
            Self::High
        } else if p_value <= 0.05 {
            Self::Moderate
        } else if p_value <= 0.1 {
            Self::Low
        } else {
            Self::NotSignificant
        })
    }

    /// Asterisk marker for this band.
    pub fn asterisk(&self) -> &'static str {
        match self {
            Self::VeryHigh => "****",
            Self::High => "***",
            Self::Moderate => "**",
            Self::Low => "*",
            Self::NotSignificant => "x",
        }
    }
}

/// Encode a p-value as an asterisk marker (`"****"` .. `"*"`, or `"x"` when not
/// significant).
pub fn format_p_value_as_asterisk(p_value: f64) -> Result<&'static str> {
    Significance::from_p_value(p_value).map(|s| s.asterisk())
}

fn check_p_value(p_value: f64) -> Result<()> {
    if p_value.is_nan() || !(0.0..=1.0).contains(&p_value) {
        return Err(CompareError::Range {
            value: p_value,
            min: 0.0,
            max: 1.0,
        });
    }
    Ok(())
}

/// Repeated trial outcomes of one configuration (study, metric, category,
/// perturbation, method).
///
/// The effect size is fixed by the first successful [`add_result`] and every
/// later trial must report the same value; only the permutation p-value is
/// expected to vary between trials. The state is private so that
/// [`add_result`] is the only transition.
///
/// [`add_result`]: StatsResults::add_result
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StatsResults {
    trials: Trials,
}

/// `Populated` always holds at least one p-value, each in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Trials {
    #[default]
    Empty,
    Populated { effect_size: f64, p_values: Vec<f64> },
}

impl StatsResults {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one trial.
    ///
    /// A NaN effect size (a degenerate statistic) matches an earlier NaN.
    ///
    /// # Errors
    ///
    /// * [`CompareError::Range`] if `p_value` is not in `[0, 1]`.
    /// * [`CompareError::Consistency`] if `effect_size` differs from the value
    ///   recorded by an earlier trial.
    ///
    /// State is unchanged on error.
    pub fn add_result(&mut self, effect_size: f64, p_value: f64) -> Result<()> {
        check_p_value(p_value)?;

        match &mut self.trials {
            Trials::Empty => {
                self.trials = Trials::Populated {
                    effect_size,
                    p_values: vec![p_value],
                };
            }
            Trials::Populated {
                effect_size: existing,
                p_values,
            } => {
                let same = *existing == effect_size || (existing.is_nan() && effect_size.is_nan());
                if !same {
                    return Err(CompareError::Consistency {
                        existing: *existing,
                        new: effect_size,
                    });
                }
                p_values.push(p_value);
            }
        }
        Ok(())
    }

    /// Record a parsed result. A result without a p-value is rejected with
    /// [`CompareError::MissingPValue`].
    pub fn add_parsed(&mut self, result: &ParsedStatResult) -> Result<()> {
        let p_value = result.p_value.ok_or(CompareError::MissingPValue)?;
        self.add_result(result.effect_size, p_value)
    }

    /// Drop all recorded trials.
    pub fn clear(&mut self) {
        self.trials = Trials::Empty;
    }

    /// True if no trials have been recorded.
    pub fn is_empty(&self) -> bool {
        self.p_values().is_empty()
    }

    /// Effect size shared by all trials.
    pub fn effect_size(&self) -> Option<f64> {
        match &self.trials {
            Trials::Empty => None,
            Trials::Populated { effect_size, .. } => Some(*effect_size),
        }
    }

    /// P-values in trial order.
    pub fn p_values(&self) -> &[f64] {
        match &self.trials {
            Trials::Empty => &[],
            Trials::Populated { p_values, .. } => p_values,
        }
    }

    /// Number of recorded trials.
    pub fn n_trials(&self) -> usize {
        self.p_values().len()
    }

    /// Mean p-value across trials.
    pub fn mean_p_value(&self) -> Option<f64> {
        let p = self.p_values();
        if p.is_empty() {
            None
        } else {
            Some(p.iter().sum::<f64>() / p.len() as f64)
        }
    }
}

impl fmt::Display for StatsResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (effect_size, p_values) = match &self.trials {
            Trials::Populated {
                effect_size,
                p_values,
            } if !p_values.is_empty() => (effect_size, p_values),
            _ => return f.write_str(EMPTY_RESULTS),
        };

        write!(f, "{:.2}; ", effect_size)?;
        for (i, p) in p_values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match format_p_value_as_asterisk(*p) {
                Ok(marker) => f.write_str(marker)?,
                Err(_) => write!(f, "{}", p)?,
            }
        }
        Ok(())
    }
}
