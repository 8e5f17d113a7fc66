//! vegan `mrpp` output.
//!
//! Two lines carry the result:
//!
//! ```text
//! Chance corrected within-group agreement A: 0.1234
//! Significance of delta: 0.001
//! ```

use super::float::{parse_float, parse_p_value, FloatBounds};
use super::split_at_sentinel;
use crate::data::ParsedStatResult;
use crate::error::{CompareError, Result};

const A_PREFIX: &str = "Chance corrected";
const SIGNIFICANCE_PREFIX: &str = "Significance of delta:";

/// Parse MRPP output into `(A, p)`.
pub fn parse_mrpp<S: AsRef<str>>(lines: &[S]) -> Result<ParsedStatResult> {
    let mut effect_size = None;
    let mut p_value = None;

    for line in lines.iter().map(|l| l.as_ref().trim()) {
        if line.starts_with(A_PREFIX) {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != 6 {
                return Err(CompareError::unparsable_line(line));
            }
            effect_size = Some(parse_float(tokens[5], FloatBounds::unbounded())?);
        } else if line.starts_with(SIGNIFICANCE_PREFIX) {
            p_value = Some(match split_at_sentinel(line) {
                (tokens, true) if tokens.len() == 3 => None,
                (tokens, false) if tokens.len() == 4 => Some(parse_p_value(tokens[3])?),
                _ => return Err(CompareError::unparsable_line(line)),
            });
        }

        if effect_size.is_some() && p_value.is_some() {
            break;
        }
    }

    match (effect_size, p_value) {
        (Some(effect_size), Some(p_value)) => Ok(ParsedStatResult {
            effect_size,
            p_value,
        }),
        _ => Err(CompareError::unparsable_file("mrpp")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::too_few_iters;
    use approx::assert_relative_eq;

    const OUTPUT: &str = "
Call:
mrpp(dat = qiime.data$distmat, grouping = qiime.data$map[[opts$category]],      permutations = opts$num_permutations)

Dissimilarity index:
Weights for groups:  n

Class means and counts:

      Control Fast
delta 0.6303  0.6145
n     8       8

Chance corrected within-group agreement A: 0.04927
Based on observed delta 0.6224 and expected delta 0.6547

Significance of delta: 0.001
Permutation: free
Number of permutations: 999
";

    #[test]
    fn test_parse_mrpp() {
        let lines: Vec<&str> = OUTPUT.lines().collect();
        let result = parse_mrpp(&lines).unwrap();
        assert_relative_eq!(result.effect_size, 0.04927);
        assert_eq!(result.p_value, Some(0.001));
    }

    #[test]
    fn test_missing_significance() {
        let lines: Vec<&str> = OUTPUT
            .lines()
            .filter(|l| !l.starts_with("Significance"))
            .collect();
        assert!(matches!(
            parse_mrpp(&lines),
            Err(CompareError::UnparsableFile { ref method }) if method == "mrpp"
        ));
    }

    #[test]
    fn test_malformed_agreement_line() {
        let lines = [
            "Chance corrected within-group agreement: 0.04927",
            "Significance of delta: 0.001",
        ];
        assert!(matches!(
            parse_mrpp(&lines),
            Err(CompareError::UnparsableLine { .. })
        ));
    }

    #[test]
    fn test_too_few_iters() {
        let significance = format!("Significance of delta: {}", too_few_iters(5));
        let lines = ["Chance corrected within-group agreement A: 0.04927", significance.as_str()];
        let result = parse_mrpp(&lines).unwrap();
        assert_relative_eq!(result.effect_size, 0.04927);
        assert_eq!(result.p_value, None);
    }

    #[test]
    fn test_negative_agreement() {
        let lines = [
            "Chance corrected within-group agreement A: -0.0112",
            "Significance of delta: 0.734",
        ];
        let result = parse_mrpp(&lines).unwrap();
        assert_relative_eq!(result.effect_size, -0.0112);
        assert_eq!(result.p_value, Some(0.734));
    }
}
