//! vegan `capscale` (db-RDA) output.
//!
//! ```text
//!               Inertia Proportion Rank
//! Total          4.3857     1.0000
//! Constrained    0.8901     0.2027    1
//! Unconstrained  3.4956     0.7973   14
//! ...
//! Significance: 0.01
//! ```

use super::float::{parse_float, parse_p_value, FloatBounds};
use super::split_at_sentinel;
use crate::data::ParsedStatResult;
use crate::error::{CompareError, Result};

/// Parse db-RDA output into `(R², p)`.
pub fn parse_dbrda<S: AsRef<str>>(lines: &[S]) -> Result<ParsedStatResult> {
    let mut effect_size = None;
    let mut p_value = None;

    for line in lines.iter().map(|l| l.as_ref().trim()) {
        if line.starts_with("Constrained") {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != 4 {
                return Err(CompareError::unparsable_line(line));
            }
            effect_size = Some(parse_float(tokens[2], FloatBounds::between(0.0, 1.0))?);
        } else if line.starts_with("Significance:") {
            p_value = Some(match split_at_sentinel(line) {
                (tokens, true) if tokens.len() == 1 => None,
                (tokens, false) if tokens.len() == 2 => Some(parse_p_value(tokens[1])?),
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
        _ => Err(CompareError::unparsable_file("dbrda")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::too_few_iters;
    use approx::assert_relative_eq;

    const OUTPUT: &str = "Call: capscale(formula = as.dist(qiime.data$distmat) ~ factor, data = sample.data)

              Inertia Proportion Rank
Total          4.3857     1.0000
Constrained    0.8901     0.2027    1
Unconstrained  3.4956     0.7973   14
Inertia is squared Unknown distance

Eigenvalues for constrained axes:
  CAP1
0.8901

Significance: 0.01
";

    #[test]
    fn test_parse_dbrda() {
        let lines: Vec<&str> = OUTPUT.lines().collect();
        let result = parse_dbrda(&lines).unwrap();
        assert_relative_eq!(result.effect_size, 0.2027);
        assert_eq!(result.p_value, Some(0.01));
    }

    #[test]
    fn test_too_few_iters() {
        let significance = format!("Significance: {}", too_few_iters(5));
        let lines = ["Constrained    0.8901     0.2027    1", significance.as_str()];
        let result = parse_dbrda(&lines).unwrap();
        assert_relative_eq!(result.effect_size, 0.2027);
        assert_eq!(result.p_value, None);
    }

    #[test]
    fn test_missing_constrained_line() {
        let lines = ["Total 4.3857 1.0000", "Significance: 0.01"];
        assert!(matches!(
            parse_dbrda(&lines),
            Err(CompareError::UnparsableFile { ref method }) if method == "dbrda"
        ));
    }

    #[test]
    fn test_malformed_significance() {
        let lines = ["Constrained 0.8901 0.2027 1", "Significance: p = 0.01"];
        assert!(matches!(
            parse_dbrda(&lines),
            Err(CompareError::UnparsableLine { .. })
        ));
    }
}
