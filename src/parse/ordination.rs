//! Correlation between an ordination axis and a gradient category.
//!
//! ```text
//! Correlation coefficient	Parametric p-value	Nonparametric p-value
//! 0.6582	0.0056	0.004
//! ```
//!
//! The nonparametric (permutation) p-value is required.

use super::float::{parse_correlation, parse_p_value};
use super::{last_non_empty, TOO_FEW_ITERS};
use crate::data::ParsedStatResult;
use crate::error::{CompareError, Result};

/// Parse an ordination correlation table into `(rho, p)`.
pub fn parse_ordination_correlation<S: AsRef<str>>(lines: &[S]) -> Result<ParsedStatResult> {
    let line = last_non_empty(lines)
        .ok_or_else(|| CompareError::unparsable_file("ordination_correlation"))?;

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 3 {
        return Err(CompareError::unparsable_line(line));
    }

    let effect_size = parse_correlation(fields[0])?;
    let p_token = fields[2].trim();
    if p_token.contains(TOO_FEW_ITERS) || p_token == "N/A" {
        return Err(CompareError::unparsable_line(line));
    }
    let p_value = parse_p_value(p_token)?;
    Ok(ParsedStatResult::new(effect_size, p_value))
}

/// Write an ordination correlation table.
pub fn format_ordination_correlation(
    effect_size: f64,
    parametric_p_value: Option<f64>,
    p_value: f64,
) -> Vec<String> {
    let parametric = parametric_p_value
        .map(|p| p.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    vec![
        "Correlation coefficient\tParametric p-value\tNonparametric p-value".to_string(),
        format!("{}\t{}\t{}", effect_size, parametric, p_value),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::too_few_iters;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse() {
        let lines = [
            "Correlation coefficient\tParametric p-value\tNonparametric p-value",
            "0.6582\t0.0056\t0.004",
        ];
        let result = parse_ordination_correlation(&lines).unwrap();
        assert_relative_eq!(result.effect_size, 0.6582);
        assert_eq!(result.p_value, Some(0.004));
    }

    #[test]
    fn test_missing_nonparametric_p_value() {
        let lines = ["0.6582\t0.0056\tN/A"];
        assert!(matches!(
            parse_ordination_correlation(&lines),
            Err(CompareError::UnparsableLine { .. })
        ));

        let line = format!("0.6582\t0.0056\t{}", too_few_iters(10));
        assert!(matches!(
            parse_ordination_correlation(&[line]),
            Err(CompareError::UnparsableLine { .. })
        ));
    }

    #[test]
    fn test_rho_out_of_range() {
        assert!(matches!(
            parse_ordination_correlation(&["1.6582\t0.0056\t0.004"]),
            Err(CompareError::Range { .. })
        ));
    }

    #[test]
    fn test_round_trip() {
        let lines = format_ordination_correlation(-0.25, None, 0.31);
        let result = parse_ordination_correlation(&lines).unwrap();
        assert_eq!(result, ParsedStatResult::new(-0.25, 0.31));
    }
}
