//! ANOSIM / PERMANOVA result tables.
//!
//! Layout (tab-delimited, the result is the last line):
//!
//! ```text
//! Method name	R statistic	p-value	Number of permutations
//! ANOSIM	0.463253142506	0.01	99
//! ```

use super::float::{parse_float, parse_p_value, FloatBounds};
use super::{last_non_empty, TOO_FEW_ITERS};
use crate::data::ParsedStatResult;
use crate::error::{CompareError, Result};

/// Parse an ANOSIM or PERMANOVA table. `method` names the tool in
/// [`CompareError::UnparsableFile`].
///
/// A p-value is required here: the "too few iterations" sentinel is an
/// [`CompareError::UnparsableLine`].
pub fn parse_anosim<S: AsRef<str>>(lines: &[S], method: &str) -> Result<ParsedStatResult> {
    let line = last_non_empty(lines).ok_or_else(|| CompareError::unparsable_file(method))?;

    let tokens: Vec<&str> = line.split('\t').collect();
    if tokens.len() != 4 || tokens[2].contains(TOO_FEW_ITERS) {
        return Err(CompareError::unparsable_line(line));
    }

    let effect_size = parse_float(tokens[1], FloatBounds::unbounded())?;
    let p_value = parse_p_value(tokens[2])?;
    Ok(ParsedStatResult::new(effect_size, p_value))
}

/// Write an ANOSIM/PERMANOVA table. `statistic_name` is the header of the
/// statistic column (`R statistic` or `pseudo-F statistic`).
pub fn format_anosim(
    method_name: &str,
    statistic_name: &str,
    effect_size: f64,
    p_value: f64,
    permutations: usize,
) -> Vec<String> {
    vec![
        format!(
            "Method name\t{}\tp-value\tNumber of permutations",
            statistic_name
        ),
        format!(
            "{}\t{}\t{}\t{}",
            method_name, effect_size, p_value, permutations
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::too_few_iters;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_anosim() {
        let lines = [
            "Method name\tR statistic\tp-value\tNumber of permutations",
            "ANOSIM\t0.463253142506\t0.01\t99",
        ];
        let result = parse_anosim(&lines, "anosim").unwrap();
        assert_relative_eq!(result.effect_size, 0.463253142506);
        assert_eq!(result.p_value, Some(0.01));
    }

    #[test]
    fn test_parse_permanova_trailing_blank_lines() {
        let lines = vec![
            "Method name\tpseudo-F statistic\tp-value\tNumber of permutations".to_string(),
            "PERMANOVA\t2.2975\t0.002\t999".to_string(),
            String::new(),
        ];
        let result = parse_anosim(&lines, "permanova").unwrap();
        assert_relative_eq!(result.effect_size, 2.2975);
        assert_eq!(result.p_value, Some(0.002));
    }

    #[test]
    fn test_too_few_iters_is_unparsable() {
        let line = format!("ANOSIM\t0.46\t{}\t5", too_few_iters(5));
        let err = parse_anosim(&[line.as_str()], "anosim").unwrap_err();
        assert!(matches!(err, CompareError::UnparsableLine { .. }));
    }

    #[test]
    fn test_wrong_token_count() {
        let err = parse_anosim(&["ANOSIM\t0.46\t0.01"], "anosim").unwrap_err();
        assert!(matches!(err, CompareError::UnparsableLine { ref line } if line == "ANOSIM\t0.46\t0.01"));
    }

    #[test]
    fn test_empty_input() {
        let lines: Vec<String> = Vec::new();
        let err = parse_anosim(&lines, "anosim").unwrap_err();
        assert!(matches!(err, CompareError::UnparsableFile { ref method } if method == "anosim"));
    }

    #[test]
    fn test_bad_p_value() {
        assert!(matches!(
            parse_anosim(&["ANOSIM\t0.46\t1.2\t99"], "anosim"),
            Err(CompareError::Range { .. })
        ));
        assert!(matches!(
            parse_anosim(&["ANOSIM\tabc\t0.2\t99"], "anosim"),
            Err(CompareError::Conversion { .. })
        ));
    }

    #[test]
    fn test_round_trip() {
        let lines = format_anosim("PERMANOVA", "pseudo-F statistic", 4.4, 0.5, 3);
        let result = parse_anosim(&lines, "permanova").unwrap();
        assert_relative_eq!(result.effect_size, 4.4);
        assert_eq!(result.p_value, Some(0.5));
    }
}
