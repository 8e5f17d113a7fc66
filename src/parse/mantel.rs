//! Mantel and partial Mantel result tables.
//!
//! ```text
//! DM1	DM2	Number of entries	Mantel r statistic	p-value	Number of permutations	Tail type
//! dm1.txt	dm2.txt	16	0.2500	0.01	999	two sided
//! ```
//!
//! The partial Mantel table has an extra control-matrix column after `DM2`.

use super::float::{parse_float, FloatBounds};
use super::{format_optional_p_value, last_non_empty, parse_optional_p_value};
use crate::data::ParsedStatResult;
use crate::error::{CompareError, Result};

const MANTEL_FIELDS: usize = 7;
const PARTIAL_MANTEL_FIELDS: usize = 8;

/// Parse a Mantel table into `(r, p)`.
///
/// An `r` of NaN (e.g. one matrix is constant) is not an error: the result is
/// forced to `(0.0, 1.0)` whatever p-value the file reports.
pub fn parse_mantel<S: AsRef<str>>(lines: &[S]) -> Result<ParsedStatResult> {
    let fields = result_fields(lines, MANTEL_FIELDS, "mantel")?;

    let effect_size = parse_float(fields[3], FloatBounds::between(-1.0, 1.0).allowing_nan())?;
    if effect_size.is_nan() {
        return Ok(ParsedStatResult::new(0.0, 1.0));
    }

    let p_value = parse_optional_p_value(fields[4])?;
    Ok(ParsedStatResult {
        effect_size,
        p_value,
    })
}

/// Parse a partial Mantel table into `(r, p)`.
pub fn parse_partial_mantel<S: AsRef<str>>(lines: &[S]) -> Result<ParsedStatResult> {
    let fields = result_fields(lines, PARTIAL_MANTEL_FIELDS, "partial_mantel")?;

    let effect_size = parse_float(fields[4], FloatBounds::between(-1.0, 1.0))?;
    let p_value = parse_optional_p_value(fields[5])?;
    Ok(ParsedStatResult {
        effect_size,
        p_value,
    })
}

fn result_fields<'a, S: AsRef<str>>(
    lines: &'a [S],
    n_fields: usize,
    method: &str,
) -> Result<Vec<&'a str>> {
    let line = last_non_empty(lines).ok_or_else(|| CompareError::unparsable_file(method))?;
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != n_fields {
        return Err(CompareError::unparsable_line(line));
    }
    Ok(fields)
}

/// One row of a (partial) Mantel table, for writing results in the same
/// layout the comparison scripts use.
#[derive(Debug, Clone)]
pub struct MantelRow<'a> {
    pub dm1: &'a str,
    pub dm2: &'a str,
    /// Control matrix; `Some` makes this a partial Mantel row.
    pub control_dm: Option<&'a str>,
    pub n_entries: usize,
    pub permutations: usize,
    pub tail_type: &'a str,
}

impl MantelRow<'_> {
    /// Header and result line.
    pub fn format(&self, result: &ParsedStatResult) -> Vec<String> {
        let p = format_optional_p_value(result.p_value, self.permutations);
        match self.control_dm {
            None => vec![
                "DM1\tDM2\tNumber of entries\tMantel r statistic\tp-value\tNumber of permutations\tTail type".to_string(),
                format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    self.dm1, self.dm2, self.n_entries, result.effect_size, p, self.permutations, self.tail_type
                ),
            ],
            Some(cdm) => vec![
                "DM1\tDM2\tCDM\tNumber of entries\tMantel r statistic\tp-value\tNumber of permutations\tTail type".to_string(),
                format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    self.dm1, self.dm2, cdm, self.n_entries, result.effect_size, p, self.permutations, self.tail_type
                ),
            ],
        }
    }
}
