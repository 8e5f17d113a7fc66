//! Parsers for the text results written by external statistical tools.
//!
//! Each parser takes the lines of one result file and returns a
//! [`ParsedStatResult`](crate::data::ParsedStatResult). The layouts are those
//! written by the QIIME comparison scripts and by the vegan/ape R functions
//! they wrap; any drift in those layouts must surface as
//! [`CompareError::UnparsableLine`] or [`CompareError::UnparsableFile`] rather
//! than as wrong numbers.

pub mod adonis;
pub mod anosim;
pub mod dbrda;
pub mod float;
pub mod mantel;
pub mod morans_i;
pub mod mrpp;
pub mod ordination;
pub mod permdisp;

pub use adonis::parse_adonis;
pub use anosim::{format_anosim, parse_anosim};
pub use dbrda::parse_dbrda;
pub use float::{parse_correlation, parse_float, parse_p_value, FloatBounds};
pub use mantel::{parse_mantel, parse_partial_mantel, MantelRow};
pub use morans_i::parse_morans_i;
pub use mrpp::parse_mrpp;
pub use ordination::{format_ordination_correlation, parse_ordination_correlation};
pub use permdisp::parse_permdisp;

use crate::error::{CompareError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Written in place of a p-value when too few permutations were run.
pub const TOO_FEW_ITERS: &str = "Too few iters to compute p-value";

/// Read a result file into lines.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(CompareError::from)
}

/// Text written for a p-value that could not be computed.
pub fn too_few_iters(permutations: usize) -> String {
    format!("{} (num_iters={})", TOO_FEW_ITERS, permutations)
}

/// Last line that is not blank, trimmed.
pub(crate) fn last_non_empty<S: AsRef<str>>(lines: &[S]) -> Option<&str> {
    lines
        .iter()
        .map(|l| l.as_ref().trim())
        .rev()
        .find(|l| !l.is_empty())
}

/// Whitespace tokens of a result line, cut at the "too few iterations"
/// sentinel. The flag is true when the sentinel was found; the tokens are then
/// the ones written before it.
pub(crate) fn split_at_sentinel(line: &str) -> (Vec<&str>, bool) {
    match line.find(TOO_FEW_ITERS) {
        Some(pos) => (line[..pos].split_whitespace().collect(), true),
        None => (line.split_whitespace().collect(), false),
    }
}

/// Parse a p-value token, mapping the "too few iterations" sentinel to `None`.
pub(crate) fn parse_optional_p_value(token: &str) -> Result<Option<f64>> {
    if token.contains(TOO_FEW_ITERS) {
        return Ok(None);
    }
    parse_p_value(token).map(Some)
}

/// Format an optional p-value the way the tools write it.
pub(crate) fn format_optional_p_value(p_value: Option<f64>, permutations: usize) -> String {
    match p_value {
        Some(p) => p.to_string(),
        None => too_few_iters(permutations),
    }
}
