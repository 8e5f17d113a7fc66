//! ape `Moran.I` output.
//!
//! ```text
//! $observed
//! [1] 0.1234
//!
//! $expected
//! [1] -0.0666
//!
//! $sd
//! [1] 0.0456
//!
//! $p.value
//! [1] 0.0123
//! ```

use super::float::{parse_float, FloatBounds};
use crate::data::ParsedStatResult;
use crate::error::{CompareError, Result};

const OBSERVED_MARKER: &str = "$observed";
const P_VALUE_MARKER: &str = "$p.value";

/// Parse Moran's I output into `(I, p)`.
///
/// `Moran.I` reports two-sided p-values that can exceed 1 (up to 2); those are
/// accepted and clamped to 1.
pub fn parse_morans_i<S: AsRef<str>>(lines: &[S]) -> Result<ParsedStatResult> {
    let mut effect_size = None;
    let mut p_value = None;

    let mut lines = lines.iter().map(|l| l.as_ref().trim());
    while let Some(line) = lines.next() {
        if line == OBSERVED_MARKER {
            let value = marker_value(lines.next(), line)?;
            effect_size = Some(parse_float(value, FloatBounds::between(-1.0, 1.0))?);
        } else if line == P_VALUE_MARKER {
            let value = marker_value(lines.next(), line)?;
            let p = parse_float(value, FloatBounds::between(0.0, 2.0))?;
            p_value = Some(p.min(1.0));
        }
    }

    match (effect_size, p_value) {
        (Some(effect_size), Some(p_value)) => Ok(ParsedStatResult::new(effect_size, p_value)),
        _ => Err(CompareError::unparsable_file("morans_i")),
    }
}

/// Value token of the `[1] <value>` line following a marker.
fn marker_value<'a>(next: Option<&'a str>, marker: &str) -> Result<&'a str> {
    let line = next.ok_or_else(|| CompareError::unparsable_line(marker))?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(CompareError::unparsable_line(line));
    }
    Ok(tokens[1])
}
