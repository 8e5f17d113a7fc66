//! vegan `permutest.betadisper` (PERMDISP) output.
//!
//! ```text
//! No. of permutations: 999
//! ...
//! Response: Distances
//!           Df   Sum Sq  Mean Sq      F N.Perm Pr(>F)
//! Groups     1 0.003031 0.003031 0.1884    999  0.685
//! Residuals 14 0.225249 0.016089
//! ```

use super::float::{parse_float, parse_p_value, FloatBounds};
use super::split_at_sentinel;
use crate::data::ParsedStatResult;
use crate::error::{CompareError, Result};

const PERMUTATIONS_MARKER: &str = "No. of permutations:";

/// Parse PERMDISP output into `(F, p)`.
pub fn parse_permdisp<S: AsRef<str>>(lines: &[S]) -> Result<ParsedStatResult> {
    let line = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .skip_while(|l| !l.starts_with(PERMUTATIONS_MARKER))
        .find(|l| l.starts_with("Groups"))
        .ok_or_else(|| CompareError::unparsable_file("permdisp"))?;

    let (tokens, too_few_iters) = split_at_sentinel(line);
    let p_token = match (too_few_iters, tokens.len()) {
        (true, 6) => None,
        (false, 7) | (false, 8) => Some(tokens[6]),
        _ => return Err(CompareError::unparsable_line(line)),
    };

    let effect_size = parse_float(tokens[4], FloatBounds::unbounded())?;
    let p_value = p_token.map(parse_p_value).transpose()?;
    Ok(ParsedStatResult {
        effect_size,
        p_value,
    })
}
