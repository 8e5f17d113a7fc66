//! vegan `adonis` output.
//!
//! The result row is the model term line of the ANOVA table:
//!
//! ```text
//!                                 Df SumsOfSqs MeanSqs F.Model      R2 Pr(>F)
//! qiime.data$map[[opts$category]]  1    0.8901 0.89006  3.5647 0.20273   0.01 **
//! Residuals                       14    3.4956 0.24969         0.79727
//! ```
//!
//! R² and p-value are the last two numbers; a significance marker may trail.

use super::float::{parse_float, parse_p_value, FloatBounds};
use super::split_at_sentinel;
use crate::data::ParsedStatResult;
use crate::error::{CompareError, Result};

/// First token of the model term row.
pub const MODEL_TOKEN: &str = "qiime.data$map[[opts$category]]";

/// Parse adonis output into `(R², p)`.
pub fn parse_adonis<S: AsRef<str>>(lines: &[S]) -> Result<ParsedStatResult> {
    let line = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .find(|l| l.starts_with(MODEL_TOKEN))
        .ok_or_else(|| CompareError::unparsable_file("adonis"))?;

    // R² is the sixth token; the p-value (or the sentinel) follows it
    let (tokens, too_few_iters) = split_at_sentinel(line);
    let p_token = match (too_few_iters, tokens.len()) {
        (true, 6) => None,
        (false, 7) | (false, 8) => Some(tokens[6]),
        _ => return Err(CompareError::unparsable_line(line)),
    };

    let effect_size = parse_float(tokens[5], FloatBounds::between(0.0, 1.0))?;
    let p_value = p_token.map(parse_p_value).transpose()?;
    Ok(ParsedStatResult {
        effect_size,
        p_value,
    })
}
