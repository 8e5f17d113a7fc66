//! Statistical methods whose results can be compared.

use crate::data::ParsedStatResult;
use crate::error::Result;
use crate::parse;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of metadata category a method tests against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKind {
    /// Categorical variable defining groups of samples.
    Grouping,
    /// Numeric per-sample variable.
    Gradient,
}

/// A statistical method and the layout of its result file.
///
/// Two descriptors are equal iff they name the same method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatMethod {
    Anosim,
    Permanova,
    Adonis,
    Mrpp,
    Dbrda,
    Permdisp,
    Mantel,
    PartialMantel,
    MoransI,
    OrdinationCorrelation,
}

impl StatMethod {
    /// Every method, in table-column order.
    pub const ALL: [StatMethod; 10] = [
        Self::Anosim,
        Self::Permanova,
        Self::Adonis,
        Self::Mrpp,
        Self::Dbrda,
        Self::Permdisp,
        Self::Mantel,
        Self::PartialMantel,
        Self::MoransI,
        Self::OrdinationCorrelation,
    ];

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Anosim => "anosim",
            Self::Permanova => "permanova",
            Self::Adonis => "adonis",
            Self::Mrpp => "mrpp",
            Self::Dbrda => "dbrda",
            Self::Permdisp => "permdisp",
            Self::Mantel => "mantel",
            Self::PartialMantel => "partial_mantel",
            Self::MoransI => "morans_i",
            Self::OrdinationCorrelation => "ordination_correlation",
        }
    }

    /// Name of the directory holding this method's result files.
    pub fn directory_name(&self) -> &'static str {
        match self {
            Self::OrdinationCorrelation => "best",
            _ => self.name(),
        }
    }

    /// Name of the result file inside [`directory_name`](Self::directory_name).
    pub fn results_file_name(&self) -> String {
        format!("{}_results.txt", self.directory_name())
    }

    /// Name used in tables and figures.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Anosim => "ANOSIM",
            Self::Permanova => "PERMANOVA",
            Self::Adonis => "Adonis",
            Self::Mrpp => "MRPP",
            Self::Dbrda => "db-RDA",
            Self::Permdisp => "PERMDISP",
            Self::Mantel => "Mantel",
            Self::PartialMantel => "Partial Mantel",
            Self::MoransI => "Moran's I",
            Self::OrdinationCorrelation => "Ordination correlation",
        }
    }

    /// Symbol of the reported effect size.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Anosim => "R",
            Self::Permanova | Self::Permdisp => "F",
            Self::Adonis | Self::Dbrda => "R²",
            Self::Mrpp => "A",
            Self::Mantel | Self::PartialMantel => "r",
            Self::MoransI => "I",
            Self::OrdinationCorrelation => "ρ",
        }
    }

    /// Which kind of category the method tests.
    pub fn category_kind(&self) -> CategoryKind {
        match self {
            Self::Mantel
            | Self::PartialMantel
            | Self::MoransI
            | Self::OrdinationCorrelation => CategoryKind::Gradient,
            _ => CategoryKind::Grouping,
        }
    }

    /// Parse the lines of one of this method's result files.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> Result<ParsedStatResult> {
        match self {
            Self::Anosim | Self::Permanova => parse::parse_anosim(lines, self.name()),
            Self::Adonis => parse::parse_adonis(lines),
            Self::Mrpp => parse::parse_mrpp(lines),
            Self::Dbrda => parse::parse_dbrda(lines),
            Self::Permdisp => parse::parse_permdisp(lines),
            Self::Mantel => parse::parse_mantel(lines),
            Self::PartialMantel => parse::parse_partial_mantel(lines),
            Self::MoransI => parse::parse_morans_i(lines),
            Self::OrdinationCorrelation => parse::parse_ordination_correlation(lines),
        }
    }

    /// Write `result` in this method's result-file layout, such that
    /// [`parse`](Self::parse) reads it back.
    ///
    /// `None` for the R-based methods, whose output has no writer, and for
    /// ANOSIM/PERMANOVA/ordination results without a p-value.
    pub fn format(&self, result: &ParsedStatResult, permutations: usize) -> Option<Vec<String>> {
        let mantel_row = |control_dm| parse::MantelRow {
            dm1: "dm1",
            dm2: "dm2",
            control_dm,
            n_entries: 0,
            permutations,
            tail_type: "two sided",
        };
        match self {
            Self::Anosim => Some(parse::format_anosim(
                "ANOSIM",
                "R statistic",
                result.effect_size,
                result.p_value?,
                permutations,
            )),
            Self::Permanova => Some(parse::format_anosim(
                "PERMANOVA",
                "pseudo-F statistic",
                result.effect_size,
                result.p_value?,
                permutations,
            )),
            Self::Mantel => Some(mantel_row(None).format(result)),
            Self::PartialMantel => Some(mantel_row(Some("cdm")).format(result)),
            Self::OrdinationCorrelation => Some(parse::format_ordination_correlation(
                result.effect_size,
                None,
                result.p_value?,
            )),
            Self::Adonis | Self::Mrpp | Self::Dbrda | Self::Permdisp | Self::MoransI => None,
        }
    }
}

impl fmt::Display for StatMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StatMethod {
    type Err = crate::error::CompareError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == key || m.directory_name() == key)
            .ok_or_else(|| {
                crate::error::CompareError::InvalidParameter(format!(
                    "Unknown method '{}'. Available: {}",
                    s,
                    Self::ALL.map(|m| m.name()).join(", ")
                ))
            })
    }
}
