//! Beta-diversity method comparison library
//!
//! Parses the result files written by distance-based statistical methods,
//! computes ANOSIM, PERMANOVA and Mantel tests with permutation p-values, and
//! aggregates repeated trials into comparison tables.
//!
//! # Overview
//!
//! - **parse**: One parser per result-file layout (ANOSIM/PERMANOVA, adonis,
//!   MRPP, db-RDA, PERMDISP, Mantel, partial Mantel, Moran's I, ordination
//!   correlation), built on a range-checked float parser
//! - **method**: The [`StatMethod`](method::StatMethod) descriptor tying a
//!   method to its result layout
//! - **data**: Distance matrices, mapping files, groupings and the
//!   [`StatsResults`](data::StatsResults) trial accumulator
//! - **stats**: Permutation tests and correlation helpers
//! - **aggregate**: Comparison tables across studies and perturbations
//! - **config**: YAML study configuration
//!
//! # Example
//!
//! ```no_run
//! use beta_compare::prelude::*;
//!
//! let dm = DistanceMatrix::from_tsv("unweighted_unifrac_dm.txt").unwrap();
//! let metadata = Metadata::from_mapping_file("map.txt").unwrap();
//! let grouping = Grouping::from_metadata(&metadata, "BODY_SITE", &dm).unwrap();
//!
//! let outcome = anosim_with_config(&dm, &grouping, &PermutationConfig::default()).unwrap();
//! let mut results = StatsResults::new();
//! results.add_result(outcome.statistic, outcome.p_value).unwrap();
//! println!("{}", results);
//! ```

pub mod aggregate;
pub mod config;
pub mod data;
pub mod error;
pub mod method;
pub mod parse;
pub mod stats;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::aggregate::{CellKey, MethodCorrelation, ResultsTable};
    pub use crate::config::{Perturbation, StudyConfig, StudySpec};
    pub use crate::data::{
        format_p_value_as_asterisk, DistanceMatrix, Gradient, Grouping, Metadata,
        ParsedStatResult, Significance, StatsResults,
    };
    pub use crate::error::{CompareError, Result};
    pub use crate::method::{CategoryKind, StatMethod};
    pub use crate::parse::{parse_float, read_lines, FloatBounds};
    pub use crate::stats::{
        anosim, anosim_test, anosim_with_config, mantel, mantel_test, mantel_with_config,
        permanova, permanova_test, permanova_with_config, CorrelationKind, PermutationConfig,
        PermutationOutcome, Permute, SeededShuffle,
    };
}
