//! Data structures: distance matrices, sample metadata and results.

mod distance_matrix;
mod grouping;
mod metadata;
mod result;

pub use distance_matrix::DistanceMatrix;
pub use grouping::{Gradient, Grouping};
pub use metadata::{Metadata, Variable, VariableType};
pub use result::{
    format_p_value_as_asterisk, ParsedStatResult, Significance, StatsResults, EMPTY_RESULTS,
};
