//! Error types for the beta-compare library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not convert '{token}' to a float")]
    Conversion { token: String },

    #[error("Value '{token}' is NaN")]
    Domain { token: String },

    #[error("Value {value} is outside the allowed range [{min}, {max}]")]
    Range { value: f64, min: f64, max: f64 },

    #[error("Unparsable line: '{line}'")]
    UnparsableLine { line: String },

    #[error("Could not find the required results in the {method} output")]
    UnparsableFile { method: String },

    #[error("Effect size {new} does not match previously recorded effect size {existing}")]
    Consistency { existing: f64, new: f64 },

    #[error("Result has no p-value (too few permutations to compute one)")]
    MissingPValue,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Sample ID mismatch: {0}")]
    SampleMismatch(String),

    #[error("Missing column '{0}' in metadata")]
    MissingColumn(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompareError {
    /// Whether this error came from reading a result file's contents, as opposed
    /// to I/O or caller misuse.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            Self::Conversion { .. }
                | Self::Domain { .. }
                | Self::Range { .. }
                | Self::UnparsableLine { .. }
                | Self::UnparsableFile { .. }
        )
    }

    pub(crate) fn unparsable_line(line: &str) -> Self {
        Self::UnparsableLine {
            line: line.to_string(),
        }
    }

    pub(crate) fn unparsable_file(method: &str) -> Self {
        Self::UnparsableFile {
            method: method.to_string(),
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, CompareError>;
