//! Distance-based hypothesis tests and the correlation helpers they share.

pub mod anosim;
pub mod correlation;
pub mod mantel;
pub mod permanova;
pub mod permutation;
pub mod rank;

pub use anosim::{anosim, anosim_test, anosim_with_config, Anosim};
pub use correlation::{correlation_t_test, pearson, spearman, CorrelationKind};
pub use mantel::{mantel, mantel_test, mantel_with_config, Mantel};
pub use permanova::{permanova, permanova_test, permanova_with_config, Permanova};
pub use permutation::{
    permutation_p_value, permutation_test, rotate_left, PermutationConfig, PermutationOutcome,
    Permute, SeededShuffle, TestStatistic,
};
pub use rank::average_ranks;
