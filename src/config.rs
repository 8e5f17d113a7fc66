//! Study configuration: which result files make up a comparison run.
//!
//! ```yaml
//! name: beta-diversity comparison
//! studies:
//!   - name: whole_body
//!     depths: [146]
//!     metrics: [unweighted_unifrac, weighted_unifrac]
//!     categories: [BODY_SITE]
//! methods: [anosim, permanova, adonis]
//! perturbations:
//!   - original
//!   - !subset
//!     n_samples: 20
//! num_trials: 10
//! permutations:
//!   n_permutations: 999
//!   seed: 42
//!   parallel: false
//! ```

use crate::error::{CompareError, Result};
use crate::method::StatMethod;
use crate::stats::PermutationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One study and the result grid computed for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySpec {
    pub name: String,
    /// Rarefaction depths.
    pub depths: Vec<u32>,
    /// Beta diversity metrics.
    pub metrics: Vec<String>,
    /// Metadata categories tested.
    pub categories: Vec<String>,
}

/// How the input data was altered before the methods were run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perturbation {
    /// Unaltered data.
    Original,
    /// Category labels shuffled across samples.
    ShuffledLabels,
    /// Random subset of samples.
    Subset { n_samples: usize },
    /// Distances jittered by a relative noise level.
    Noise { level: f64 },
}

impl Perturbation {
    /// Directory holding results for this perturbation.
    pub fn directory_name(&self) -> String {
        match self {
            Self::Original => "original".to_string(),
            Self::ShuffledLabels => "shuffled_labels".to_string(),
            Self::Subset { n_samples } => format!("subset_{}", n_samples),
            Self::Noise { level } => format!("noise_{}", level),
        }
    }
}

/// Configuration of a comparison run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Name of the run.
    pub name: String,
    pub studies: Vec<StudySpec>,
    /// Methods to compare, in column order.
    pub methods: Vec<StatMethod>,
    #[serde(default = "default_perturbations")]
    pub perturbations: Vec<Perturbation>,
    /// Trials per cell; results live in directories `0..num_trials`.
    #[serde(default = "default_num_trials")]
    pub num_trials: usize,
    /// Settings for tests computed in-process.
    #[serde(default)]
    pub permutations: PermutationConfig,
}

fn default_perturbations() -> Vec<Perturbation> {
    vec![Perturbation::Original]
}

fn default_num_trials() -> usize {
    1
}

impl StudyConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(CompareError::from)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// A small configuration covering every method.
    pub fn example() -> Self {
        Self {
            name: "beta-diversity comparison".to_string(),
            studies: vec![StudySpec {
                name: "whole_body".to_string(),
                depths: vec![146],
                metrics: vec!["unweighted_unifrac".to_string(), "weighted_unifrac".to_string()],
                categories: vec!["BODY_SITE".to_string(), "SEX".to_string()],
            }],
            methods: StatMethod::ALL.to_vec(),
            perturbations: vec![
                Perturbation::Original,
                Perturbation::ShuffledLabels,
                Perturbation::Subset { n_samples: 20 },
            ],
            num_trials: 10,
            permutations: PermutationConfig::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.studies.is_empty() {
            return Err(CompareError::EmptyData("No studies configured".to_string()));
        }
        if self.methods.is_empty() {
            return Err(CompareError::EmptyData("No methods configured".to_string()));
        }
        if self.num_trials == 0 {
            return Err(CompareError::InvalidParameter(
                "num_trials must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
