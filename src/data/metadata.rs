//! Sample metadata (QIIME mapping files).

use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A metadata value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variable {
    /// Categorical value (group label).
    Categorical(String),
    /// Numeric value (gradient).
    Continuous(f64),
    /// Empty or `NA`.
    Missing,
}

impl Variable {
    /// Check if this is a missing value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Variable::Missing)
    }

    /// Try to get as categorical string.
    pub fn as_categorical(&self) -> Option<&str> {
        match self {
            Variable::Categorical(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as continuous f64.
    pub fn as_continuous(&self) -> Option<f64> {
        match self {
            Variable::Continuous(v) => Some(*v),
            _ => None,
        }
    }

    /// Value as a group label; numeric values use their text form.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Variable::Categorical(s) => Some(s.clone()),
            Variable::Continuous(v) => Some(v.to_string()),
            Variable::Missing => None,
        }
    }
}

/// Inferred type of a metadata column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    Categorical,
    Continuous,
}

/// Per-sample metadata loaded from a mapping file.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    /// Sample IDs in file order.
    sample_ids: Vec<String>,
    /// Column names, excluding the sample ID column.
    column_names: Vec<String>,
    /// sample_id -> column_name -> value.
    data: HashMap<String, HashMap<String, Variable>>,
    column_types: HashMap<String, VariableType>,
}

fn is_missing_token(raw: &str) -> bool {
    raw.is_empty() || raw == "NA" || raw == "na"
}

impl Metadata {
    /// Load a mapping file.
    pub fn from_mapping_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Self::from_lines(&lines)
    }

    /// Parse mapping file lines.
    ///
    /// Expected format:
    /// - Header: `#SampleID` followed by column names (tab-delimited)
    /// - Other lines starting with `#` are comments
    /// - Rows: sample ID followed by values
    ///
    /// A column is continuous if every non-missing value parses as a number,
    /// otherwise categorical.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut lines = lines
            .iter()
            .map(|l| l.as_ref().trim_end_matches(['\r', '\n']))
            .filter(|l| !l.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| CompareError::EmptyData("Empty mapping file".to_string()))?;
        if !header.starts_with("#SampleID") {
            return Err(CompareError::unparsable_line(header));
        }
        let column_names: Vec<String> = header
            .split('\t')
            .skip(1)
            .map(|s| s.trim().to_string())
            .collect();
        if column_names.is_empty() {
            return Err(CompareError::EmptyData(
                "Mapping file must have at least one metadata column".to_string(),
            ));
        }

        let mut raw_data: Vec<(String, Vec<String>)> = Vec::new();
        for line in lines.filter(|l| !l.starts_with('#')) {
            let fields: Vec<&str> = line.split('\t').collect();
            let sample_id = fields[0].trim().to_string();
            let values = fields[1..].iter().map(|s| s.trim().to_string()).collect();
            raw_data.push((sample_id, values));
        }

        if raw_data.is_empty() {
            return Err(CompareError::EmptyData("No samples in mapping file".to_string()));
        }

        let mut column_types = HashMap::new();
        for (col_idx, col_name) in column_names.iter().enumerate() {
            let all_numeric = raw_data.iter().all(|(_, values)| {
                values
                    .get(col_idx)
                    .map_or(true, |v| is_missing_token(v) || v.parse::<f64>().is_ok())
            });
            let var_type = if all_numeric {
                VariableType::Continuous
            } else {
                VariableType::Categorical
            };
            column_types.insert(col_name.clone(), var_type);
        }

        let mut sample_ids = Vec::with_capacity(raw_data.len());
        let mut data = HashMap::new();
        for (sample_id, values) in raw_data {
            if data.contains_key(&sample_id) {
                return Err(CompareError::SampleMismatch(format!(
                    "Duplicate sample '{}' in mapping file",
                    sample_id
                )));
            }

            let mut sample_data = HashMap::new();
            for (col_idx, col_name) in column_names.iter().enumerate() {
                let var = match values.get(col_idx).map(String::as_str) {
                    None => Variable::Missing,
                    Some(raw) if is_missing_token(raw) => Variable::Missing,
                    Some(raw) => match column_types[col_name] {
                        VariableType::Continuous => raw
                            .parse::<f64>()
                            .map(Variable::Continuous)
                            .unwrap_or(Variable::Missing),
                        VariableType::Categorical => Variable::Categorical(raw.to_string()),
                    },
                };
                sample_data.insert(col_name.clone(), var);
            }
            sample_ids.push(sample_id.clone());
            data.insert(sample_id, sample_data);
        }

        Ok(Self {
            sample_ids,
            column_names,
            data,
            column_types,
        })
    }

    /// Sample IDs in order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Column names.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Get a value for a specific sample and column.
    pub fn get(&self, sample_id: &str, column: &str) -> Option<&Variable> {
        self.data.get(sample_id).and_then(|m| m.get(column))
    }

    /// Type of a column.
    pub fn column_type(&self, column: &str) -> Option<VariableType> {
        self.column_types.get(column).copied()
    }

    /// Check if a column exists.
    pub fn has_column(&self, column: &str) -> bool {
        self.column_types.contains_key(column)
    }

    /// Check if a sample exists.
    pub fn has_sample(&self, sample_id: &str) -> bool {
        self.data.contains_key(sample_id)
    }

    /// Values of `column` for the given samples, in that order.
    ///
    /// # Errors
    ///
    /// [`CompareError::MissingColumn`] for an unknown column and
    /// [`CompareError::SampleMismatch`] for a sample absent from the mapping.
    pub fn values_for(&self, column: &str, sample_ids: &[String]) -> Result<Vec<&Variable>> {
        if !self.has_column(column) {
            return Err(CompareError::MissingColumn(column.to_string()));
        }
        sample_ids
            .iter()
            .map(|sid| {
                self.get(sid, column).ok_or_else(|| {
                    CompareError::SampleMismatch(format!(
                        "Sample '{}' not found in metadata",
                        sid
                    ))
                })
            })
            .collect()
    }

    /// Distinct non-missing labels of a column, sorted.
    pub fn levels(&self, column: &str) -> Result<Vec<String>> {
        let values = self.values_for(column, &self.sample_ids)?;
        let mut levels: Vec<String> = values
            .iter()
            .filter_map(|v| v.as_label())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        levels.sort();
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_mapping_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "#SampleID\tTreatment\tDOB\tpH").unwrap();
        writeln!(file, "#Example mapping file").unwrap();
        writeln!(file, "PC.354\tControl\t20061218\t6.5").unwrap();
        writeln!(file, "PC.355\tControl\t20061218\tNA").unwrap();
        writeln!(file, "PC.607\tFast\t20071112\t7.1").unwrap();
        writeln!(file, "PC.636\tFast\t20080116\t7.4").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_mapping_file() {
        let file = create_mapping_file();
        let meta = Metadata::from_mapping_file(file.path()).unwrap();

        assert_eq!(meta.n_samples(), 4);
        assert_eq!(meta.sample_ids(), &["PC.354", "PC.355", "PC.607", "PC.636"]);
        assert_eq!(meta.column_names(), &["Treatment", "DOB", "pH"]);
        assert!(meta.has_sample("PC.607"));
    }

    #[test]
    fn test_column_types() {
        let file = create_mapping_file();
        let meta = Metadata::from_mapping_file(file.path()).unwrap();

        assert_eq!(meta.column_type("Treatment"), Some(VariableType::Categorical));
        assert_eq!(meta.column_type("pH"), Some(VariableType::Continuous));
        assert_eq!(meta.get("PC.636", "pH").unwrap().as_continuous(), Some(7.4));
        assert!(meta.get("PC.355", "pH").unwrap().is_missing());
    }

    #[test]
    fn test_levels() {
        let file = create_mapping_file();
        let meta = Metadata::from_mapping_file(file.path()).unwrap();
        assert_eq!(meta.levels("Treatment").unwrap(), vec!["Control", "Fast"]);
        assert!(matches!(
            meta.levels("Nope"),
            Err(CompareError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_values_for_unknown_sample() {
        let file = create_mapping_file();
        let meta = Metadata::from_mapping_file(file.path()).unwrap();
        let err = meta
            .values_for("Treatment", &["PC.999".to_string()])
            .unwrap_err();
        assert!(matches!(err, CompareError::SampleMismatch(_)));
    }

    #[test]
    fn test_header_required() {
        let lines = ["SampleID\tTreatment", "S1\tA"];
        assert!(matches!(
            Metadata::from_lines(&lines),
            Err(CompareError::UnparsableLine { .. })
        ));
    }

    #[test]
    fn test_duplicate_sample() {
        let lines = ["#SampleID\tTreatment", "S1\tA", "S1\tB"];
        assert!(Metadata::from_lines(&lines).is_err());
    }
}
