//! Comparison tables across studies, depths, metrics, categories and
//! perturbations.
//!
//! A [`ResultsTable`] holds one [`StatsResults`] per cell and method. Failures
//! are contained per cell: a result file that cannot be read or parsed marks
//! that cell/method as failed (rendered as "Empty results") and the rest of
//! the table is still filled in.

use crate::config::StudyConfig;
use crate::data::{ParsedStatResult, StatsResults};
use crate::error::{CompareError, Result};
use crate::method::StatMethod;
use crate::parse::read_lines;
use crate::stats::{correlation_t_test, CorrelationKind};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Placeholder for a method with no results in a cell.
pub const NOT_AVAILABLE: &str = "N/A";

/// Coordinates of one cell of the comparison table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub study: String,
    pub depth: u32,
    pub metric: String,
    pub category: String,
    /// Perturbation directory name, e.g. `original` or `subset_20`.
    pub perturbation: String,
}

impl CellKey {
    pub fn new(
        study: impl Into<String>,
        depth: u32,
        metric: impl Into<String>,
        category: impl Into<String>,
        perturbation: impl Into<String>,
    ) -> Self {
        Self {
            study: study.into(),
            depth,
            metric: metric.into(),
            category: category.into(),
            perturbation: perturbation.into(),
        }
    }

    /// Directory holding this cell's method subdirectories.
    pub fn directory(&self, root: &Path) -> PathBuf {
        root.join(&self.study)
            .join(self.depth.to_string())
            .join(&self.metric)
            .join(&self.category)
            .join(&self.perturbation)
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.study, self.depth, self.metric, self.category, self.perturbation
        )
    }
}

/// A result that could not be recorded.
#[derive(Debug)]
pub struct CellFailure {
    pub key: CellKey,
    pub method: StatMethod,
    pub error: CompareError,
}

/// Per-cell, per-method trial results.
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    methods: Vec<StatMethod>,
    cells: BTreeMap<CellKey, BTreeMap<StatMethod, StatsResults>>,
    failed: BTreeSet<(CellKey, StatMethod)>,
}

impl ResultsTable {
    /// An empty table with one column per method, in the given order.
    pub fn new(methods: Vec<StatMethod>) -> Self {
        Self {
            methods,
            ..Default::default()
        }
    }

    /// Read every configured result file under `root`.
    ///
    /// Files are expected at
    /// `{root}/{study}/{depth}/{metric}/{category}/{perturbation}/{method}/{trial}/{method}_results.txt`.
    /// Missing or malformed files are contained; they are returned alongside
    /// the table.
    pub fn load_tree<P: AsRef<Path>>(root: P, config: &StudyConfig) -> (Self, Vec<CellFailure>) {
        let root = root.as_ref();
        let mut table = Self::new(config.methods.clone());
        let mut failures = Vec::new();

        for study in &config.studies {
            for &depth in &study.depths {
                for metric in &study.metrics {
                    for category in &study.categories {
                        for perturbation in &config.perturbations {
                            let key = CellKey::new(
                                &study.name,
                                depth,
                                metric,
                                category,
                                perturbation.directory_name(),
                            );
                            table.load_cell(&key, root, config.num_trials, &mut failures);
                        }
                    }
                }
            }
        }

        debug!(
            cells = table.len(),
            failures = failures.len(),
            "loaded results tree"
        );
        (table, failures)
    }

    fn load_cell(&mut self, key: &CellKey, root: &Path, num_trials: usize, failures: &mut Vec<CellFailure>) {
        let cell_dir = key.directory(root);
        for method in self.methods.clone() {
            for trial in 0..num_trials {
                let path = cell_dir
                    .join(method.directory_name())
                    .join(trial.to_string())
                    .join(method.results_file_name());
                let outcome = match read_lines(&path) {
                    Ok(lines) => self.record_lines(key.clone(), method, &lines),
                    Err(e) => {
                        self.mark_failed(key.clone(), method);
                        Err(e)
                    }
                };
                if let Err(error) = outcome {
                    warn!("{} {} trial {} ({}): {}", key, method, trial, path.display(), error);
                    failures.push(CellFailure {
                        key: key.clone(),
                        method,
                        error,
                    });
                }
            }
        }
    }

    /// Parse one result file into the cell.
    ///
    /// On error the cell/method is reset to empty and later results for it
    /// are ignored; the error is returned for reporting.
    pub fn record_lines<S: AsRef<str>>(&mut self, key: CellKey, method: StatMethod, lines: &[S]) -> Result<()> {
        match method.parse(lines) {
            Ok(result) => self.record(key, method, result),
            Err(e) => {
                self.mark_failed(key, method);
                Err(e)
            }
        }
    }

    /// Add a parsed or computed result to the cell.
    ///
    /// A result without a p-value, or whose effect size disagrees with earlier
    /// trials, fails the cell/method as in [`record_lines`](Self::record_lines).
    pub fn record(&mut self, key: CellKey, method: StatMethod, result: ParsedStatResult) -> Result<()> {
        self.ensure_column(method);
        if self.failed.contains(&(key.clone(), method)) {
            debug!("{} {}: skipping result for failed cell", key, method);
            return Ok(());
        }

        let entry = self
            .cells
            .entry(key.clone())
            .or_default()
            .entry(method)
            .or_default();
        if let Err(e) = entry.add_parsed(&result) {
            self.mark_failed(key, method);
            return Err(e);
        }
        Ok(())
    }

    fn mark_failed(&mut self, key: CellKey, method: StatMethod) {
        self.ensure_column(method);
        self.cells
            .entry(key.clone())
            .or_default()
            .insert(method, StatsResults::new());
        self.failed.insert((key, method));
    }

    fn ensure_column(&mut self, method: StatMethod) {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
    }

    /// Methods in column order.
    pub fn methods(&self) -> &[StatMethod] {
        &self.methods
    }

    /// Results of `method` in the cell at `key`.
    pub fn get(&self, key: &CellKey, method: StatMethod) -> Option<&StatsResults> {
        self.cells.get(key)?.get(&method)
    }

    /// Whether `method` failed in the cell at `key`.
    pub fn is_failed(&self, key: &CellKey, method: StatMethod) -> bool {
        self.failed.contains(&(key.clone(), method))
    }

    /// Cell keys in table order.
    pub fn keys(&self) -> impl Iterator<Item = &CellKey> {
        self.cells.keys()
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Write one row per cell and one column per method.
    ///
    /// Each method column renders its [`StatsResults`]; a method with no
    /// entry in the cell is written as `N/A`.
    pub fn write_comparison_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        write!(writer, "Study\tDepth\tMetric\tCategory\tPerturbation")?;
        for method in &self.methods {
            write!(writer, "\t{}", method.display_name())?;
        }
        writeln!(writer)?;

        for (key, results) in &self.cells {
            write!(
                writer,
                "{}\t{}\t{}\t{}\t{}",
                key.study, key.depth, key.metric, key.category, key.perturbation
            )?;
            for method in &self.methods {
                match results.get(method) {
                    Some(stats) => write!(writer, "\t{}", stats)?,
                    None => write!(writer, "\t{}", NOT_AVAILABLE)?,
                }
            }
            writeln!(writer)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Correlation of effect sizes between every pair of methods, over the
    /// cells where both are populated.
    pub fn method_correlations(&self, kind: CorrelationKind) -> Result<MethodCorrelation> {
        let m = self.methods.len();
        let mut coefficients = DMatrix::from_element(m, m, f64::NAN);
        let mut p_values = DMatrix::from_element(m, m, f64::NAN);
        let mut n_cells = DMatrix::from_element(m, m, 0usize);

        for i in 0..m {
            for j in i..m {
                let (x, y) = self.paired_effect_sizes(self.methods[i], self.methods[j]);
                let n = x.len();
                let (r, p) = if n < 2 {
                    (f64::NAN, f64::NAN)
                } else {
                    let r = kind.compute(&x, &y)?;
                    (r, correlation_t_test(r, n).unwrap_or(f64::NAN))
                };
                for (a, b) in [(i, j), (j, i)] {
                    coefficients[(a, b)] = r;
                    p_values[(a, b)] = p;
                    n_cells[(a, b)] = n;
                }
            }
        }

        Ok(MethodCorrelation {
            methods: self.methods.clone(),
            kind,
            coefficients,
            p_values,
            n_cells,
        })
    }

    fn paired_effect_sizes(&self, a: StatMethod, b: StatMethod) -> (Vec<f64>, Vec<f64>) {
        self.cells
            .values()
            .filter_map(|results| {
                let x = results.get(&a)?.effect_size()?;
                let y = results.get(&b)?.effect_size()?;
                Some((x, y))
            })
            .unzip()
    }
}

/// Pairwise correlation of method effect sizes.
#[derive(Debug, Clone)]
pub struct MethodCorrelation {
    /// Row and column labels.
    pub methods: Vec<StatMethod>,
    pub kind: CorrelationKind,
    /// Correlation coefficients; NaN where fewer than two cells are shared.
    pub coefficients: DMatrix<f64>,
    /// Two-sided parametric p-values.
    pub p_values: DMatrix<f64>,
    /// Number of shared populated cells.
    pub n_cells: DMatrix<usize>,
}

impl MethodCorrelation {
    /// Write the coefficient matrix with method labels, followed by the
    /// p-value matrix.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        for (title, matrix) in [("coefficient", &self.coefficients), ("p-value", &self.p_values)] {
            write!(writer, "{:?} {}", self.kind, title)?;
            for method in &self.methods {
                write!(writer, "\t{}", method.display_name())?;
            }
            writeln!(writer)?;
            for (i, method) in self.methods.iter().enumerate() {
                write!(writer, "{}", method.display_name())?;
                for j in 0..self.methods.len() {
                    write!(writer, "\t{}", matrix[(i, j)])?;
                }
                writeln!(writer)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::too_few_iters;
    use approx::assert_relative_eq;

    fn key(category: &str) -> CellKey {
        CellKey::new("whole_body", 146, "unweighted_unifrac", category, "original")
    }

    fn anosim_lines(r: f64, p: f64) -> Vec<String> {
        StatMethod::Anosim
            .format(&ParsedStatResult::new(r, p), 999)
            .unwrap()
    }

    #[test]
    fn test_record_trials() {
        let mut table = ResultsTable::new(vec![StatMethod::Anosim]);
        table.record_lines(key("SEX"), StatMethod::Anosim, &anosim_lines(0.5, 0.001)).unwrap();
        table.record_lines(key("SEX"), StatMethod::Anosim, &anosim_lines(0.5, 0.03)).unwrap();

        let stats = table.get(&key("SEX"), StatMethod::Anosim).unwrap();
        assert_eq!(stats.p_values(), &[0.001, 0.03]);
        assert_eq!(stats.to_string(), "0.50; ****, **");
    }

    #[test]
    fn test_parse_failure_is_contained() {
        let mut table = ResultsTable::new(vec![StatMethod::Anosim, StatMethod::Permanova]);
        let bad = vec![format!("ANOSIM\t0.5\t{}\t9", too_few_iters(9))];
        assert!(table.record_lines(key("SEX"), StatMethod::Anosim, &bad).is_err());
        table.record(key("SEX"), StatMethod::Permanova, ParsedStatResult::new(2.1, 0.01)).unwrap();

        assert!(table.is_failed(&key("SEX"), StatMethod::Anosim));
        assert!(table.get(&key("SEX"), StatMethod::Anosim).unwrap().is_empty());
        assert_eq!(table.get(&key("SEX"), StatMethod::Permanova).unwrap().n_trials(), 1);

        // later trials do not revive a failed cell
        table.record_lines(key("SEX"), StatMethod::Anosim, &anosim_lines(0.5, 0.01)).unwrap();
        assert!(table.get(&key("SEX"), StatMethod::Anosim).unwrap().is_empty());
    }

    #[test]
    fn test_effect_size_drift_fails_cell() {
        let mut table = ResultsTable::new(vec![StatMethod::Anosim]);
        table.record(key("SEX"), StatMethod::Anosim, ParsedStatResult::new(0.5, 0.01)).unwrap();
        let err = table
            .record(key("SEX"), StatMethod::Anosim, ParsedStatResult::new(0.6, 0.01))
            .unwrap_err();
        assert!(matches!(err, CompareError::Consistency { .. }));
        assert!(table.get(&key("SEX"), StatMethod::Anosim).unwrap().is_empty());
    }

    #[test]
    fn test_missing_p_value_fails_cell() {
        let mut table = ResultsTable::new(vec![StatMethod::Mantel]);
        let err = table
            .record(key("PH"), StatMethod::Mantel, ParsedStatResult::without_p_value(0.3))
            .unwrap_err();
        assert!(matches!(err, CompareError::MissingPValue));
    }

    #[test]
    fn test_comparison_tsv() {
        let mut table = ResultsTable::new(vec![StatMethod::Anosim, StatMethod::Adonis, StatMethod::Mrpp]);
        table.record(key("SEX"), StatMethod::Anosim, ParsedStatResult::new(0.25, 0.2)).unwrap();
        let _ = table.record_lines(key("SEX"), StatMethod::Adonis, &["garbage"]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comparison.tsv");
        table.write_comparison_tsv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Study\tDepth\tMetric\tCategory\tPerturbation\tANOSIM\tAdonis\tMRPP"
        );
        assert_eq!(
            lines[1],
            "whole_body\t146\tunweighted_unifrac\tSEX\toriginal\t0.25; x\tEmpty results\tN/A"
        );
    }

    #[test]
    fn test_method_correlations() {
        let mut table = ResultsTable::new(vec![StatMethod::Anosim, StatMethod::Permanova, StatMethod::Mrpp]);
        let anosim = [0.1, 0.2, 0.3, 0.4, 0.5];
        let permanova = [1.0, 2.0, 3.0, 4.0, 5.0];
        for (i, (a, f)) in anosim.iter().zip(&permanova).enumerate() {
            let k = key(&format!("C{}", i));
            table.record(k.clone(), StatMethod::Anosim, ParsedStatResult::new(*a, 0.01)).unwrap();
            table.record(k, StatMethod::Permanova, ParsedStatResult::new(*f, 0.01)).unwrap();
        }
        table.record(key("C0"), StatMethod::Mrpp, ParsedStatResult::new(0.1, 0.01)).unwrap();

        let corr = table.method_correlations(CorrelationKind::Pearson).unwrap();
        assert_relative_eq!(corr.coefficients[(0, 1)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(corr.coefficients[(1, 0)], 1.0, epsilon = 1e-12);
        assert!(corr.p_values[(0, 1)] < 1e-6);
        assert_eq!(corr.n_cells[(0, 1)], 5);

        // MRPP shares a single cell with the others
        assert_eq!(corr.n_cells[(0, 2)], 1);
        assert!(corr.coefficients[(0, 2)].is_nan());

        let spearman = table.method_correlations(CorrelationKind::Spearman).unwrap();
        assert_relative_eq!(spearman.coefficients[(0, 1)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cell_directory() {
        let dir = key("SEX").directory(Path::new("/results"));
        assert_eq!(
            dir,
            PathBuf::from("/results/whole_body/146/unweighted_unifrac/SEX/original")
        );
    }
}
