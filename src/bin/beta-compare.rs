//! beta-compare - compare beta-diversity association statistics
//!
//! Command-line interface for parsing method result files, running the
//! in-process permutation tests and summarizing results across studies.

use beta_compare::aggregate::ResultsTable;
use beta_compare::config::StudyConfig;
use beta_compare::data::{DistanceMatrix, Gradient, Grouping, Metadata, ParsedStatResult};
use beta_compare::error::{CompareError, Result};
use beta_compare::method::StatMethod;
use beta_compare::parse::{read_lines, MantelRow};
use beta_compare::stats::{
    anosim_with_config, mantel_with_config, permanova_with_config, CorrelationKind, PermutationConfig,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Output format for parsed results.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Tab-separated effect size and p-value
    Text,
    /// JSON object
    Json,
}

/// Compare beta-diversity association statistics
#[derive(Parser)]
#[command(name = "beta-compare")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Permutation settings shared by the test subcommands.
#[derive(Args, Debug)]
struct PermutationArgs {
    /// Number of permutations
    #[arg(short = 'n', long, default_value = "999")]
    permutations: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Run permutations in parallel
    #[arg(long)]
    parallel: bool,
}

impl From<&PermutationArgs> for PermutationConfig {
    fn from(args: &PermutationArgs) -> Self {
        PermutationConfig {
            n_permutations: args.permutations,
            seed: args.seed,
            parallel: args.parallel,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the effect size and p-value from a method's result file
    Parse {
        /// Method that wrote the file (e.g., anosim, adonis, partial_mantel)
        #[arg(short, long)]
        method: StatMethod,

        /// Result file
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Run ANOSIM on a distance matrix and a mapping file category
    Anosim {
        /// Distance matrix TSV
        #[arg(short, long)]
        dm: PathBuf,

        /// QIIME mapping file
        #[arg(short, long)]
        map: PathBuf,

        /// Categorical mapping file column
        #[arg(short, long)]
        category: String,

        #[command(flatten)]
        permutation: PermutationArgs,
    },

    /// Run PERMANOVA on a distance matrix and a mapping file category
    Permanova {
        /// Distance matrix TSV
        #[arg(short, long)]
        dm: PathBuf,

        /// QIIME mapping file
        #[arg(short, long)]
        map: PathBuf,

        /// Categorical mapping file column
        #[arg(short, long)]
        category: String,

        #[command(flatten)]
        permutation: PermutationArgs,
    },

    /// Run a Mantel test between two distance matrices, or between a
    /// distance matrix and a numeric mapping file category
    Mantel {
        /// First distance matrix TSV
        #[arg(long)]
        dm1: PathBuf,

        /// Second distance matrix TSV
        #[arg(long, conflicts_with_all = ["map", "category"])]
        dm2: Option<PathBuf>,

        /// QIIME mapping file (with --category, instead of --dm2)
        #[arg(short, long, requires = "category")]
        map: Option<PathBuf>,

        /// Numeric mapping file column
        #[arg(short, long, requires = "map")]
        category: Option<String>,

        #[command(flatten)]
        permutation: PermutationArgs,
    },

    /// Collect result files into a comparison table
    Summarize {
        /// Study configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Root directory of the results tree
        #[arg(short, long)]
        results: PathBuf,

        /// Output path for the comparison TSV
        #[arg(short, long)]
        output: PathBuf,

        /// Also write method-by-method effect size correlations here
        #[arg(long)]
        correlations: Option<PathBuf>,

        /// Use Spearman instead of Pearson correlation
        #[arg(long, requires = "correlations")]
        spearman: bool,
    },

    /// Write an example study configuration
    Example {
        /// Output path for the YAML file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            method,
            file,
            format,
        } => cmd_parse(method, &file, format),

        Commands::Anosim {
            dm,
            map,
            category,
            permutation,
        } => cmd_group_test(StatMethod::Anosim, &dm, &map, &category, &permutation),

        Commands::Permanova {
            dm,
            map,
            category,
            permutation,
        } => cmd_group_test(StatMethod::Permanova, &dm, &map, &category, &permutation),

        Commands::Mantel {
            dm1,
            dm2,
            map,
            category,
            permutation,
        } => cmd_mantel(&dm1, dm2.as_deref(), map.as_deref(), category.as_deref(), &permutation),

        Commands::Summarize {
            config,
            results,
            output,
            correlations,
            spearman,
        } => cmd_summarize(&config, &results, &output, correlations.as_deref(), spearman),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(method: StatMethod, file: &Path, format: OutputFormat) -> Result<()> {
    let lines = read_lines(file)?;
    let result = method.parse(&lines)?;

    match format {
        OutputFormat::Text => println!("{}", result),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "method": method.name(),
                "file": file.display().to_string(),
                "effect_size": result.effect_size,
                "p_value": result.p_value,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

fn cmd_group_test(
    method: StatMethod,
    dm_path: &Path,
    map_path: &Path,
    category: &str,
    args: &PermutationArgs,
) -> Result<()> {
    let dm = DistanceMatrix::from_tsv(dm_path)?;
    let metadata = Metadata::from_mapping_file(map_path)?;
    let grouping = Grouping::from_metadata(&metadata, category, &dm)?;
    eprintln!(
        "{}: {} samples in {} groups of '{}'",
        method,
        dm.n_samples(),
        grouping.n_groups(),
        category
    );

    let config = PermutationConfig::from(args);
    let outcome = match method {
        StatMethod::Permanova => permanova_with_config(&dm, &grouping, &config)?,
        _ => anosim_with_config(&dm, &grouping, &config)?,
    };

    let result = ParsedStatResult::from(outcome);
    let lines = method.format(&result, outcome.n_permutations).ok_or_else(|| {
        CompareError::InvalidParameter(format!("{} results cannot be written", method))
    })?;
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_mantel(
    dm1_path: &Path,
    dm2_path: Option<&Path>,
    map_path: Option<&Path>,
    category: Option<&str>,
    args: &PermutationArgs,
) -> Result<()> {
    let dm1 = DistanceMatrix::from_tsv(dm1_path)?;
    let (dm2, dm2_name) = match (dm2_path, map_path, category) {
        (Some(path), _, _) => (DistanceMatrix::from_tsv(path)?, path.display().to_string()),
        (None, Some(map), Some(category)) => {
            let metadata = Metadata::from_mapping_file(map)?;
            let gradient = Gradient::from_metadata(&metadata, category, &dm1)?;
            (
                gradient.to_distance_matrix(dm1.sample_ids().to_vec())?,
                category.to_string(),
            )
        }
        _ => {
            return Err(CompareError::InvalidParameter(
                "Either --dm2 or --map with --category is required".to_string(),
            ))
        }
    };

    let config = PermutationConfig::from(args);
    let outcome = mantel_with_config(&dm1, &dm2, &config)?;

    let n = dm1.n_samples();
    let dm1_name = dm1_path.display().to_string();
    let row = MantelRow {
        dm1: &dm1_name,
        dm2: &dm2_name,
        control_dm: None,
        n_entries: n * n.saturating_sub(1) / 2,
        permutations: outcome.n_permutations,
        tail_type: "greater",
    };
    for line in row.format(&outcome.into()) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_summarize(
    config_path: &Path,
    results_root: &Path,
    output_path: &Path,
    correlations_path: Option<&Path>,
    spearman: bool,
) -> Result<()> {
    eprintln!("Loading study configuration from {:?}...", config_path);
    let config = StudyConfig::from_file(config_path)?;

    eprintln!("Reading results under {:?}...", results_root);
    let (table, failures) = ResultsTable::load_tree(results_root, &config);

    eprintln!("Writing comparison table to {:?}...", output_path);
    table.write_comparison_tsv(output_path)?;

    if let Some(path) = correlations_path {
        let kind = if spearman {
            CorrelationKind::Spearman
        } else {
            CorrelationKind::Pearson
        };
        let correlations = table.method_correlations(kind)?;
        eprintln!("Writing {:?} method correlations to {:?}...", kind, path);
        correlations.to_tsv(path)?;
    }

    eprintln!(
        "Done! {} cells, {} methods, {} unreadable result files",
        table.len(),
        table.methods().len(),
        failures.len()
    );
    Ok(())
}

fn cmd_example(output_path: &Path) -> Result<()> {
    let yaml = StudyConfig::example().to_yaml()?;
    std::fs::write(output_path, yaml)?;
    eprintln!("Wrote example configuration to {:?}", output_path);
    Ok(())
}
