//! CLI entry point for dataset analysis, cleaning and regression training.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use datasmith_learning::{ModelTrainer, TrainingConfig, TrainingRequest};
use datasmith_processing::{
    AnalysisConfig, AnalysisRequest, Analyzer, DataCleaner, read_dataset, write_csv,
};
use polars::prelude::DataFrame;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    name = "datasmith",
    version,
    about = "Data-quality analysis, cleaning and regression training for tabular data",
    long_about = "Analyze, clean and model CSV, Parquet or JSON-records datasets.\n\n\
                  Reports are printed as pretty JSON on stdout; logs go to stderr.\n\n\
                  EXAMPLES:\n  \
                  # Full data-quality report\n  \
                  datasmith analyze -i data.csv\n\n  \
                  # Fill numeric gaps with the median and save the result\n  \
                  datasmith clean -i data.csv --method fill_median -o cleaned.csv\n\n  \
                  # Train a random forest\n  \
                  datasmith train -i data.csv --features area,rooms --target price --model random_forest"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce a data-quality report
    Analyze {
        /// Dataset to read (.csv, .parquet or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Restrict the analysis to these columns
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,

        /// Multiplier for the IQR outlier fences
        #[arg(long)]
        iqr_multiplier: Option<f64>,

        /// Absolute z-score above which a value is an outlier
        #[arg(long)]
        zscore_threshold: Option<f64>,
    },

    /// Apply one cleaning method
    Clean {
        /// Dataset to read (.csv, .parquet or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// drop_missing, fill_mean, fill_median, fill_mode, forward_fill,
        /// interpolate or drop_duplicates
        #[arg(short, long)]
        method: String,

        /// Write the cleaned dataset to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Train and evaluate a regression model
    Train {
        /// Dataset to read (.csv, .parquet or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Feature columns, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        features: Vec<String>,

        /// Target column
        #[arg(long)]
        target: String,

        /// linear_regression, random_forest or svm
        #[arg(long)]
        model: String,

        /// Seed for the split and the forest bootstraps
        #[arg(long)]
        seed: Option<u64>,

        /// Fraction of rows held out for testing
        #[arg(long)]
        test_size: Option<f64>,

        /// Minimum number of complete rows
        #[arg(long)]
        min_rows: Option<usize>,

        /// Number of random forest trees
        #[arg(long)]
        n_estimators: Option<usize>,
    },
}

/// Initialize the tracing subscriber on stderr.
///
/// `RUST_LOG` takes precedence over `--log-level`.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet);

    let output = run(cli.command)?;
    println!("{output}");
    Ok(())
}

/// Execute one command and render its report as pretty JSON.
fn run(command: Command) -> Result<String> {
    match command {
        Command::Analyze {
            input,
            columns,
            iqr_multiplier,
            zscore_threshold,
        } => {
            let df = load(&input)?;
            let mut builder = AnalysisConfig::builder();
            if let Some(k) = iqr_multiplier {
                builder = builder.iqr_multiplier(k);
            }
            if let Some(threshold) = zscore_threshold {
                builder = builder.zscore_threshold(threshold);
            }

            let report = Analyzer::new(builder.build()?)
                .analyze(&df, &AnalysisRequest::with_columns(columns))?;
            info!(
                "Analysis complete: {} recommendations",
                report.recommendations.len()
            );
            to_json(&report)
        }

        Command::Clean {
            input,
            method,
            output,
        } => {
            let df = load(&input)?;
            let (cleaned, summary) = DataCleaner::clean_by_name(&df, &method)?;
            info!("{}", summary.summary);

            let mut value = serde_json::to_value(&summary)?;
            if let Some(path) = output {
                write_csv(&cleaned, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Cleaned dataset written to {}", path.display());
                value["output"] = json!(path.display().to_string());
            }
            Ok(serde_json::to_string_pretty(&value)?)
        }

        Command::Train {
            input,
            features,
            target,
            model,
            seed,
            test_size,
            min_rows,
            n_estimators,
        } => {
            let defaults = TrainingConfig::default();
            let config = TrainingConfig::builder()
                .random_seed(seed.unwrap_or(defaults.random_seed))
                .test_size(test_size.unwrap_or(defaults.test_size))
                .min_rows(min_rows.unwrap_or(defaults.min_rows))
                .n_estimators(n_estimators.unwrap_or(defaults.n_estimators))
                .build()?;

            let df = load(&input)?;
            let request = TrainingRequest::new(features, target, model);
            let report = ModelTrainer::new(config).train(&df, &request)?;
            to_json(&report)
        }
    }
}

fn load(path: &Path) -> Result<DataFrame> {
    info!("Loading dataset from: {}", path.display());
    let df = read_dataset(path)?;
    debug!("Dataset loaded: {:?}", df.shape());
    Ok(df)
}

fn to_json<T: Serialize>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasmith_processing::{ErrorKind, ProcessingError};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::fs;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("datasmith-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn linear_csv(rows: usize) -> String {
        let mut csv = String::from("x,z,y\n");
        for i in 0..rows {
            csv.push_str(&format!("{},{},{}\n", i, i % 4, 2 * i + 3 * (i % 4) + 1));
        }
        csv
    }

    #[test]
    fn test_parse_train_command() {
        let cli = Cli::try_parse_from([
            "datasmith", "train", "-i", "data.csv", "--features", "a,b", "--target", "y",
            "--model", "svm", "--seed", "7",
        ])
        .unwrap();

        match cli.command {
            Command::Train {
                features, seed, ..
            } => {
                assert_eq!(features, vec!["a", "b"]);
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_train_requires_features() {
        let result = Cli::try_parse_from([
            "datasmith", "train", "-i", "data.csv", "--target", "y", "--model", "svm",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["datasmith", "analyze", "-i", "data.csv", "--quiet"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_analyze_outputs_json_report() {
        let path = write_fixture("analyze.csv", &linear_csv(12));
        let output = run(Command::Analyze {
            input: path,
            columns: vec![],
            iqr_multiplier: None,
            zscore_threshold: None,
        })
        .unwrap();

        let report: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(report["summary"]["rows"], 12);
        assert!(report["recommendations"].as_array().is_some_and(|r| !r.is_empty()));
    }

    #[test]
    fn test_clean_writes_output_file() {
        let input = write_fixture("clean.csv", "a,b\n1,2\n1,2\n3,4\n");
        let output = input.with_file_name("clean_out.csv");
        let json = run(Command::Clean {
            input,
            method: "drop_duplicates".to_string(),
            output: Some(output.clone()),
        })
        .unwrap();

        let summary: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(summary["removed_rows"], 1);
        assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 3);
    }

    #[test]
    fn test_train_outputs_metrics() {
        let path = write_fixture("train.csv", &linear_csv(30));
        let json = run(Command::Train {
            input: path,
            features: vec!["x".to_string(), "z".to_string()],
            target: "y".to_string(),
            model: "linear_regression".to_string(),
            seed: None,
            test_size: None,
            min_rows: None,
            n_estimators: None,
        })
        .unwrap();

        let report: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(report["training_samples"], 24);
        assert_eq!(report["test_samples"], 6);
        assert!(report["metrics"]["test"]["r2"].as_f64().unwrap() > 0.999);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let err = run(Command::Clean {
            input: PathBuf::from("/no/such/file.csv"),
            method: "drop_missing".to_string(),
            output: None,
        })
        .unwrap_err();

        let err = err
            .downcast_ref::<ProcessingError>()
            .expect("typed processing error");
        assert_eq!(err.kind(), ErrorKind::DataAccess);
        assert!(err.to_string().contains("/no/such/file.csv"));
    }
}
