use crate::dataset::DEFAULT_DATASET_PATH;
use crate::split::{DEFAULT_SEED, DEFAULT_TEST_SIZE};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use veritrust_classifiers::DEFAULT_MODEL_PATH;

#[derive(Parser, Debug)]
#[command(name = "veritrust-data")]
#[command(author, version, about = "Validate review datasets and evaluate the VeriTrust classifier")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Dataset location and column overrides shared by every command
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// CSV file with review text and labels
    #[arg(short, long, default_value = DEFAULT_DATASET_PATH)]
    pub dataset: PathBuf,

    /// Text column name (autodetected when omitted)
    #[arg(long)]
    pub text_column: Option<String>,

    /// Label column name (autodetected when omitted)
    #[arg(long)]
    pub label_column: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a labeled dataset for missing values, imbalance and duplicates
    Validate {
        #[command(flatten)]
        data: DatasetArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the fine-tuned model over a held-out split and print metrics
    Evaluate {
        #[command(flatten)]
        data: DatasetArgs,

        /// Fine-tuned model directory
        #[arg(short, long, env = "VERITRUST_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
        model_path: PathBuf,

        /// Maximum tokens per review
        #[arg(long, default_value = "256")]
        max_length: usize,

        /// Held-out share of each class
        #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
        test_size: f64,

        /// Shuffle seed for the split
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Evaluate on every row instead of the held-out split
        #[arg(long)]
        all: bool,

        /// Evaluate at most this many reviews
        #[arg(long)]
        limit: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

impl DatasetArgs {
    pub fn selection(&self) -> crate::columns::ColumnSelection {
        crate::columns::ColumnSelection {
            text: self.text_column.clone(),
            label: self.label_column.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_defaults() {
        let cli = Cli::parse_from(["veritrust-data", "validate"]);
        match cli.command {
            Commands::Validate { data, json, .. } => {
                assert_eq!(data.dataset, PathBuf::from(DEFAULT_DATASET_PATH));
                assert!(data.text_column.is_none());
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_evaluate_options() {
        let cli = Cli::parse_from([
            "veritrust-data",
            "evaluate",
            "--dataset",
            "reviews.csv",
            "--label-column",
            "verdict",
            "--model-path",
            "/models/roberta",
            "--test-size",
            "0.3",
            "--limit",
            "50",
        ]);
        match cli.command {
            Commands::Evaluate {
                data,
                model_path,
                test_size,
                seed,
                limit,
                all,
                ..
            } => {
                assert_eq!(data.selection().label.as_deref(), Some("verdict"));
                assert_eq!(model_path, PathBuf::from("/models/roberta"));
                assert_eq!(test_size, 0.3);
                assert_eq!(seed, DEFAULT_SEED);
                assert_eq!(limit, Some(50));
                assert!(!all);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
