//! CLI types - Cli, Command, and argument structs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Plegar: cross-validation training for imbalanced data
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "plegar")]
#[command(author = "PAIML")]
#[command(version)]
#[command(
    about = "Stratified k-fold cross-validation training over class-balanced safetensors datasets"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train one model per repeat with k-fold cross-validation
    Train(TrainArgs),

    /// Build balanced repeat files without training
    Prepare(PrepareArgs),

    /// List the tables of a dataset store file
    Inspect(InspectArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Directory holding the datasets and receiving artifacts
    #[arg(short, long)]
    pub data_dir: PathBuf,

    /// Identifier stamped on saved models and the run report
    #[arg(short, long)]
    pub model_id: String,

    /// Architecture descriptor file, relative to the data directory
    #[arg(long, default_value = "model.json")]
    pub descriptor: String,

    /// Training dataset file, relative to the data directory
    #[arg(long, default_value = "train.safetensors")]
    pub train_file: String,

    /// Held-out test dataset file, relative to the data directory
    #[arg(long, default_value = "test.safetensors")]
    pub test_file: String,

    /// Directory of pre-built balanced repeat files
    #[arg(long, conflicts_with = "cv_file")]
    pub cv_dir: Option<PathBuf>,

    /// Single pre-built balanced file (exactly one repeat)
    #[arg(long)]
    pub cv_file: Option<PathBuf>,

    /// Number of folds per repeat
    #[arg(short = 'k', long, default_value_t = 10)]
    pub folds: usize,

    /// Number of balanced repeats
    #[arg(short, long, default_value_t = 5)]
    pub repeats: usize,

    /// Training epochs per fold
    #[arg(short, long, default_value_t = 10)]
    pub epochs: usize,

    /// Mini-batch size
    #[arg(short, long, default_value_t = 32)]
    pub batch_size: usize,

    /// Optimizer learning rate
    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f32,

    /// Per-class row cap; defaults to the smallest class support
    #[arg(long)]
    pub data_limit: Option<usize>,

    /// Which models to keep and report (best, vote)
    #[arg(long, default_value = "best")]
    pub keep: KeepModel,

    /// Name of the features table in dataset files
    #[arg(long, default_value = "X")]
    pub features_key: String,

    /// Name of the targets table in dataset files
    #[arg(long, default_value = "y")]
    pub targets_key: String,

    /// Random seed for reproducible balanced draws
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the prepare command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PrepareArgs {
    /// Directory holding the training dataset
    #[arg(short, long)]
    pub data_dir: PathBuf,

    /// Training dataset file, relative to the data directory
    #[arg(long, default_value = "train.safetensors")]
    pub train_file: String,

    /// Where to write the repeat files; defaults to `<data-dir>/cv`
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Number of balanced repeats to draw
    #[arg(short, long, default_value_t = 5)]
    pub repeats: usize,

    /// Per-class row cap; defaults to the smallest class support
    #[arg(long)]
    pub data_limit: Option<usize>,

    /// Name of the features table in dataset files
    #[arg(long, default_value = "X")]
    pub features_key: String,

    /// Name of the targets table in dataset files
    #[arg(long, default_value = "y")]
    pub targets_key: String,

    /// Random seed for reproducible balanced draws
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the inspect command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InspectArgs {
    /// Dataset store file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Targets table to summarize class support from, if present
    #[arg(long, default_value = "y")]
    pub targets_key: String,
}

/// Model retention policy for the train command
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum KeepModel {
    /// Keep each repeat's best fold model
    #[default]
    Best,
    /// Keep the best fold models and report their majority-vote ensemble
    Vote,
}

impl std::str::FromStr for KeepModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "best" => Ok(KeepModel::Best),
            "vote" => Ok(KeepModel::Vote),
            _ => Err(format!("Unknown keep policy: {s}. Valid policies: best, vote")),
        }
    }
}

impl std::fmt::Display for KeepModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeepModel::Best => write!(f, "best"),
            KeepModel::Vote => write!(f, "vote"),
        }
    }
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train_command_defaults() {
        let cli = parse_args(["plegar", "train", "-d", "data", "-m", "run1"]).unwrap();
        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.data_dir, PathBuf::from("data"));
                assert_eq!(args.model_id, "run1");
                assert_eq!(args.descriptor, "model.json");
                assert_eq!(args.train_file, "train.safetensors");
                assert_eq!(args.test_file, "test.safetensors");
                assert_eq!(args.cv_dir, None);
                assert_eq!(args.cv_file, None);
                assert_eq!(args.folds, 10);
                assert_eq!(args.repeats, 5);
                assert_eq!(args.epochs, 10);
                assert_eq!(args.batch_size, 32);
                assert!((args.learning_rate - 0.001).abs() < 1e-9);
                assert_eq!(args.data_limit, None);
                assert_eq!(args.keep, KeepModel::Best);
                assert_eq!(args.features_key, "X");
                assert_eq!(args.targets_key, "y");
                assert_eq!(args.seed, None);
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_parse_train_with_overrides() {
        let cli = parse_args([
            "plegar",
            "train",
            "-d",
            "data",
            "-m",
            "run1",
            "-k",
            "5",
            "-r",
            "3",
            "-e",
            "20",
            "-b",
            "16",
            "--learning-rate",
            "0.01",
            "--data-limit",
            "40",
            "--seed",
            "7",
        ])
        .unwrap();

        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.folds, 5);
                assert_eq!(args.repeats, 3);
                assert_eq!(args.epochs, 20);
                assert_eq!(args.batch_size, 16);
                assert!((args.learning_rate - 0.01).abs() < 1e-6);
                assert_eq!(args.data_limit, Some(40));
                assert_eq!(args.seed, Some(7));
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_train_requires_data_dir_and_model_id() {
        assert!(parse_args(["plegar", "train"]).is_err());
        assert!(parse_args(["plegar", "train", "-d", "data"]).is_err());
        assert!(parse_args(["plegar", "train", "-m", "run1"]).is_err());
    }

    #[test]
    fn test_parse_train_keep_vote() {
        let cli = parse_args([
            "plegar", "train", "-d", "data", "-m", "run1", "--keep", "vote",
        ])
        .unwrap();
        match cli.command {
            Command::Train(args) => assert_eq!(args.keep, KeepModel::Vote),
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_parse_train_rejects_unknown_keep() {
        let result = parse_args([
            "plegar", "train", "-d", "data", "-m", "run1", "--keep", "median",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cv_dir_conflicts_with_cv_file() {
        let result = parse_args([
            "plegar",
            "train",
            "-d",
            "data",
            "-m",
            "run1",
            "--cv-dir",
            "cv",
            "--cv-file",
            "repeat_0.safetensors",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_train_with_cv_file() {
        let cli = parse_args([
            "plegar",
            "train",
            "-d",
            "data",
            "-m",
            "run1",
            "--cv-file",
            "balanced.safetensors",
        ])
        .unwrap();
        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.cv_file, Some(PathBuf::from("balanced.safetensors")));
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_parse_train_custom_keys() {
        let cli = parse_args([
            "plegar",
            "train",
            "-d",
            "data",
            "-m",
            "run1",
            "--features-key",
            "inputs",
            "--targets-key",
            "labels",
        ])
        .unwrap();
        match cli.command {
            Command::Train(args) => {
                assert_eq!(args.features_key, "inputs");
                assert_eq!(args.targets_key, "labels");
            }
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_parse_prepare_command() {
        let cli = parse_args(["plegar", "prepare", "-d", "data", "-r", "2"]).unwrap();
        match cli.command {
            Command::Prepare(args) => {
                assert_eq!(args.data_dir, PathBuf::from("data"));
                assert_eq!(args.train_file, "train.safetensors");
                assert_eq!(args.out_dir, None);
                assert_eq!(args.repeats, 2);
                assert_eq!(args.data_limit, None);
            }
            _ => panic!("Expected Prepare command"),
        }
    }

    #[test]
    fn test_parse_prepare_with_out_dir() {
        let cli = parse_args([
            "plegar", "prepare", "-d", "data", "-o", "balanced",
        ])
        .unwrap();
        match cli.command {
            Command::Prepare(args) => {
                assert_eq!(args.out_dir, Some(PathBuf::from("balanced")));
            }
            _ => panic!("Expected Prepare command"),
        }
    }

    #[test]
    fn test_parse_inspect_command() {
        let cli = parse_args(["plegar", "inspect", "train.safetensors"]).unwrap();
        match cli.command {
            Command::Inspect(args) => {
                assert_eq!(args.file, PathBuf::from("train.safetensors"));
                assert_eq!(args.targets_key, "y");
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse_args(["plegar", "inspect", "train.safetensors", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);

        let cli = parse_args(["plegar", "train", "-d", "data", "-m", "run1", "-q"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_keep_model_round_trip() {
        assert_eq!("best".parse::<KeepModel>().unwrap(), KeepModel::Best);
        assert_eq!("VOTE".parse::<KeepModel>().unwrap(), KeepModel::Vote);
        assert!("median".parse::<KeepModel>().is_err());
        assert_eq!(KeepModel::Best.to_string(), "best");
        assert_eq!(KeepModel::Vote.to_string(), "vote");
    }
}
