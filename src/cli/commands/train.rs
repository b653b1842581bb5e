//! Train command implementation
//!
//! The full pipeline: preflight the required paths, resolve one balanced
//! dataset file per repeat (pre-built or freshly drawn), run the fold loop
//! per repeat, evaluate every retained model on the held-out test set, and
//! leave the models plus a JSON run summary in the data directory.

use super::require_path;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{KeepModel, TrainArgs};
use crate::cv::{CrossValidator, CvConfig};
use crate::dataset::{class_support, generate_repeat_sets, DatasetKeys, TableStore};
use crate::error::Error;
use crate::eval::{binarize, classification_report, majority_vote, Average, ClassMetrics};
use crate::model::SoftmaxFactory;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One repeat's scores in the run summary
#[derive(Serialize)]
struct RepeatReport {
    repeat: usize,
    best_fold: usize,
    fold_scores: Vec<f64>,
    cv_score: f64,
    test_score: f64,
    metrics: ClassMetrics,
}

/// Vote-ensemble scores in the run summary
#[derive(Serialize)]
struct EnsembleReport {
    test_score: f64,
    metrics: ClassMetrics,
}

/// The `<model-id>_report.json` payload
#[derive(Serialize)]
struct RunSummary {
    model_id: String,
    keep: String,
    folds: usize,
    epochs: usize,
    batch_size: usize,
    learning_rate: f32,
    repeats: Vec<RepeatReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ensemble: Option<EnsembleReport>,
}

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Plegar: training '{}' from {}",
            args.model_id,
            args.data_dir.display()
        ),
    );

    preflight(&args).map_err(|e| format!("Config error: {e}"))?;
    train_pipeline(&args, level).map_err(|e| format!("Training error: {e}"))?;

    log(level, LogLevel::Normal, "Training complete!");
    Ok(())
}

/// Check every required path before any training starts.
///
/// The train file is only required when repeat files must be generated
/// from it.
fn preflight(args: &TrainArgs) -> Result<(), Error> {
    require_path(&args.data_dir)?;
    require_path(&args.data_dir.join(&args.descriptor))?;
    require_path(&args.data_dir.join(&args.test_file))?;
    if let Some(dir) = &args.cv_dir {
        require_path(dir)?;
    }
    if let Some(file) = &args.cv_file {
        require_path(file)?;
    }
    if args.cv_dir.is_none() && args.cv_file.is_none() {
        require_path(&args.data_dir.join(&args.train_file))?;
    }
    Ok(())
}

fn train_pipeline(args: &TrainArgs, level: LogLevel) -> Result<(), Error> {
    let keys = DatasetKeys::new(args.features_key.clone(), args.targets_key.clone());
    let factory = SoftmaxFactory::from_file(
        &args.data_dir.join(&args.descriptor),
        args.learning_rate,
    )?;
    let repeat_paths = resolve_repeats(args, &keys, level)?;

    let config = CvConfig {
        folds: args.folds,
        epochs: args.epochs,
        batch_size: args.batch_size,
    };
    let validator = CrossValidator::new(&factory, config);

    let mut outcomes = Vec::with_capacity(repeat_paths.len());
    for (repeat, path) in repeat_paths.iter().enumerate() {
        let mut store = TableStore::open(path)?;
        let outcome = validator.run_repeat(&mut store, &keys)?;
        for (fold, score) in outcome.fold_scores.iter().enumerate() {
            log(
                level,
                LogLevel::Verbose,
                &format!("  repeat {repeat} fold {fold}: weighted F1 {score:.4}"),
            );
        }
        log(
            level,
            LogLevel::Normal,
            &format!(
                "Repeat {repeat}: kept fold {} (weighted F1 {:.4})",
                outcome.fold, outcome.score
            ),
        );
        outcomes.push(outcome);
    }

    // Held-out evaluation of every retained model.
    let test_store = TableStore::open(args.data_dir.join(&args.test_file))?;
    let test_features = test_store.get(&keys.features)?;
    let test_targets = test_store.get(&keys.targets)?;

    let mut reports = Vec::with_capacity(outcomes.len());
    let mut ballots = Vec::new();
    for (repeat, outcome) in outcomes.iter().enumerate() {
        let predictions = binarize(&outcome.model.predict(test_features)?);
        let metrics = ClassMetrics::from_indicators(test_targets, &predictions)?;
        let test_score = metrics.f1_avg(Average::Weighted);

        log(
            level,
            LogLevel::Normal,
            &format!("\nRepeat {repeat} on held-out test: weighted F1 {test_score:.4}"),
        );
        log(
            level,
            LogLevel::Normal,
            &classification_report(test_targets, &predictions)?,
        );

        if args.keep == KeepModel::Vote {
            ballots.push(predictions);
        }
        reports.push(RepeatReport {
            repeat,
            best_fold: outcome.fold,
            fold_scores: outcome.fold_scores.clone(),
            cv_score: outcome.score,
            test_score,
            metrics,
        });
    }

    let ensemble = if args.keep == KeepModel::Vote {
        let winners = majority_vote(&ballots)?;
        let metrics = ClassMetrics::from_indicators(test_targets, &winners)?;
        let test_score = metrics.f1_avg(Average::Weighted);
        log(
            level,
            LogLevel::Normal,
            &format!("\nVote ensemble on held-out test: weighted F1 {test_score:.4}"),
        );
        log(
            level,
            LogLevel::Normal,
            &classification_report(test_targets, &winners)?,
        );
        Some(EnsembleReport {
            test_score,
            metrics,
        })
    } else {
        None
    };

    for (repeat, outcome) in outcomes.iter().enumerate() {
        let path = args
            .data_dir
            .join(format!("{}_repeat{repeat}.safetensors", args.model_id));
        outcome.model.save(&path)?;
        log(
            level,
            LogLevel::Verbose,
            &format!("  saved {}", path.display()),
        );
    }

    let summary = RunSummary {
        model_id: args.model_id.clone(),
        keep: args.keep.to_string(),
        folds: args.folds,
        epochs: args.epochs,
        batch_size: args.batch_size,
        learning_rate: args.learning_rate,
        repeats: reports,
        ensemble,
    };
    let report_path = args
        .data_dir
        .join(format!("{}_report.json", args.model_id));
    std::fs::write(&report_path, serde_json::to_string_pretty(&summary)?)?;
    log(
        level,
        LogLevel::Normal,
        &format!("Report written to {}", report_path.display()),
    );
    Ok(())
}

/// One balanced dataset file per repeat.
///
/// A pre-built `--cv-file` is a single repeat; a pre-built `--cv-dir`
/// contributes its `.safetensors` files in name order; otherwise fresh
/// balanced draws land under `<data-dir>/cv`.
fn resolve_repeats(
    args: &TrainArgs,
    keys: &DatasetKeys,
    level: LogLevel,
) -> Result<Vec<PathBuf>, Error> {
    if let Some(file) = &args.cv_file {
        log(
            level,
            LogLevel::Verbose,
            &format!("  using pre-built repeat {}", file.display()),
        );
        return Ok(vec![file.clone()]);
    }
    if let Some(dir) = &args.cv_dir {
        let files = repeat_files_in(dir)?;
        log(
            level,
            LogLevel::Verbose,
            &format!("  using {} pre-built repeat(s) from {}", files.len(), dir.display()),
        );
        return Ok(files);
    }

    let source = TableStore::open(args.data_dir.join(&args.train_file))?;
    let support = class_support(source.get(&keys.targets)?);
    log(
        level,
        LogLevel::Verbose,
        &format!("  class support: {support:?}"),
    );

    let out_dir = args.data_dir.join("cv");
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let paths = generate_repeat_sets(
        &source,
        keys,
        args.data_limit,
        &out_dir,
        args.repeats,
        &mut rng,
    )?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Generated {} balanced repeat(s) under {}",
            paths.len(),
            out_dir.display()
        ),
    );
    Ok(paths)
}

/// The `.safetensors` files of `dir`, sorted by name.
fn repeat_files_in(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("safetensors") {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(Error::CrossValidation(format!(
            "no .safetensors files in {}",
            dir.display()
        )));
    }
    Ok(files)
}
