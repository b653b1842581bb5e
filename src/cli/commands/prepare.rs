//! Prepare command implementation
//!
//! Draws the balanced repeat files without training, so long runs can
//! reuse one set of draws via `train --cv-dir`.

use super::require_path;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::PrepareArgs;
use crate::dataset::{class_support, generate_repeat_sets, DatasetKeys, TableStore};
use crate::error::Error;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub fn run_prepare(args: PrepareArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Plegar: preparing balanced repeats from {}",
            args.data_dir.display()
        ),
    );

    preflight(&args).map_err(|e| format!("Config error: {e}"))?;
    build_repeats(&args, level).map_err(|e| format!("Prepare error: {e}"))?;
    Ok(())
}

fn preflight(args: &PrepareArgs) -> Result<(), Error> {
    require_path(&args.data_dir)?;
    require_path(&args.data_dir.join(&args.train_file))?;
    Ok(())
}

fn build_repeats(args: &PrepareArgs, level: LogLevel) -> Result<(), Error> {
    let keys = DatasetKeys::new(args.features_key.clone(), args.targets_key.clone());
    let source = TableStore::open(args.data_dir.join(&args.train_file))?;
    let support = class_support(source.get(&keys.targets)?);
    log(
        level,
        LogLevel::Normal,
        &format!("Class support: {support:?}"),
    );

    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| args.data_dir.join("cv"));
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let paths = generate_repeat_sets(
        &source,
        &keys,
        args.data_limit,
        &out_dir,
        args.repeats,
        &mut rng,
    )?;

    for path in &paths {
        log(
            level,
            LogLevel::Verbose,
            &format!("  wrote {}", path.display()),
        );
    }
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Generated {} balanced repeat(s) under {}",
            paths.len(),
            out_dir.display()
        ),
    );
    Ok(())
}
