//! Inspect command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::InspectArgs;
use crate::dataset::{class_support, TableStore};

pub fn run_inspect(args: InspectArgs, level: LogLevel) -> Result<(), String> {
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()));
    }

    let store = TableStore::open(&args.file).map_err(|e| format!("Failed to read store: {e}"))?;

    log(
        level,
        LogLevel::Normal,
        &format!("Store: {}", args.file.display()),
    );
    log(
        level,
        LogLevel::Normal,
        &format!("  Tables: {}", store.len()),
    );
    for name in store.table_names() {
        let table = store.get(name).map_err(|e| e.to_string())?;
        log(
            level,
            LogLevel::Normal,
            &format!("  {}: {} x {}", name, table.nrows(), table.ncols()),
        );
    }

    if store.contains(&args.targets_key) {
        let targets = store.get(&args.targets_key).map_err(|e| e.to_string())?;
        log(
            level,
            LogLevel::Normal,
            &format!(
                "  Class support ({}): {:?}",
                args.targets_key,
                class_support(targets)
            ),
        );
    }

    Ok(())
}
