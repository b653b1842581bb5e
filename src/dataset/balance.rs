//! Class-balanced subset construction from imbalanced datasets
//!
//! Every class column contributes exactly `cap` rows, drawn uniformly at
//! random without replacement from that class's positive rows. The drawn
//! indices are concatenated across classes and sorted ascending, so the
//! subset restores original row order rather than grouping by class. When
//! no cap is supplied it defaults to the smallest per-class positive count.

use crate::dataset::store::{DatasetKeys, TableStore};
use crate::error::{Error, Result};
use ndarray::{Array2, Axis};
use rand::seq::index;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Positive-example count per class column (nonzero entries)
#[must_use]
pub fn class_support(targets: &Array2<f32>) -> Vec<usize> {
    targets
        .axis_iter(Axis(1))
        .map(|column| column.iter().filter(|&&v| v != 0.0).count())
        .collect()
}

/// Row indices where `class`'s target column is nonzero
fn positive_rows(targets: &Array2<f32>, class: usize) -> Vec<usize> {
    targets
        .column(class)
        .iter()
        .enumerate()
        .filter(|(_, &v)| v != 0.0)
        .map(|(row, _)| row)
        .collect()
}

/// Draw `cap` rows per class without replacement and restore index order.
///
/// `cap` is `limit`, or the minimum per-class positive count when `limit`
/// is `None`. Fails with [`Error::InsufficientData`] if any class has fewer
/// than `cap` positives; no partial subset is produced.
pub fn draw_balanced_indices<R: Rng>(
    targets: &Array2<f32>,
    limit: Option<usize>,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let support = class_support(targets);
    if support.is_empty() {
        return Err(Error::ShapeMismatch(
            "target table has no class columns".to_string(),
        ));
    }
    let cap = match limit {
        Some(cap) => cap,
        None => *support.iter().min().expect("support is non-empty"),
    };

    let mut drawn = Vec::with_capacity(cap * support.len());
    for (class, &available) in support.iter().enumerate() {
        if available < cap {
            return Err(Error::InsufficientData {
                class,
                available,
                requested: cap,
            });
        }
        let rows = positive_rows(targets, class);
        let picks = index::sample(rng, rows.len(), cap);
        drawn.extend(picks.iter().map(|pick| rows[pick]));
    }
    drawn.sort_unstable();
    Ok(drawn)
}

/// Build a balanced subset of `source` and flush it to `out_path`.
///
/// The output store holds the same two table names as the source, sized
/// `(cap * num_classes, num_features)` and `(cap * num_classes,
/// num_classes)`. The source is never mutated.
pub fn build_balanced_subset<R: Rng>(
    source: &TableStore,
    keys: &DatasetKeys,
    limit: Option<usize>,
    out_path: &Path,
    rng: &mut R,
) -> Result<TableStore> {
    let features = source.get(&keys.features)?;
    let targets = source.get(&keys.targets)?;
    if features.nrows() != targets.nrows() {
        return Err(Error::ShapeMismatch(format!(
            "'{}' has {} rows but '{}' has {}",
            keys.features,
            features.nrows(),
            keys.targets,
            targets.nrows()
        )));
    }

    let indices = draw_balanced_indices(targets, limit, rng)?;

    let mut subset = TableStore::create(out_path);
    subset.insert(keys.features.clone(), features.select(Axis(0), &indices));
    subset.insert(keys.targets.clone(), targets.select(Axis(0), &indices));
    subset.flush()?;
    Ok(subset)
}

/// Build one independent balanced dataset file per cross-validation repeat.
///
/// Files are named `repeat_<i>.safetensors` under `out_dir` (created if
/// absent). Each repeat is a fresh draw; nothing is shared between them
/// beyond the source dataset and the cap.
pub fn generate_repeat_sets<R: Rng>(
    source: &TableStore,
    keys: &DatasetKeys,
    limit: Option<usize>,
    out_dir: &Path,
    repeats: usize,
    rng: &mut R,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)?;
    let mut paths = Vec::with_capacity(repeats);
    for repeat in 0..repeats {
        let path = out_dir.join(format!("repeat_{repeat}.safetensors"));
        build_balanced_subset(source, keys, limit, &path, rng)?;
        paths.push(path);
    }
    Ok(paths)
}
