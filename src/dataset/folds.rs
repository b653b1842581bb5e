//! Contiguous fold partitioning inside a dataset store
//!
//! A [`FoldPlan`] turns a row count and fold count into half-open eval
//! spans with floor boundaries; the last fold absorbs the integer-division
//! remainder, so it may be larger than the others.
//! [`materialize_fold`] mirrors one span into four fixed-name slice tables
//! (eval copied directly, train filled prefix-then-suffix into a table of
//! exactly the complement size), and [`clear_fold_slices`] tears them down.
//! Slice tables are deleted before every materialization and again at
//! repeat teardown; stale rows from a prior fold must never survive.

use crate::dataset::store::{DatasetKeys, TableStore};
use crate::error::{Error, Result};
use ndarray::{s, Array2};

/// Train-slice feature table name
pub const TRAIN_FEATURES: &str = "X_train";
/// Train-slice target table name
pub const TRAIN_TARGETS: &str = "y_train";
/// Eval-slice feature table name
pub const EVAL_FEATURES: &str = "X_eval";
/// Eval-slice target table name
pub const EVAL_TARGETS: &str = "y_eval";

/// The four transient slice tables, in creation order
pub const FOLD_SLICE_NAMES: [&str; 4] =
    [EVAL_FEATURES, EVAL_TARGETS, TRAIN_FEATURES, TRAIN_TARGETS];

/// Half-open eval row range `[start, end)` of one fold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoldSpan {
    /// First eval row
    pub start: usize,
    /// One past the last eval row
    pub end: usize,
}

impl FoldSpan {
    /// Number of eval rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span holds no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Validated fold layout over a fixed row count
#[derive(Clone, Copy, Debug)]
pub struct FoldPlan {
    rows: usize,
    folds: usize,
}

impl FoldPlan {
    /// Build a plan for `rows` examples split into `folds` folds.
    ///
    /// Requires at least 2 folds and at least one row per fold.
    pub fn new(rows: usize, folds: usize) -> Result<Self> {
        if folds < 2 {
            return Err(Error::FoldPlan(format!(
                "fold count must be at least 2, got {folds}"
            )));
        }
        if rows < folds {
            return Err(Error::FoldPlan(format!(
                "cannot split {rows} rows into {folds} folds"
            )));
        }
        Ok(Self { rows, folds })
    }

    /// Total row count
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Fold count
    #[must_use]
    pub fn folds(&self) -> usize {
        self.folds
    }

    /// Eval span of fold `fold`.
    ///
    /// `start = fold*rows/folds`; `end = (fold+1)*rows/folds` except for the
    /// last fold, which runs to `rows`.
    ///
    /// # Panics
    /// Panics if `fold >= folds()`.
    #[must_use]
    pub fn span(&self, fold: usize) -> FoldSpan {
        assert!(
            fold < self.folds,
            "fold index {fold} out of range for {} folds",
            self.folds
        );
        let start = fold * self.rows / self.folds;
        let end = if fold + 1 == self.folds {
            self.rows
        } else {
            (fold + 1) * self.rows / self.folds
        };
        FoldSpan { start, end }
    }

    /// All eval spans in fold order
    pub fn spans(&self) -> impl Iterator<Item = FoldSpan> + '_ {
        (0..self.folds).map(|fold| self.span(fold))
    }
}

/// Remove the four slice tables if present and flush the store.
///
/// Idempotent: a store with no materialized slices is left unchanged.
/// The store handle is always passed explicitly; teardown never relies on
/// ambient state.
pub fn clear_fold_slices(store: &mut TableStore) -> Result<()> {
    for name in FOLD_SLICE_NAMES {
        store.remove(name);
    }
    store.flush()
}

/// Materialize one fold's train/eval slices inside `store`.
///
/// Any slice tables from a prior fold are deleted first. The eval tables
/// are direct copies of `span`; the train tables are sized to the
/// complement and filled from the prefix `[0, start)` then the suffix
/// `[end, rows)`. A single flush persists the result.
pub fn materialize_fold(store: &mut TableStore, keys: &DatasetKeys, span: FoldSpan) -> Result<()> {
    for name in FOLD_SLICE_NAMES {
        store.remove(name);
    }

    let (eval_features, train_features) = split_rows(store.get(&keys.features)?, span)?;
    let (eval_targets, train_targets) = split_rows(store.get(&keys.targets)?, span)?;

    store.insert(EVAL_FEATURES, eval_features);
    store.insert(EVAL_TARGETS, eval_targets);
    store.insert(TRAIN_FEATURES, train_features);
    store.insert(TRAIN_TARGETS, train_targets);
    store.flush()
}

/// Split `source` into (eval rows of `span`, remaining rows in order).
fn split_rows(source: &Array2<f32>, span: FoldSpan) -> Result<(Array2<f32>, Array2<f32>)> {
    let rows = source.nrows();
    if span.start > span.end || span.end > rows {
        return Err(Error::ShapeMismatch(format!(
            "fold span {}..{} outside table with {rows} rows",
            span.start, span.end
        )));
    }

    let eval = source.slice(s![span.start..span.end, ..]).to_owned();

    let mut train = Array2::zeros((rows - span.len(), source.ncols()));
    train
        .slice_mut(s![..span.start, ..])
        .assign(&source.slice(s![..span.start, ..]));
    train
        .slice_mut(s![span.start.., ..])
        .assign(&source.slice(s![span.end.., ..]));

    Ok((eval, train))
}
