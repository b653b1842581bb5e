//! The k-fold cross-validation loop
//!
//! One repeat walks every fold of a balanced subset:
//!
//! 1. Materialize the fold's train/eval slices in the store
//! 2. Build a fresh model from the factory and fit it on the train slice
//! 3. Score binarized predictions on the eval slice with weighted F1
//! 4. Keep the model with the strictly best score; the earliest fold wins
//!    ties
//!
//! Fold slices are removed from the store again before the repeat returns,
//! whether it succeeded or not.

use crate::dataset::{
    clear_fold_slices, materialize_fold, DatasetKeys, FoldPlan, TableStore, EVAL_FEATURES,
    EVAL_TARGETS, TRAIN_FEATURES, TRAIN_TARGETS,
};
use crate::error::{Error, Result};
use crate::eval::{binarize, weighted_f1};
use crate::model::{ModelFactory, TrainableModel};

/// Shared knobs for every repeat
#[derive(Clone, Copy, Debug)]
pub struct CvConfig {
    /// Number of folds per repeat
    pub folds: usize,
    /// Training epochs per fold
    pub epochs: usize,
    /// Mini-batch size passed to the model
    pub batch_size: usize,
}

impl Default for CvConfig {
    fn default() -> Self {
        Self {
            folds: 10,
            epochs: 10,
            batch_size: 32,
        }
    }
}

/// The winning model of one repeat, with the full score trail
pub struct RepeatOutcome {
    /// Best model across the repeat's folds
    pub model: Box<dyn TrainableModel>,
    /// Index of the fold that produced it
    pub fold: usize,
    /// Its weighted F1 on that fold's eval slice
    pub score: f64,
    /// Weighted F1 of every fold, in fold order
    pub fold_scores: Vec<f64>,
}

impl std::fmt::Debug for RepeatOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepeatOutcome")
            .field("fold", &self.fold)
            .field("score", &self.score)
            .field("fold_scores", &self.fold_scores)
            .finish_non_exhaustive()
    }
}

/// Runs the fold loop of a repeat against one balanced subset.
pub struct CrossValidator<'a> {
    factory: &'a dyn ModelFactory,
    config: CvConfig,
}

impl<'a> CrossValidator<'a> {
    pub fn new(factory: &'a dyn ModelFactory, config: CvConfig) -> Self {
        Self { factory, config }
    }

    /// The configuration this validator runs with
    #[must_use]
    pub fn config(&self) -> CvConfig {
        self.config
    }

    /// Run all folds over `store`, returning the best model.
    ///
    /// The store's fold slices are cleared (in memory and on disk) before
    /// this returns. A training or scoring failure aborts the repeat and
    /// takes precedence over any teardown failure.
    pub fn run_repeat(&self, store: &mut TableStore, keys: &DatasetKeys) -> Result<RepeatOutcome> {
        let outcome = self.run_folds(store, keys);
        let teardown = clear_fold_slices(store);
        let outcome = outcome?;
        teardown?;
        Ok(outcome)
    }

    fn run_folds(&self, store: &mut TableStore, keys: &DatasetKeys) -> Result<RepeatOutcome> {
        let rows = store.get(&keys.features)?.nrows();
        let plan = FoldPlan::new(rows, self.config.folds)?;

        let mut best: Option<(Box<dyn TrainableModel>, usize)> = None;
        let mut best_score = -1.0_f64;
        let mut fold_scores = Vec::with_capacity(plan.folds());

        for (fold, span) in plan.spans().enumerate() {
            materialize_fold(store, keys, span)?;

            let mut model = self.factory.build()?;
            model.fit(
                store.get(TRAIN_FEATURES)?,
                store.get(TRAIN_TARGETS)?,
                self.config.epochs,
                self.config.batch_size,
            )?;

            let probabilities = model.predict(store.get(EVAL_FEATURES)?)?;
            let predictions = binarize(&probabilities);
            let score = weighted_f1(store.get(EVAL_TARGETS)?, &predictions)?;
            fold_scores.push(score);

            if score > best_score {
                best_score = score;
                best = Some((model, fold));
            }
        }

        let (model, fold) =
            best.ok_or_else(|| Error::CrossValidation("no fold produced a model".to_string()))?;
        Ok(RepeatOutcome {
            model,
            fold,
            score: best_score,
            fold_scores,
        })
    }
}
