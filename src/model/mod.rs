//! Models and optimization
//!
//! Everything the cross-validator needs to know about a model lives in two
//! traits:
//!
//! - [`TrainableModel`] - fit on a train slice, predict probabilities,
//!   persist to safetensors
//! - [`ModelFactory`] - stamp out a fresh, untrained model per fold
//!
//! The crate ships one implementation pair, [`SoftmaxClassifier`] built by
//! [`SoftmaxFactory`], sized from an [`ArchDescriptor`] JSON file and
//! trained with the [`Nadam`] optimizer.

pub mod descriptor;
pub mod nadam;
pub mod softmax;

pub use descriptor::ArchDescriptor;
pub use nadam::Nadam;
pub use softmax::{SoftmaxClassifier, SoftmaxFactory};

use crate::error::Result;
use ndarray::Array2;
use std::path::Path;

/// A classifier that can be trained on one fold and scored on another.
///
/// `features` rows align with `targets` rows; targets are one-hot with one
/// column per class. `predict` returns per-row class probabilities in the
/// same column order.
pub trait TrainableModel {
    /// Train in place on the given slice for `epochs` passes.
    fn fit(
        &mut self,
        features: &Array2<f32>,
        targets: &Array2<f32>,
        epochs: usize,
        batch_size: usize,
    ) -> Result<()>;

    /// Per-row class probabilities, rows x classes.
    fn predict(&self, features: &Array2<f32>) -> Result<Array2<f32>>;

    /// Persist the trained parameters as a safetensors file.
    fn save(&self, path: &Path) -> Result<()>;
}

/// Produces an untrained [`TrainableModel`] for every fold.
///
/// Each call must return an independent instance; folds never share
/// optimizer state or parameters.
pub trait ModelFactory {
    /// Build a fresh model.
    fn build(&self) -> Result<Box<dyn TrainableModel>>;
}
