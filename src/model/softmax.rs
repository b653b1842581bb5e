//! Softmax regression baseline
//!
//! The built-in [`TrainableModel`]: a single linear layer with row-wise
//! softmax, trained by mini-batch gradient descent on categorical
//! cross-entropy with [`Nadam`] updates. Weights start at zero and `fit`
//! walks the train table in order, honoring the configured epoch count
//! and batch size.

use super::descriptor::ArchDescriptor;
use super::nadam::Nadam;
use super::{ModelFactory, TrainableModel};
use crate::error::{Error, Result};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use safetensors::tensor::{Dtype, TensorView};
use std::collections::HashMap;
use std::path::Path;

/// Linear-softmax classifier over a descriptor's dimensions
#[derive(Clone, Debug)]
pub struct SoftmaxClassifier {
    weights: Array2<f32>,
    bias: Array1<f32>,
    optimizer: Nadam,
}

impl SoftmaxClassifier {
    /// Create an untrained classifier for the descriptor's dimensions.
    pub fn new(descriptor: &ArchDescriptor, learning_rate: f32) -> Result<Self> {
        descriptor.validate()?;
        Ok(Self {
            weights: Array2::zeros((descriptor.input_dim, descriptor.num_classes)),
            bias: Array1::zeros(descriptor.num_classes),
            optimizer: Nadam::new(learning_rate),
        })
    }

    /// Feature width this model consumes
    #[must_use]
    pub fn input_dim(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of target classes
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.weights.ncols()
    }

    /// Row-wise softmax probabilities for a feature block.
    fn forward(&self, features: ArrayView2<'_, f32>) -> Array2<f32> {
        let mut scores = features.dot(&self.weights) + &self.bias;
        for mut row in scores.rows_mut() {
            let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
        scores
    }

    /// Mean categorical cross-entropy against one-hot targets.
    #[must_use]
    pub fn loss(&self, features: &Array2<f32>, targets: &Array2<f32>) -> f32 {
        let probabilities = self.forward(features.view());
        let rows = probabilities.nrows().max(1) as f32;
        let mut total = 0.0;
        for (p_row, t_row) in probabilities.rows().into_iter().zip(targets.rows()) {
            for (&p, &t) in p_row.iter().zip(t_row.iter()) {
                if t != 0.0 {
                    total -= t * p.max(1e-12).ln();
                }
            }
        }
        total / rows
    }

    /// Categorical accuracy: fraction of rows whose predicted arg-max
    /// matches the target arg-max.
    #[must_use]
    pub fn accuracy(&self, features: &Array2<f32>, targets: &Array2<f32>) -> f32 {
        let probabilities = self.forward(features.view());
        if probabilities.nrows() == 0 {
            return 0.0;
        }
        let hits = probabilities
            .rows()
            .into_iter()
            .zip(targets.rows())
            .filter(|(p, t)| argmax(p.view()) == argmax(t.view()))
            .count();
        hits as f32 / probabilities.nrows() as f32
    }

    fn check_features(&self, features: &Array2<f32>) -> Result<()> {
        if features.ncols() != self.input_dim() {
            return Err(Error::ShapeMismatch(format!(
                "model expects {} features, table has {}",
                self.input_dim(),
                features.ncols()
            )));
        }
        Ok(())
    }
}

/// Index of the row's largest entry; earliest index wins ties.
fn argmax(row: ArrayView1<'_, f32>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}

impl TrainableModel for SoftmaxClassifier {
    fn fit(
        &mut self,
        features: &Array2<f32>,
        targets: &Array2<f32>,
        epochs: usize,
        batch_size: usize,
    ) -> Result<()> {
        self.check_features(features)?;
        if targets.ncols() != self.num_classes() {
            return Err(Error::ShapeMismatch(format!(
                "model expects {} classes, targets have {}",
                self.num_classes(),
                targets.ncols()
            )));
        }
        if features.nrows() != targets.nrows() {
            return Err(Error::ShapeMismatch(format!(
                "features have {} rows, targets have {}",
                features.nrows(),
                targets.nrows()
            )));
        }
        if features.nrows() == 0 {
            return Err(Error::Training("train slice is empty".to_string()));
        }

        let rows = features.nrows();
        let batch = batch_size.max(1);
        for _ in 0..epochs {
            let mut start = 0;
            while start < rows {
                let end = (start + batch).min(rows);
                let xb = features.slice(s![start..end, ..]);
                let yb = targets.slice(s![start..end, ..]);

                // Softmax + cross-entropy gradient: (p - y) / batch_len.
                let mut delta = self.forward(xb);
                delta -= &yb;
                delta /= (end - start) as f32;

                let grad_w = xb.t().dot(&delta);
                let grad_b = delta.sum_axis(Axis(0));

                self.optimizer.begin_step();
                self.optimizer.update(
                    0,
                    self.weights.as_slice_mut().expect("weights are contiguous"),
                    grad_w.as_slice().expect("gradient is contiguous"),
                );
                self.optimizer.update(
                    1,
                    self.bias.as_slice_mut().expect("bias is contiguous"),
                    grad_b.as_slice().expect("gradient is contiguous"),
                );

                start = end;
            }
        }
        Ok(())
    }

    fn predict(&self, features: &Array2<f32>) -> Result<Array2<f32>> {
        self.check_features(features)?;
        Ok(self.forward(features.view()))
    }

    fn save(&self, path: &Path) -> Result<()> {
        let tensor_data: Vec<(String, Vec<u8>, Vec<usize>)> = vec![
            (
                "weights".to_string(),
                f32_bytes(self.weights.iter().copied()),
                vec![self.weights.nrows(), self.weights.ncols()],
            ),
            (
                "bias".to_string(),
                f32_bytes(self.bias.iter().copied()),
                vec![self.bias.len()],
            ),
        ];

        let views: Vec<(&str, TensorView<'_>)> = tensor_data
            .iter()
            .map(|(name, bytes, shape)| {
                TensorView::new(Dtype::F32, shape.clone(), bytes)
                    .map(|view| (name.as_str(), view))
                    .map_err(|e| Error::Store(format!("tensor '{name}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut metadata = HashMap::new();
        metadata.insert("format".to_string(), "softmax-classifier".to_string());
        metadata.insert("input_dim".to_string(), self.input_dim().to_string());
        metadata.insert("num_classes".to_string(), self.num_classes().to_string());

        let payload = safetensors::serialize(views, &Some(metadata))
            .map_err(|e| Error::Store(format!("{}: {e}", path.display())))?;
        std::fs::write(path, payload)?;
        Ok(())
    }
}

fn f32_bytes(values: impl Iterator<Item = f32>) -> Vec<u8> {
    let flat: Vec<f32> = values.collect();
    bytemuck::cast_slice::<f32, u8>(&flat).to_vec()
}

/// Builds a fresh [`SoftmaxClassifier`] per fold from one descriptor.
///
/// Carries the compile-like configuration: the learning rate here, with
/// optimizer, loss, and metric fixed to Nadam, categorical cross-entropy,
/// and categorical accuracy.
#[derive(Clone, Debug)]
pub struct SoftmaxFactory {
    descriptor: ArchDescriptor,
    learning_rate: f32,
}

impl SoftmaxFactory {
    /// Wrap an already-parsed descriptor.
    pub fn new(descriptor: ArchDescriptor, learning_rate: f32) -> Self {
        Self {
            descriptor,
            learning_rate,
        }
    }

    /// Load the descriptor from a JSON file.
    pub fn from_file(path: &Path, learning_rate: f32) -> Result<Self> {
        Ok(Self::new(ArchDescriptor::from_file(path)?, learning_rate))
    }

    /// The wrapped descriptor
    #[must_use]
    pub fn descriptor(&self) -> &ArchDescriptor {
        &self.descriptor
    }
}

impl ModelFactory for SoftmaxFactory {
    fn build(&self) -> Result<Box<dyn TrainableModel>> {
        Ok(Box::new(SoftmaxClassifier::new(
            &self.descriptor,
            self.learning_rate,
        )?))
    }
}
