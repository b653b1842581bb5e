//! Stratified k-fold cross-validation training over safetensors datasets.
//!
//! Plegar downsamples every class of an imbalanced classification dataset
//! to a shared per-class cap, draws several independent balanced subsets
//! (repeats), and trains one model per repeat with k-fold cross-validation,
//! keeping each repeat's best fold by weighted F1 on the eval slice.
//!
//! The pieces:
//! - [`dataset`] - safetensors-backed table stores, balanced draws, and
//!   fold slicing
//! - [`model`] - the trainable-model traits, the softmax baseline, and the
//!   Nadam optimizer
//! - [`eval`] - binarization, per-class metrics, reports, majority voting
//! - [`cv`] - the per-repeat fold loop
//! - [`config`] and [`cli`] - the command-line surface
//!
//! # Example
//!
//! ```no_run
//! use plegar::cv::{CrossValidator, CvConfig};
//! use plegar::dataset::{DatasetKeys, TableStore};
//! use plegar::model::SoftmaxFactory;
//! use std::path::Path;
//!
//! fn main() -> plegar::Result<()> {
//!     let factory = SoftmaxFactory::from_file(Path::new("model.json"), 0.001)?;
//!     let mut store = TableStore::open("cv/repeat_0.safetensors")?;
//!     let outcome = CrossValidator::new(&factory, CvConfig::default())
//!         .run_repeat(&mut store, &DatasetKeys::default())?;
//!     println!("best fold {} scored {:.4}", outcome.fold, outcome.score);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod cv;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod model;

pub use error::{Error, Result};
