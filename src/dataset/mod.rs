//! Dataset storage, class balancing, and fold partitioning
//!
//! - `store`: one safetensors file of named 2-D `f32` tables
//! - `balance`: stratified draws without replacement, one balanced file
//!   per cross-validation repeat
//! - `folds`: contiguous eval spans with floor boundaries and the
//!   delete-then-recreate slice-table lifecycle

pub mod balance;
pub mod folds;
pub mod store;

pub use balance::{build_balanced_subset, class_support, draw_balanced_indices, generate_repeat_sets};
pub use folds::{
    clear_fold_slices, materialize_fold, FoldPlan, FoldSpan, EVAL_FEATURES, EVAL_TARGETS,
    FOLD_SLICE_NAMES, TRAIN_FEATURES, TRAIN_TARGETS,
};
pub use store::{DatasetKeys, TableStore};
