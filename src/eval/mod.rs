//! Evaluation and scoring
//!
//! Metrics live in [`classification`]: binarization, per-class
//! precision/recall/F1 with macro and weighted averages, and the printable
//! report. [`ensemble`] adds majority voting over the per-repeat winners'
//! test predictions.

pub mod classification;
pub mod ensemble;

pub use classification::{
    binarize, classification_report, weighted_f1, Average, ClassMetrics,
};
pub use ensemble::majority_vote;
