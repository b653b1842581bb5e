//! Error types for plegar
//!
//! A single crate-wide [`Error`] enum; every failure propagates with `?` to
//! the CLI boundary and terminates the run. There are no soft-fail paths:
//! missing paths, short classes, and training failures are all fatal.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for plegar operations
pub type Result<T> = std::result::Result<T, Error>;

/// All error cases produced by this crate
#[derive(Error, Debug)]
pub enum Error {
    /// A required folder or file does not exist (checked before training)
    #[error("required path does not exist: {}", .0.display())]
    MissingPath(PathBuf),

    /// A class has fewer positive examples than the requested per-class cap
    #[error("class {class} has {available} positive examples, cannot draw {requested} without replacement")]
    InsufficientData {
        /// Class column index
        class: usize,
        /// Positive examples present for that class
        available: usize,
        /// Rows requested per class
        requested: usize,
    },

    /// A named table is absent from a dataset store
    #[error("no table named '{0}' in dataset store")]
    TableNotFound(String),

    /// Row or column counts do not line up
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Fold count and row count cannot form a valid plan
    #[error("invalid fold plan: {0}")]
    FoldPlan(String),

    /// Architecture descriptor is present but invalid
    #[error("model descriptor: {0}")]
    Descriptor(String),

    /// A model's fit step failed; the run aborts
    #[error("training failed: {0}")]
    Training(String),

    /// Dataset store serialization or parsing failed
    #[error("dataset store: {0}")]
    Store(String),

    /// Orchestration-level failure
    #[error("cross-validation: {0}")]
    CrossValidation(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_names_the_path() {
        let err = Error::MissingPath(PathBuf::from("/data/train.safetensors"));
        assert_eq!(
            err.to_string(),
            "required path does not exist: /data/train.safetensors"
        );
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = Error::InsufficientData {
            class: 2,
            available: 7,
            requested: 40,
        };
        let msg = err.to_string();
        assert!(msg.contains("class 2"));
        assert!(msg.contains("7 positive examples"));
        assert!(msg.contains("40"));
    }

    #[test]
    fn test_table_not_found_message() {
        let err = Error::TableNotFound("X_eval".to_string());
        assert_eq!(err.to_string(), "no table named 'X_eval' in dataset store");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: Error = bad.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON error"));
    }
}
