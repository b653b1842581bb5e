//! Architecture descriptor files
//!
//! The cross-validation core never reads a descriptor; only a model
//! factory does. The built-in baseline uses a small JSON document:
//!
//! ```json
//! { "name": "baseline", "input_dim": 12, "num_classes": 3 }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parsed model architecture descriptor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArchDescriptor {
    /// Optional human-readable architecture name
    #[serde(default)]
    pub name: Option<String>,
    /// Width of the feature table this model consumes
    pub input_dim: usize,
    /// Number of one-hot target classes
    pub num_classes: usize,
}

impl ArchDescriptor {
    /// Load and validate a descriptor from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingPath(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        let descriptor: Self = serde_json::from_str(&raw)?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check dimension constraints.
    pub fn validate(&self) -> Result<()> {
        if self.input_dim == 0 {
            return Err(Error::Descriptor("input_dim must be at least 1".to_string()));
        }
        if self.num_classes < 2 {
            return Err(Error::Descriptor(format!(
                "num_classes must be at least 2, got {}",
                self.num_classes
            )));
        }
        Ok(())
    }
}
