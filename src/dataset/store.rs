//! Persistent table store for labeled datasets
//!
//! A [`TableStore`] is one on-disk safetensors file holding named 2-D `f32`
//! tables. A labeled dataset occupies two of them (features and one-hot
//! targets, named by [`DatasetKeys`]); fold processing temporarily adds four
//! more. The store is read fully into memory on open and written back as a
//! whole on [`TableStore::flush`], so the file always reflects the last
//! flushed table set.

use crate::error::{Error, Result};
use ndarray::Array2;
use safetensors::tensor::{Dtype, TensorView};
use safetensors::SafeTensors;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Names of the two top-level tables of a labeled dataset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetKeys {
    /// Feature table name (rows = examples, columns = features)
    pub features: String,
    /// One-hot target table name (rows = examples, columns = classes)
    pub targets: String,
}

impl DatasetKeys {
    /// Create keys with explicit table names
    pub fn new(features: impl Into<String>, targets: impl Into<String>) -> Self {
        Self {
            features: features.into(),
            targets: targets.into(),
        }
    }
}

impl Default for DatasetKeys {
    fn default() -> Self {
        Self::new("X", "y")
    }
}

/// Named 2-D `f32` tables bound to one safetensors file
#[derive(Clone, Debug)]
pub struct TableStore {
    path: PathBuf,
    tables: BTreeMap<String, Array2<f32>>,
}

impl TableStore {
    /// Create an empty store bound to `path`. Nothing is written until
    /// [`TableStore::flush`].
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tables: BTreeMap::new(),
        }
    }

    /// Open and fully parse an existing store file.
    ///
    /// Fails with [`Error::MissingPath`] when the file does not exist and
    /// with [`Error::Store`] when a tensor is not a 2-D `F32` table.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            return Err(Error::MissingPath(path));
        }
        let raw = std::fs::read(&path)?;
        let parsed = SafeTensors::deserialize(&raw)
            .map_err(|e| Error::Store(format!("{}: {e}", path.display())))?;

        let mut tables = BTreeMap::new();
        for (name, view) in parsed.tensors() {
            if view.dtype() != Dtype::F32 {
                return Err(Error::Store(format!(
                    "table '{name}' has dtype {:?}, expected F32",
                    view.dtype()
                )));
            }
            let shape = view.shape();
            if shape.len() != 2 {
                return Err(Error::Store(format!(
                    "table '{name}' has {} dimensions, expected 2",
                    shape.len()
                )));
            }
            let values: Vec<f32> = view
                .data()
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect();
            let table = Array2::from_shape_vec((shape[0], shape[1]), values)
                .map_err(|e| Error::Store(format!("table '{name}': {e}")))?;
            tables.insert(name, table);
        }
        Ok(Self { path, tables })
    }

    /// Path this store reads from and flushes to
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace a table
    pub fn insert(&mut self, name: impl Into<String>, table: Array2<f32>) {
        self.tables.insert(name.into(), table);
    }

    /// Borrow a table by name
    pub fn get(&self, name: &str) -> Result<&Array2<f32>> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Remove a table if present. Returns whether it existed; removing an
    /// absent table is a no-op.
    pub fn remove(&mut self, name: &str) -> bool {
        self.tables.remove(name).is_some()
    }

    /// Whether a table with this name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Table names in sorted order
    #[must_use]
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Number of tables
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the store holds no tables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Serialize every table back to the bound path.
    pub fn flush(&self) -> Result<()> {
        let tensor_data: Vec<(String, Vec<u8>, Vec<usize>)> = self
            .tables
            .iter()
            .map(|(name, table)| {
                let values: Vec<f32> = table.iter().copied().collect();
                let bytes = bytemuck::cast_slice::<f32, u8>(&values).to_vec();
                (name.clone(), bytes, vec![table.nrows(), table.ncols()])
            })
            .collect();

        let views: Vec<(&str, TensorView<'_>)> = tensor_data
            .iter()
            .map(|(name, bytes, shape)| {
                TensorView::new(Dtype::F32, shape.clone(), bytes)
                    .map(|view| (name.as_str(), view))
                    .map_err(|e| Error::Store(format!("table '{name}': {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let payload = safetensors::serialize(views, &None)
            .map_err(|e| Error::Store(format!("{}: {e}", self.path.display())))?;
        std::fs::write(&self.path, payload)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    fn store_path(dir: &TempDir) -> PathBuf {
        dir.path().join("data.safetensors")
    }

    #[test]
    fn test_dataset_keys_default() {
        let keys = DatasetKeys::default();
        assert_eq!(keys.features, "X");
        assert_eq!(keys.targets, "y");
    }

    #[test]
    fn test_create_is_empty() {
        let store = TableStore::create("/tmp/unused.safetensors");
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_flush_and_open_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = TableStore::create(&path);
        store.insert("X", array![[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        store.insert("y", array![[1.0_f32, 0.0], [0.0, 1.0], [1.0, 0.0]]);
        store.flush().unwrap();

        let reopened = TableStore::open(&path).unwrap();
        assert_eq!(reopened.table_names(), vec!["X", "y"]);
        assert_eq!(reopened.get("X").unwrap(), store.get("X").unwrap());
        assert_eq!(reopened.get("y").unwrap(), store.get("y").unwrap());
    }

    #[test]
    fn test_open_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = TableStore::open(dir.path().join("absent.safetensors")).unwrap_err();
        assert!(matches!(err, Error::MissingPath(_)));
    }

    #[test]
    fn test_get_missing_table() {
        let store = TableStore::create("/tmp/unused.safetensors");
        let err = store.get("X_train").unwrap_err();
        assert!(matches!(err, Error::TableNotFound(name) if name == "X_train"));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = TableStore::create("/tmp/unused.safetensors");
        store.insert("X", Array2::zeros((2, 2)));
        assert!(store.remove("X"));
        assert!(!store.remove("X"));
        assert!(!store.remove("never-existed"));
    }

    #[test]
    fn test_insert_replaces() {
        let mut store = TableStore::create("/tmp/unused.safetensors");
        store.insert("X", Array2::zeros((2, 2)));
        store.insert("X", Array2::ones((4, 1)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("X").unwrap().nrows(), 4);
    }

    #[test]
    fn test_flush_reflects_removal() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let mut store = TableStore::create(&path);
        store.insert("X", Array2::zeros((2, 2)));
        store.insert("X_eval", Array2::ones((1, 2)));
        store.flush().unwrap();

        store.remove("X_eval");
        store.flush().unwrap();

        let reopened = TableStore::open(&path).unwrap();
        assert!(reopened.contains("X"));
        assert!(!reopened.contains("X_eval"));
    }

    #[test]
    fn test_open_rejects_non_2d_tensor() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let values = [1.0_f32, 2.0, 3.0];
        let bytes: &[u8] = bytemuck::cast_slice(&values);
        let view = TensorView::new(Dtype::F32, vec![3], bytes).unwrap();
        let payload = safetensors::serialize(vec![("flat", view)], &None).unwrap();
        std::fs::write(&path, payload).unwrap();

        let err = TableStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Store(msg) if msg.contains("dimensions")));
    }

    #[test]
    fn test_open_rejects_non_f32_dtype() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let values = [1_i64, 2, 3, 4];
        let bytes: &[u8] = bytemuck::cast_slice(&values);
        let view = TensorView::new(Dtype::I64, vec![2, 2], bytes).unwrap();
        let payload = safetensors::serialize(vec![("ints", view)], &None).unwrap();
        std::fs::write(&path, payload).unwrap();

        let err = TableStore::open(&path).unwrap_err();
        assert!(matches!(err, Error::Store(msg) if msg.contains("dtype")));
    }

    #[test]
    fn test_roundtrip_preserves_row_major_order() {
        let dir = TempDir::new().unwrap();
        let path = store_path(&dir);

        let table = Array2::from_shape_fn((5, 3), |(i, j)| (i * 3 + j) as f32);
        let mut store = TableStore::create(&path);
        store.insert("X", table.clone());
        store.flush().unwrap();

        let reopened = TableStore::open(&path).unwrap();
        assert_eq!(reopened.get("X").unwrap(), &table);
    }
}
