//! The field-store collaborator.
//!
//! Pipeline stages exchange named, wavelength-indexed array fields through a
//! [`FieldStore`]: time-series data, acoustic property maps, reconstructed
//! images. The store is an opaque key-value interface; the on-disk format of
//! [`BinFieldStore`] is an implementation detail and not a stable exchange
//! format.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::sync::Mutex;

use ndarray::ArrayD;
use thiserror::Error;

/// Errors from field-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Field '{field}' at {wavelength_nm} nm not found in store")]
    FieldNotFound { field: String, wavelength_nm: f64 },

    #[error("I/O error accessing field store: {0}")]
    Io(#[from] std::io::Error),

    #[error("Field encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Named, wavelength-indexed storage of array fields between pipeline stages.
pub trait FieldStore {
    /// Load a field for a given wavelength.
    fn load(&self, field: &str, wavelength_nm: f64) -> Result<ArrayD<f64>, StoreError>;

    /// Save a field for a given wavelength, overwriting any previous value.
    fn save(&self, data: &ArrayD<f64>, field: &str, wavelength_nm: f64) -> Result<(), StoreError>;
}

/// Directory-backed field store, one bincode file per (field, wavelength).
#[derive(Debug, Clone)]
pub struct BinFieldStore {
    root: PathBuf,
}

impl BinFieldStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn file_path(&self, field: &str, wavelength_nm: f64) -> PathBuf {
        self.root.join(format!("{field}_{wavelength_nm}nm.bin"))
    }
}

impl FieldStore for BinFieldStore {
    fn load(&self, field: &str, wavelength_nm: f64) -> Result<ArrayD<f64>, StoreError> {
        let path = self.file_path(field, wavelength_nm);
        if !path.exists() {
            return Err(StoreError::FieldNotFound {
                field: field.to_string(),
                wavelength_nm,
            });
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }

    fn save(&self, data: &ArrayD<f64>, field: &str, wavelength_nm: f64) -> Result<(), StoreError> {
        let writer = BufWriter::new(File::create(self.file_path(field, wavelength_nm))?);
        Ok(bincode::serialize_into(writer, data)?)
    }
}

/// In-memory field store, primarily for tests and single-process pipelines.
#[derive(Debug, Default)]
pub struct MemoryFieldStore {
    fields: Mutex<HashMap<(String, u64), ArrayD<f64>>>,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(field: &str, wavelength_nm: f64) -> (String, u64) {
        (field.to_string(), wavelength_nm.to_bits())
    }
}

impl FieldStore for MemoryFieldStore {
    fn load(&self, field: &str, wavelength_nm: f64) -> Result<ArrayD<f64>, StoreError> {
        // A poisoned lock only means a writer panicked mid-insert; the map
        // itself is still a consistent HashMap.
        self.fields
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&Self::key(field, wavelength_nm))
            .cloned()
            .ok_or_else(|| StoreError::FieldNotFound {
                field: field.to_string(),
                wavelength_nm,
            })
    }

    fn save(&self, data: &ArrayD<f64>, field: &str, wavelength_nm: f64) -> Result<(), StoreError> {
        self.fields
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(Self::key(field, wavelength_nm), data.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_bin_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = BinFieldStore::open(dir.path()).unwrap();

        let data = Array2::from_shape_fn((4, 3), |(i, j)| i as f64 * 10.0 + j as f64).into_dyn();
        store.save(&data, "time_series_data", 800.0).unwrap();

        let loaded = store.load("time_series_data", 800.0).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_missing_field_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = BinFieldStore::open(dir.path()).unwrap();
        let err = store.load("density", 700.0).unwrap_err();
        assert!(matches!(err, StoreError::FieldNotFound { .. }));
    }

    #[test]
    fn test_memory_store_usable_after_poisoned_lock() {
        use std::sync::Arc;

        let store = Arc::new(MemoryFieldStore::new());
        let data = Array2::<f64>::zeros((2, 2)).into_dyn();
        store.save(&data, "density", 800.0).unwrap();

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.fields.lock().unwrap();
            panic!("holding the store lock");
        })
        .join();

        assert_eq!(store.load("density", 800.0).unwrap(), data);
        store.save(&data, "speed_of_sound", 800.0).unwrap();
    }

    #[test]
    fn test_memory_store_distinguishes_wavelengths() {
        let store = MemoryFieldStore::new();
        let a = Array2::<f64>::zeros((2, 2)).into_dyn();
        let b = Array2::<f64>::ones((2, 2)).into_dyn();
        store.save(&a, "speed_of_sound", 700.0).unwrap();
        store.save(&b, "speed_of_sound", 800.0).unwrap();

        assert_eq!(store.load("speed_of_sound", 700.0).unwrap(), a);
        assert_eq!(store.load("speed_of_sound", 800.0).unwrap(), b);
    }
}
