//! In-memory model repository for testing.
//!
//! This adapter keeps encoded models in a shared map, enabling fast tests
//! without any file system I/O.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
    Result, error::Error, ports::ModelRepository, q_learning::SavedAgent, tictactoe::State,
};

/// In-memory repository for testing.
///
/// Models are stored MessagePack-encoded so that a round trip exercises the
/// same serialization path as the file repository.
///
/// # Thread Safety
///
/// Clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<PathBuf, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> MutexGuard<'_, HashMap<PathBuf, Vec<u8>>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of models currently stored
    pub fn count(&self) -> usize {
        self.storage().len()
    }

    /// Stored locations, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.storage().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn clear(&self) {
        self.storage().clear();
    }
}

impl ModelRepository for InMemoryRepository {
    fn save(&self, model: &SavedAgent<State>, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec(model).map_err(|e| Error::SerializationContext {
            operation: "serialize agent for in-memory storage".to_string(),
            message: e.to_string(),
        })?;

        self.storage().insert(path.to_path_buf(), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedAgent<State>> {
        let storage = self.storage();
        let bytes = storage.get(path).ok_or_else(|| Error::ModelNotFound {
            path: path.to_path_buf(),
        })?;

        rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
            operation: "deserialize agent from in-memory storage".to_string(),
            message: e.to_string(),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.storage().contains_key(path)
    }
}
