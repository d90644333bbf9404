//! Storage for the persisted browse preferences.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;

use super::state::Preferences;

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("preference file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait PreferenceStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Storage or decoding failures.
    fn load(&self) -> Result<Option<Preferences>, PreferenceError>;

    /// # Errors
    ///
    /// Storage or encoding failures.
    fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError>;
}

/// Preferences kept as a small JSON document on disk.
///
/// Saves go through a temp file in the same directory that is renamed over
/// the target, so a reader sees either the old document or the new one.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<Preferences>, PreferenceError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)?;

        let mut staged = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut staged, preferences)?;
        staged.flush()?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

/// Process-local store, for tests and headless use.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    saved: Mutex<Option<Preferences>>,
}

impl MemoryPreferenceStore {
    #[must_use]
    pub fn with(preferences: Preferences) -> Self {
        Self {
            saved: Mutex::new(Some(preferences)),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<Preferences>, PreferenceError> {
        Ok(*self.saved.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn save(&self, preferences: &Preferences) -> Result<(), PreferenceError> {
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(*preferences);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::state::{SortChoice, ViewMode};

    fn list_prefs() -> Preferences {
        Preferences {
            sort: SortChoice::PriceDesc,
            view: ViewMode::List,
            per_page: 24,
        }
    }

    #[test]
    fn test_file_store_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("preferences.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_saves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");
        let store = FilePreferenceStore::new(&path);

        store.save(&list_prefs()).unwrap();
        assert_eq!(store.load().unwrap(), Some(list_prefs()));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"perPage\": 24"));
    }

    #[test]
    fn test_file_store_overwrite_leaves_one_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        let store = FilePreferenceStore::new(&path);

        store.save(&list_prefs()).unwrap();
        store.save(&Preferences::default()).unwrap();

        assert_eq!(store.load().unwrap(), Some(Preferences::default()));
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("preferences.json")]);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, b"not json").unwrap();
        let store = FilePreferenceStore::new(&path);
        assert!(matches!(store.load(), Err(PreferenceError::Json(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::default();
        assert!(store.load().unwrap().is_none());
        store.save(&Preferences::default()).unwrap();
        assert_eq!(store.load().unwrap(), Some(Preferences::default()));
    }
}
