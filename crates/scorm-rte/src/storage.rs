//! The durable key-value slot that tracking data survives in.

use crate::StorageError;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key the tracking tree is stored under.
pub const STORAGE_KEY: &str = "scorm_data";

/// A string key-value store.
pub trait Storage {
    /// Read the value under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    fn store(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).store(key, value)
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).store(key, value)
    }
}

/// Process-local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slots.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a directory, one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` for storage. It is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        fs::write(&path, value)?;
        debug!("stored {} bytes in {}", value.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_storage_round_trip() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.load(STORAGE_KEY).unwrap(), None);
        storage.store(STORAGE_KEY, "{}").unwrap();
        assert_eq!(storage.load(STORAGE_KEY).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn file_storage_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("state");
        let mut storage = FileStorage::new(&dir);

        assert_eq!(storage.load(STORAGE_KEY).unwrap(), None);
        storage.store(STORAGE_KEY, r#"{"a":1}"#).unwrap();
        assert!(dir.join("scorm_data.json").exists());
        assert_eq!(
            storage.load(STORAGE_KEY).unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }

    #[test]
    fn borrowed_storage_writes_through() {
        fn write<S: Storage>(mut storage: S) {
            storage.store("k", "v").unwrap();
        }

        let mut storage = MemoryStorage::new();
        write(&mut storage);
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));
    }
}
