//! Key/value backends holding the raw token strings

use super::TokenStoreError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage medium behind a [`TokenStore`](super::TokenStore)
///
/// Every method handles a whole batch of keys against one snapshot; the store
/// relies on that to keep the access and refresh tokens in step.
pub trait TokenBackend: Send + Sync {
    /// Values for `keys`, in the same order
    fn get_all(&self, keys: &[&str]) -> Result<Vec<Option<String>>, TokenStoreError>;

    fn put_all(&self, entries: &[(&str, &str)]) -> Result<(), TokenStoreError>;

    fn remove_all(&self, keys: &[&str]) -> Result<(), TokenStoreError>;
}

/// Process-local backend, lost on exit
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenBackend for MemoryBackend {
    fn get_all(&self, keys: &[&str]) -> Result<Vec<Option<String>>, TokenStoreError> {
        let entries = self.entries.lock().map_err(|_| TokenStoreError::Poisoned)?;
        Ok(keys.iter().map(|key| entries.get(*key).cloned()).collect())
    }

    fn put_all(&self, batch: &[(&str, &str)]) -> Result<(), TokenStoreError> {
        let mut entries = self.entries.lock().map_err(|_| TokenStoreError::Poisoned)?;
        for (key, value) in batch {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), TokenStoreError> {
        let mut entries = self.entries.lock().map_err(|_| TokenStoreError::Poisoned)?;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

/// JSON object file, replaced atomically on every mutation
///
/// Survives restarts of the CLI, the counterpart of the browser's local storage.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, TokenStoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), TokenStoreError> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        let contents = serde_json::to_vec_pretty(entries)?;
        {
            let mut file = open_private(&tmp_path)?;
            file.write_all(&contents)?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

impl TokenBackend for FileBackend {
    fn get_all(&self, keys: &[&str]) -> Result<Vec<Option<String>>, TokenStoreError> {
        let _guard = self.lock.lock().map_err(|_| TokenStoreError::Poisoned)?;
        let mut entries = self.load()?;
        Ok(keys.iter().map(|key| entries.remove(*key)).collect())
    }

    fn put_all(&self, batch: &[(&str, &str)]) -> Result<(), TokenStoreError> {
        let _guard = self.lock.lock().map_err(|_| TokenStoreError::Poisoned)?;
        let mut entries = self.load()?;
        for (key, value) in batch {
            entries.insert((*key).to_string(), (*value).to_string());
        }
        self.persist(&entries)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), TokenStoreError> {
        let _guard = self.lock.lock().map_err(|_| TokenStoreError::Poisoned)?;
        let mut entries = self.load()?;
        for key in keys {
            entries.remove(*key);
        }
        self.persist(&entries)
    }
}
