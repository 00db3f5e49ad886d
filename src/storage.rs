use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value store scoped to one session, shaped after the browser's
/// `sessionStorage`.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
    /// Ends the session: every key is dropped.
    fn clear(&mut self) -> Result<(), StorageError>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub entries: BTreeMap<String, String>,
}

/// Volatile storage; lives exactly as long as the value.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    data: SessionData,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.data.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.data.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.data.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.data.entries.clear();
        Ok(())
    }
}

/// Session storage backed by one JSON file, so a session survives between
/// separate CLI invocations until it is cleared.
pub struct FileStorage {
    storage_path: PathBuf,
    data: SessionData,
}

impl FileStorage {
    pub fn default_path() -> PathBuf {
        dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("pathpulse")
            .join("session.json")
    }

    /// Opens (or creates) the session file. An unreadable session file is
    /// treated as an ended session and starts empty.
    pub fn open(storage_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let mut storage = Self {
            storage_path: storage_path.into(),
            data: SessionData::default(),
        };
        storage.initialize()?;
        Ok(storage)
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    fn initialize(&mut self) -> Result<(), StorageError> {
        if let Some(data_dir) = self.storage_path.parent() {
            fs::create_dir_all(data_dir)?;
        }

        if self.storage_path.exists() {
            let contents = fs::read(&self.storage_path)?;
            // Invalid UTF-8 surfaces as a JSON error here, not an I/O error.
            match serde_json::from_slice(&contents) {
                Ok(data) => self.data = data,
                Err(err) => {
                    tracing::warn!(
                        path = %self.storage_path.display(),
                        error = %err,
                        "discarding unreadable session file"
                    );
                    self.data = SessionData::default();
                }
            }
        }

        Ok(())
    }

    /// Persist the current content using a temporary file and an atomic
    /// rename to avoid partial writes.
    pub fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp = self.storage_path.with_extension("tmp");
        let mut f = File::create(&temp)?;
        let content = serde_json::to_string_pretty(&self.data)?;
        f.write_all(content.as_bytes())?;
        f.sync_all()?;
        fs::rename(temp, &self.storage_path)?;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.data.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        self.data.entries.insert(key.to_string(), value);
        self.save()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.data.entries.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.data.entries.clear();
        match fs::remove_file(&self.storage_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
