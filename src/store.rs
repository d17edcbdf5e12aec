use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::StoreError;

/// Key-value persistence boundary.
///
/// Values are whole JSON documents; callers read-modify-write a key as a unit.
pub trait Store {
    /// Returns the value stored under `key`, or `None` if nothing was ever written.
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replaces the value stored under `key`.
    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(JsonFileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let mut p = self.dir.clone();
        p.push(format!("{}.json", key));
        p
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut f = OpenOptions::new().read(true).open(&path).map_err(io_err)?;
        let mut s = String::new();
        f.read_to_string(&mut s).map_err(io_err)?;
        if s.trim().is_empty() {
            return Ok(None);
        }
        let value = serde_json::from_str(&s).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        debug!(key, path = %path.display(), "loaded store key");
        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.key_path(key);
        let s = serde_json::to_string_pretty(value)?;
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(io_err)?;
        f.write_all(s.as_bytes()).map_err(io_err)?;
        debug!(key, bytes = s.len(), "wrote store key");
        Ok(())
    }
}

/// In-process store.
///
/// An optional quota caps the serialized size of any single value, which is how
/// a browser-style local store fails when it fills up.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects values whose serialized form exceeds `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        MemoryStore {
            entries: HashMap::new(),
            quota: Some(limit),
        }
    }

    pub fn set_quota(&mut self, limit: Option<usize>) {
        self.quota = limit;
    }

    /// Raw serialized text under `key`.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Writes raw text under `key`, bypassing serialization.
    pub fn insert_raw(&mut self, key: &str, text: impl Into<String>) {
        self.entries.insert(key.to_string(), text.into());
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(s) => serde_json::from_str(s)
                .map(Some)
                .map_err(|e| StoreError::Corrupt {
                    key: key.to_string(),
                    message: e.to_string(),
                }),
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<(), StoreError> {
        let s = serde_json::to_string(value)?;
        if let Some(limit) = self.quota {
            if s.len() > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    size: s.len(),
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), s);
        Ok(())
    }
}
