use crate::errors::PersistenceError;
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, warn};

/// Durable string key to JSON value mapping. Single writer, last write wins.
pub trait KeyValuePersistence: Send {
    fn set(&mut self, key: &str, value: &Value) -> Result<(), PersistenceError>;

    /// Missing keys and malformed stored text both read as `None`.
    fn get(&self, key: &str) -> Option<Value>;

    fn remove(&mut self, key: &str);
}

fn decode(key: &str, text: &str) -> Option<Value> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("ignoring malformed value stored under {key}: {err}");
            None
        }
    }
}

/// Rejects a write that would push the total stored size past `quota`.
fn ensure_quota<'a>(
    entries: impl Iterator<Item = (&'a String, &'a String)>,
    key: &str,
    text: &str,
    quota: usize,
) -> Result<(), PersistenceError> {
    let others: usize = entries
        .filter(|(existing, _)| existing.as_str() != key)
        .map(|(existing, value)| existing.len() + value.len())
        .sum();
    let needed = others + key.len() + text.len();
    if needed > quota {
        return Err(PersistenceError::Quota {
            key: key.to_string(),
            needed,
            quota,
        });
    }
    Ok(())
}

/// Process-local backend, mostly used as a test double.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(quota),
        }
    }

    /// Stores text as-is, bypassing serialization and quota.
    pub fn set_raw(&mut self, key: &str, text: &str) {
        self.entries.insert(key.to_string(), text.to_string());
    }
}

impl KeyValuePersistence for MemoryStorage {
    fn set(&mut self, key: &str, value: &Value) -> Result<(), PersistenceError> {
        let text = serde_json::to_string(value)?;
        if let Some(quota) = self.quota {
            ensure_quota(self.entries.iter(), key, &text, quota)?;
        }
        self.entries.insert(key.to_string(), text);
        Ok(())
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).and_then(|text| decode(key, text))
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Every key kept as JSON text inside one document on disk. The whole
/// document is rewritten on each change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    quota: usize,
}

impl FileStorage {
    /// Loads the document at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>, quota: usize) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        Self {
            path,
            entries,
            quota,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        let payload = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path) {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse data file: {err}");
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read data file: {err}");
            BTreeMap::new()
        }
    }
}

impl KeyValuePersistence for FileStorage {
    fn set(&mut self, key: &str, value: &Value) -> Result<(), PersistenceError> {
        let text = serde_json::to_string(value)?;
        ensure_quota(self.entries.iter(), key, &text, self.quota)?;

        let previous = self.entries.insert(key.to_string(), text);
        if let Err(err) = self.flush() {
            match previous {
                Some(previous) => self.entries.insert(key.to_string(), previous),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).and_then(|text| decode(key, text))
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            if let Err(err) = self.flush() {
                error!("failed to persist removal of {key}: {err}");
            }
        }
    }
}
