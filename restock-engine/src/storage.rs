//! Durable key-value storage port.
//!
//! The engine never touches persistence mechanics directly — it goes through
//! this contract so the preference store and onboarding resolver can be
//! tested against an in-memory fake. Store operations never fail: a backend
//! that cannot read returns `None`, a backend that cannot write logs and
//! drops the write.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Durable string-keyed store. `set` overwrites, last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// In-memory store, used as the test fake and for ephemeral runs.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("store lock").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("store lock")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().expect("store lock").remove(key);
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// File-backed store holding all entries in one JSON object. Reads tolerate
/// a missing or malformed file; writes rewrite the whole file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_entries(&self) -> HashMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return HashMap::new(),
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!(
                    "state file {} is malformed, starting empty: {}",
                    self.path.display(),
                    e
                );
                HashMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &HashMap<String, String>) {
        let serialized =
            serde_json::to_string_pretty(entries).expect("string map serializes to JSON");
        if let Err(e) = std::fs::write(&self.path, serialized) {
            log::warn!("failed to write state file {}: {}", self.path.display(), e);
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.read_entries();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.read_entries();
        if entries.remove(key).is_some() {
            self.write_entries(&entries);
        }
    }
}
