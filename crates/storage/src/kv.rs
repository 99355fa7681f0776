use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use quiz_core::Validate;

/// Errors surfaced by storage backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("storage quota exceeded")]
    Quota,

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Raw string-keyed, string-valued persistence, the shape of a browser's
/// local storage. Backends report failures; recovery policy lives in
/// [`KvStore`].
pub trait StorageBackend: Send + Sync {
    /// Fetch the raw value under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend cannot be read at all.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Quota` when out of space, or another
    /// `StorageError` for other backend failures.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the entry under `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend cannot be written.
    fn clear(&self) -> Result<(), StorageError>;

    /// All currently stored keys, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the backend cannot be read.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// In-memory backend for tests and prototyping, with an optional byte quota
/// so quota-recovery paths can be exercised deterministically.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
    byte_limit: Option<usize>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that rejects writes once the summed key+value bytes would
    /// exceed `limit`.
    #[must_use]
    pub fn with_byte_limit(limit: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            byte_limit: Some(limit),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if let Some(limit) = self.byte_limit {
            let used: usize = guard
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > limit {
                return Err(StorageError::Quota);
            }
        }
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        guard.clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(guard.keys().cloned().collect())
    }
}

//
// ─── FILE BACKEND ──────────────────────────────────────────────────────────────
//

/// One JSON file per key under a data directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Open (creating if needed) a backend rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Unavailable` if the directory cannot be
    /// created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn key_for(path: &Path) -> Option<String> {
        if path.extension().is_some_and(|ext| ext == "json") {
            path.file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        } else {
            None
        }
    }

    fn map_write_error(err: &io::Error) -> StorageError {
        match err.kind() {
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => StorageError::Quota,
            _ => StorageError::Backend(err.to_string()),
        }
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Backend(err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path_for(key), value).map_err(|e| Self::map_write_error(&e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Backend(err.to_string())),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries =
            std::fs::read_dir(&self.dir).map_err(|e| StorageError::Backend(e.to_string()))?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::Backend(e.to_string()))?;
            if let Some(key) = Self::key_for(&entry.path()) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

//
// ─── KV ADAPTER ────────────────────────────────────────────────────────────────
//

/// Namespace prefix for keys the quota-recovery pass must never evict.
pub const PROTECTED_PREFIX: &str = "quizdeck.";

const PROBE_KEY: &str = "__kv_probe__";

/// Durable key-value adapter with schema validation and graceful
/// degradation.
///
/// Everything persisted through this adapter is user-owned and safe to
/// lose, so every operation resolves to a success flag or a default
/// instead of an error: a failed write loses cross-session persistence,
/// never the in-memory session.
#[derive(Clone)]
pub struct KvStore {
    backend: Arc<dyn StorageBackend>,
    protected_prefix: String,
}

impl KvStore {
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            protected_prefix: PROTECTED_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_protected_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.protected_prefix = prefix.into();
        self
    }

    /// Serializes `value` and persists it under `key`.
    ///
    /// On a quota failure this makes one remedial pass, deleting entries
    /// outside the protected namespace, then retries the write once.
    /// Returns whether the value ended up stored.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("kv: failed to serialize value for {key}: {err}");
                return false;
            }
        };

        match self.backend.set(key, &payload) {
            Ok(()) => true,
            Err(StorageError::Quota) => {
                warn!("kv: quota exceeded writing {key}, evicting unprotected entries");
                self.evict_unprotected(key);
                match self.backend.set(key, &payload) {
                    Ok(()) => {
                        debug!("kv: write of {key} succeeded after eviction");
                        true
                    }
                    Err(err) => {
                        warn!("kv: write of {key} still failing after eviction: {err}");
                        false
                    }
                }
            }
            Err(err) => {
                warn!("kv: failed to write {key}: {err}");
                false
            }
        }
    }

    /// Reads, deserializes and validates the value under `key`.
    ///
    /// An absent key, an unparsable payload and a validation failure all
    /// yield `None` (with the cause logged): callers reinitialize from
    /// nothing rather than trust a partially valid record.
    #[must_use]
    pub fn read<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned + Validate,
    {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("kv: failed to read {key}: {err}");
                return None;
            }
        };

        let value: T = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!("kv: discarding unparsable record under {key}: {err}");
                return None;
            }
        };

        if let Err(err) = value.validate() {
            warn!("kv: discarding invalid record under {key}: {err}");
            return None;
        }

        Some(value)
    }

    /// Best-effort delete of `key`.
    pub fn remove(&self, key: &str) {
        if let Err(err) = self.backend.remove(key) {
            warn!("kv: failed to remove {key}: {err}");
        }
    }

    /// Best-effort delete of every entry.
    pub fn clear(&self) {
        if let Err(err) = self.backend.clear() {
            warn!("kv: failed to clear storage: {err}");
        }
    }

    /// Probes the backend with a trivial write and delete.
    ///
    /// Guards environments where persistent storage is inaccessible; a
    /// failed probe means every later call will silently no-op.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend.set(PROBE_KEY, "probe").is_ok() && self.backend.remove(PROBE_KEY).is_ok()
    }

    fn evict_unprotected(&self, keep: &str) {
        let keys = match self.backend.keys() {
            Ok(keys) => keys,
            Err(err) => {
                warn!("kv: cannot list keys for eviction: {err}");
                return;
            }
        };
        for key in keys {
            if key == keep || key.starts_with(&self.protected_prefix) {
                continue;
            }
            if let Err(err) = self.backend.remove(&key) {
                warn!("kv: failed to evict {key}: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::ProgressLedger;
    use quiz_core::time::fixed_now;

    fn store() -> KvStore {
        KvStore::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn round_trips_a_ledger() {
        let kv = store();
        let mut ledger = ProgressLedger::empty(40, fixed_now());
        ledger.mark_answered(2, true, fixed_now());

        assert!(kv.write("quizdeck.exam", &ledger));
        let back: ProgressLedger = kv.read("quizdeck.exam").unwrap();
        assert_eq!(back, ledger);
    }

    #[test]
    fn absent_key_reads_as_none() {
        let kv = store();
        assert!(kv.read::<ProgressLedger>("quizdeck.missing").is_none());
    }

    #[test]
    fn unparsable_payload_reads_as_none() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set("quizdeck.exam", "{not json").unwrap();
        let kv = KvStore::new(backend);
        assert!(kv.read::<ProgressLedger>("quizdeck.exam").is_none());
    }

    #[test]
    fn invalid_record_reads_as_none() {
        let backend = Arc::new(MemoryBackend::new());
        // totalQuestions of 0 fails ledger validation.
        backend
            .set(
                "quizdeck.exam",
                r#"{"completedQuestions":{},"lastPosition":0,"shuffleEnabled":false,"totalQuestions":0,"lastUpdated":"2023-11-14T22:13:20Z"}"#,
            )
            .unwrap();
        let kv = KvStore::new(backend);
        assert!(kv.read::<ProgressLedger>("quizdeck.exam").is_none());
    }

    #[test]
    fn quota_eviction_spares_protected_keys() {
        let backend = Arc::new(MemoryBackend::with_byte_limit(450));
        let filler = "x".repeat(400);
        backend.set("scratch.filler", &filler).unwrap();
        let kv = KvStore::new(backend.clone());

        let ledger = ProgressLedger::empty(40, fixed_now());
        assert!(kv.write("quizdeck.exam", &ledger));

        // The unprotected filler was evicted to make room.
        assert!(backend.get("scratch.filler").unwrap().is_none());
        assert!(backend.get("quizdeck.exam").unwrap().is_some());
    }

    #[test]
    fn write_fails_when_eviction_cannot_make_room() {
        let backend = Arc::new(MemoryBackend::with_byte_limit(16));
        let kv = KvStore::new(backend);
        let ledger = ProgressLedger::empty(40, fixed_now());
        assert!(!kv.write("quizdeck.exam", &ledger));
    }

    #[test]
    fn availability_probe() {
        assert!(store().is_available());
        // A zero-byte quota cannot even store the probe.
        let kv = KvStore::new(Arc::new(MemoryBackend::with_byte_limit(0)));
        assert!(!kv.is_available());
    }
}
