//! Nullable store: thread-safe in-memory key-value storage for testing.

use econexus_store::{KvStore, StoreError};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// An in-memory [`KvStore`] with optional browser-style quota and
/// programmable write failures.
///
/// The quota counts key and value bytes across all entries, the way web
/// storage does.
pub struct NullKvStore {
    entries: Mutex<BTreeMap<String, String>>,
    quota_bytes: Option<usize>,
    fail_writes: AtomicBool,
    failing_keys: Mutex<BTreeSet<String>>,
    writes: AtomicU64,
}

impl NullKvStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            quota_bytes: None,
            fail_writes: AtomicBool::new(false),
            failing_keys: Mutex::new(BTreeSet::new()),
            writes: AtomicU64::new(0),
        }
    }

    /// A store that rejects any write taking it past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::new()
        }
    }

    /// Make every subsequent `put`/`delete` fail with a backend error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `put`/`delete` on `key` fail until [`heal`](Self::heal) is called.
    /// Other keys stay writable.
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.lock().unwrap().insert(key.to_string());
    }

    /// Stop failing writes to individually targeted keys.
    pub fn heal(&self) {
        self.failing_keys.lock().unwrap().clear();
    }

    /// Total key + value bytes currently stored.
    pub fn total_bytes(&self) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    /// Number of successful `put` calls so far.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_writable(&self, key: Option<&str>) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected write failure".to_string()));
        }
        if let Some(key) = key {
            if self.failing_keys.lock().unwrap().contains(key) {
                return Err(StoreError::Backend(format!("injected write failure on {key}")));
            }
        }
        Ok(())
    }
}

impl Default for NullKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for NullKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable(Some(key))?;
        let mut entries = self.entries.lock().unwrap();
        if let Some(quota) = self.quota_bytes {
            let current: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
            let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let attempted = current - replaced + key.len() + value.len();
            if attempted > quota {
                return Err(StoreError::QuotaExceeded { attempted, quota });
            }
        }
        entries.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check_writable(Some(key))?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.check_writable(None)?;
        self.entries.lock().unwrap().clear();
        Ok(())
    }
}
