//! Key-value storage trait.

use crate::StoreError;

/// A string-keyed store of UTF-8 text values.
///
/// Implementations must be safe to share across threads; callers that need
/// multi-key atomicity serialise their own logical operations.
pub trait KvStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// List every key currently stored.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), StoreError> {
        for key in self.keys()? {
            self.delete(&key)?;
        }
        Ok(())
    }

    /// Make previous writes durable. In-memory backends have nothing to do.
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Approximate stored size of `key` in bytes (0 when absent).
    fn value_len(&self, key: &str) -> Result<usize, StoreError> {
        Ok(self.get(key)?.map(|v| v.len()).unwrap_or(0))
    }

    /// Keys starting with `prefix`.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}
