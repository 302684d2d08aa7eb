//! JSON encoding of stored collections.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{KvStore, StoreError};

/// Length in bytes of `value`'s compact JSON encoding.
pub fn encoded_len<T: Serialize + ?Sized>(value: &T) -> Result<usize, StoreError> {
    serde_json::to_string(value)
        .map(|s| s.len())
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Typed JSON access on top of any [`KvStore`].
pub trait JsonStoreExt: KvStore {
    /// Decode the value under `key`. A value that fails to decode is reported
    /// as [`StoreError::Corruption`].
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::Corruption {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Like [`get_json`](Self::get_json) but a missing key yields `T::default()`.
    fn get_json_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &str,
    ) -> Result<T, StoreError> {
        Ok(self.get_json(key)?.unwrap_or_default())
    }

    /// Encode and store `value`, returning the number of bytes written.
    fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<usize, StoreError> {
        let encoded =
            serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.put(key, &encoded)?;
        Ok(encoded.len())
    }
}

impl<S: KvStore + ?Sized> JsonStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore(Mutex<BTreeMap<String, String>>);

    impl KvStore for MapStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }
        fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }
        fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
        fn keys(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.0.lock().unwrap().keys().cloned().collect())
        }
    }

    #[test]
    fn put_json_reports_encoded_length() {
        let store = MapStore::default();
        let written = store.put_json("k", &vec![1u32, 2, 3]).unwrap();
        assert_eq!(written, "[1,2,3]".len());
        assert_eq!(store.value_len("k").unwrap(), written);
        let back: Vec<u32> = store.get_json("k").unwrap().unwrap();
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn undecodable_value_is_corruption() {
        let store = MapStore::default();
        store.put("k", "{not json").unwrap();
        let err = store.get_json::<Vec<u32>>("k").unwrap_err();
        assert!(matches!(err, StoreError::Corruption { ref key, .. } if key == "k"));
    }

    #[test]
    fn missing_key_defaults() {
        let store = MapStore::default();
        let v: Vec<String> = store.get_json_or_default("absent").unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn default_clear_and_prefix_scan() {
        let store = MapStore::default();
        store.put("user_votes_A", "[]").unwrap();
        store.put("user_votes_B", "[]").unwrap();
        store.put("other", "1").unwrap();
        assert_eq!(store.keys_with_prefix("user_votes_").unwrap().len(), 2);
        store.clear().unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
