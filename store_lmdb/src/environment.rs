//! LMDB environment setup and the [`KvStore`] implementation.

use std::path::{Path, PathBuf};

use heed::types::Str;
use heed::{Database, Env, EnvOpenOptions};

use econexus_store::{KvStore, StoreError};

use crate::LmdbError;

const KV_DB_NAME: &str = "kv";
const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and the key-value database handle.
pub struct LmdbEnvironment {
    env: Env,
    kv_db: Database<Str, Str>,
    path: PathBuf,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    ///
    /// `map_size` is the maximum size of the memory map in bytes and bounds
    /// the total amount of data the environment can hold.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process for this path and
        // never concurrently with another `Env` on the same files.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let kv_db: Database<Str, Str> = env.create_database(&mut wtxn, Some(KV_DB_NAME))?;
        wtxn.commit()?;

        tracing::debug!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env,
            kv_db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<u64, LmdbError> {
        let rtxn = self.env.read_txn()?;
        Ok(self.kv_db.len(&rtxn)?)
    }

    pub fn is_empty(&self) -> Result<bool, LmdbError> {
        Ok(self.len()? == 0)
    }
}

impl KvStore for LmdbEnvironment {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let value = self
            .kv_db
            .get(&rtxn, key)
            .map_err(LmdbError::from)?
            .map(str::to_owned);
        Ok(value)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.kv_db
            .put(&mut wtxn, key, value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.kv_db.delete(&mut wtxn, key).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut keys = Vec::new();
        for entry in self.kv_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, _) = entry.map_err(LmdbError::from)?;
            keys.push(key.to_owned());
        }
        Ok(keys)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.kv_db.clear(&mut wtxn).map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        self.env.force_sync().map_err(LmdbError::from)?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut keys = Vec::new();
        for entry in self
            .kv_db
            .prefix_iter(&rtxn, prefix)
            .map_err(LmdbError::from)?
        {
            let (key, _) = entry.map_err(LmdbError::from)?;
            keys.push(key.to_owned());
        }
        Ok(keys)
    }
}
