//! LMDB storage backend for the EcoNexus DAO.
//!
//! Implements [`econexus_store::KvStore`] on top of the `heed` LMDB bindings.
//! The whole key space lives in one named database inside a single
//! environment; every `put`/`delete` is its own committed write transaction.

pub mod environment;
pub mod error;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
