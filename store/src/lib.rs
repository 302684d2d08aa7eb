//! Abstract persistence for the EcoNexus DAO.
//!
//! Every backend (LMDB on disk, in-memory for testing) implements [`KvStore`]:
//! a flat map from string keys to UTF-8 text values. Collections are stored as
//! JSON blobs under the keys defined in [`keys`]; [`JsonStoreExt`] does the
//! encoding so the rest of the codebase never touches raw strings.
//! [`RemoteProposalSource`] is the read-only fallback consulted when the local
//! collection is empty.

pub mod error;
pub mod json;
pub mod keys;
pub mod kv;
pub mod remote;

pub use error::StoreError;
pub use json::JsonStoreExt;
pub use kv::KvStore;
pub use remote::RemoteProposalSource;
