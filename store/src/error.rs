use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("stored value under '{key}' is corrupted: {reason}")]
    Corruption { key: String, reason: String },

    #[error("storage quota exceeded: writing {attempted} bytes would exceed {quota} bytes")]
    QuotaExceeded { attempted: usize, quota: usize },
}
