use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("governance error: {0}")]
    Governance(#[from] econexus_governance::GovernanceError),

    #[error("store error: {0}")]
    Store(#[from] econexus_store::StoreError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] econexus_store_lmdb::LmdbError),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("maintenance task failed: {0}")]
    Task(String),
}
