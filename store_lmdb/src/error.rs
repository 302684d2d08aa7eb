use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmdbError {
    #[error("LMDB error: {0}")]
    Heed(String),

    #[error("LMDB map is full; raise map_size_mb")]
    MapFull,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<heed::Error> for LmdbError {
    fn from(e: heed::Error) -> Self {
        match e {
            heed::Error::Mdb(heed::MdbError::MapFull) => LmdbError::MapFull,
            other => LmdbError::Heed(other.to_string()),
        }
    }
}

impl From<LmdbError> for econexus_store::StoreError {
    fn from(e: LmdbError) -> Self {
        econexus_store::StoreError::Backend(e.to_string())
    }
}
