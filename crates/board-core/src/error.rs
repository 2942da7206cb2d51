use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Storage backend failed: {0}")]
    Storage(String),

    #[error("Corrupted value under {key}: {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BoardError>;
