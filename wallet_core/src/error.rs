use sat_outputs::OutputError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logging init failed: {0}")]
    Logging(String),

    #[error("invalid indexer record {outpoint}: {reason}")]
    InvalidIndexerRecord { outpoint: String, reason: String },

    #[error("output {0} is locked")]
    Locked(String),

    #[error("output has no outpoint to lock")]
    NoOutpoint,

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
