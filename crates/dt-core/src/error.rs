use thiserror::Error;

#[derive(Error, Debug)]
pub enum DtError {
    #[error("Incomplete collection: {done}/{expected} collectors signaled done")]
    IncompleteCollection { done: usize, expected: usize },
    #[error("Similarity threshold {0} outside the open interval (0, 1)")]
    InvalidThreshold(f64),
    #[error("Signature width must be positive, got {0}")]
    InvalidSignatureWidth(usize),
    #[error("Collector failed: {0}")]
    Collector(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DtError>;
