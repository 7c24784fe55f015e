use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building, training or persisting embeddings.
#[derive(Error, Debug)]
pub enum EmbedError {
    /// Binary vector operation between vectors of different lengths.
    #[error("vectors must have the same length: {left} != {right}")]
    LengthMismatch { left: usize, right: usize },

    /// Indexed access past the end of a vector.
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Cosine similarity against an all-zero vector.
    #[error("cosine similarity is undefined for a zero-norm vector")]
    ZeroNorm,

    /// A persisted vector or progress file could not be interpreted.
    #[error("malformed persisted state in {path}: {reason}")]
    MalformedState { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("word not found in embedding table: {0}")]
    UnknownWord(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EmbedError>;

impl EmbedError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        EmbedError::MalformedState { path: path.into(), reason: reason.to_string() }
    }
}
