//! Error types for Engram

use thiserror::Error;

/// Main error type for Engram operations
#[derive(Error, Debug)]
pub enum EngramError {
    /// List-store errors (short-term tier backing store)
    #[error("List store error: {0}")]
    Store(String),

    /// Vector-index errors (long-term tier backing store)
    #[error("Vector index error: {0}")]
    Index(String),

    /// Embedding generation errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid caller input (empty session id, text, or query)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Engram operations
pub type Result<T> = std::result::Result<T, EngramError>;
