//! Error types and error handling for kbase.
//!
//! This module defines the error type shared by every layer. The
//! orchestrators decide locally which variants are recoverable
//! (per-document and per-query failures) and which are fatal
//! (configuration and index writes).

use thiserror::Error;

/// Result type alias for kbase operations
pub type Result<T> = std::result::Result<T, KbaseError>;

/// Main error type for kbase
#[derive(Error, Debug)]
pub enum KbaseError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to load document: {0}")]
    LoadFailed(String),

    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("Chat completion failed: {0}")]
    ChatFailed(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] lancedb::Error),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl KbaseError {
    /// Check if this error must stop the process before it serves
    /// queries or ingests
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            KbaseError::ConfigError(_) | KbaseError::TomlError(_)
        )
    }

    /// Check if this error came from the embedding or chat service
    pub fn is_external_service(&self) -> bool {
        matches!(
            self,
            KbaseError::EmbeddingFailed(_)
                | KbaseError::ChatFailed(_)
                | KbaseError::ServiceUnavailable(_)
                | KbaseError::HttpError(_)
        )
    }
}
