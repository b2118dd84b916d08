//! Core domain logic (interface-agnostic)
//!
//! Everything needed to ingest documents and answer questions,
//! independent of the command-line front end.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **indexer**: Document loading, chunking and the ingestion pipeline
//! - **embedding**: Embedder trait and Ollama client
//! - **llm**: Chat model trait and Ollama client
//! - **storage**: Generation-based vector index
//! - **answer**: Retrieval, prompt assembly and generation
//! - **services**: Unified service container

pub mod answer;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod llm;
pub mod ollama;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{KbaseError, Result};
pub use services::Services;
