//! kbase - question answering over a local document collection
//!
//! Retrieval-augmented generation on top of a local Ollama server:
//! documents are chunked, embedded and stored as index generations;
//! questions are answered by a chat model that only sees the top-k
//! retrieved chunks.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - indexer (loading, chunking, ingestion pipeline)
//!   - embedding, llm (external model services)
//!   - storage (vector index generations)
//!   - answer (retrieval and grounded generation)
//!   - services (unified service container)
//!
//! - **cli**: Command-line adapter (depends on core)
//!
//! # Key Features
//!
//! - UTF-8 safe chunking (character-based, never panics)
//! - Whole-index replacement on every ingestion, never a partial write
//! - Per-document failure isolation during ingestion
//! - Every question gets an answer string, even when services fail

// Core domain logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{KbaseError, Result};
pub use core::services::Services;
pub use core::types::*;
