//! Document ingestion.
//!
//! Loads documents from disk, splits them into overlapping chunks and
//! drives the embed-and-replace pipeline. Key features:
//!
//! - UTF-8 safe character-based chunking
//! - Configurable chunk size and overlap
//! - Directory loading with pattern matching and format extraction
//! - Per-document failure isolation
//!
//! # Safety
//!
//! The chunker slices on `char_indices()` boundaries, so documents with
//! emoji or other multi-byte characters never cause a panic.

pub mod chunker;
pub mod extract;
pub mod loader;
pub mod pipeline;

pub use chunker::{split_windows, Chunker};
pub use loader::{DocumentLoader, LoadFailure, LoadReport};
pub use pipeline::IngestionPipeline;
