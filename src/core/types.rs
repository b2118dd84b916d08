//! Core data types for kbase.
//!
//! This module defines the data flowing through ingestion and
//! retrieval: documents, chunks, indexed records, retrieval hits and
//! the reports returned to callers.

use serde::{Deserialize, Serialize};

use crate::core::storage::GenerationMetadata;

/// Fixed-length embedding vector
pub type EmbeddingVector = Vec<f32>;

/// Decoded text of one source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier of the document (path relative to the loaded root)
    pub source: String,

    /// Plain text content
    pub content: String,
}

impl Document {
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
        }
    }

    /// True when the content has no non-whitespace character
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A contiguous slice of one document's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source document identifier
    pub source: String,

    /// 1-based position of the chunk within its document
    pub chunk_index: usize,

    /// The actual text content
    pub text: String,

    /// Byte offset where chunk starts in the document content
    pub start_offset: usize,

    /// Byte offset where chunk ends in the document content
    pub end_offset: usize,
}

/// The unit persisted in the vector index, one per chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedRecord {
    pub vector: EmbeddingVector,
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
}

impl IndexedRecord {
    pub fn from_chunk(chunk: Chunk, vector: EmbeddingVector) -> Self {
        Self {
            vector,
            text: chunk.text,
            source: chunk.source,
            chunk_index: chunk.chunk_index,
        }
    }
}

/// One ranked entry of a retrieval result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Source document identifier
    pub source: String,

    /// Chunk index within the document
    pub chunk_index: usize,

    /// Chunk text content
    pub text: String,

    /// Distance to the query vector (lower = more relevant)
    pub distance: f32,
}

/// Up to k retrieved chunks, most relevant first
pub type RetrievalResult = Vec<RetrievedChunk>;

/// Why a document did not contribute records to a generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Content was empty or whitespace-only
    Empty,

    /// Chunking produced nothing
    NoChunks,

    /// The embedding service failed for the document's batch
    EmbeddingFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Empty => write!(f, "empty document"),
            SkipReason::NoChunks => write!(f, "no chunks produced"),
            SkipReason::EmbeddingFailed(msg) => write!(f, "embedding failed: {msg}"),
        }
    }
}

/// Diagnostic entry for a skipped document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub source: String,
    pub reason: SkipReason,
}

/// Statistics from an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Number of documents handed to the pipeline
    pub documents_total: usize,

    /// Number of documents that contributed records
    pub documents_indexed: usize,

    /// Documents dropped along the way, with the reason
    pub skipped: Vec<SkippedDocument>,

    /// Total chunks created (= records written)
    pub chunks_created: usize,

    /// Ingestion duration in milliseconds
    pub duration_ms: u64,

    /// The installed generation, or None when the index was left untouched
    pub generation: Option<GenerationMetadata>,
}

impl IngestReport {
    /// True when a new generation replaced the index
    pub fn replaced_index(&self) -> bool {
        self.generation.is_some()
    }
}
