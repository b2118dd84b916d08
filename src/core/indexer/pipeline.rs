//! Ingestion pipeline orchestration.
//!
//! Turns a batch of documents into one new index generation:
//! 1. Reject blank documents
//! 2. Chunk text
//! 3. Embed each document's chunks in one batch
//! 4. Replace the index with everything accumulated
//!
//! A failure on one document skips that document only. The run fails
//! as a whole only when the index write fails.

use std::sync::Arc;
use std::time::Instant;

use crate::core::embedding::{check_batch, Embedder};
use crate::core::error::Result;
use crate::core::indexer::Chunker;
use crate::core::storage::{GenerationInfo, VectorIndex};
use crate::core::types::{
    Document, IndexedRecord, IngestReport, SkipReason, SkippedDocument,
};

/// Orchestrates chunk, embed and replace
pub struct IngestionPipeline {
    chunker: Chunker,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl IngestionPipeline {
    pub fn new(chunker: Chunker, embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self {
            chunker,
            embedder,
            index,
        }
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Rebuild the index from `documents`.
    ///
    /// Documents are processed in order, one at a time. When no
    /// document yields records the index is left untouched and the
    /// report carries no generation.
    ///
    /// # Errors
    ///
    /// Only when writing the new generation fails.
    pub async fn ingest(&self, documents: Vec<Document>) -> Result<IngestReport> {
        let start = Instant::now();
        let documents_total = documents.len();
        tracing::info!("Starting ingestion of {} documents", documents_total);

        let mut records: Vec<IndexedRecord> = Vec::new();
        let mut skipped = Vec::new();
        let mut documents_indexed = 0;

        for (idx, document) in documents.into_iter().enumerate() {
            if idx % 100 == 0 && idx > 0 {
                tracing::info!("Progress: {}/{} documents processed", idx, documents_total);
            }

            let source = document.source.clone();
            match self.process_document(document).await {
                Ok(doc_records) => {
                    tracing::debug!("Indexed {} ({} chunks)", source, doc_records.len());
                    records.extend(doc_records);
                    documents_indexed += 1;
                }
                Err(reason) => {
                    tracing::warn!("Skipping {}: {}", source, reason);
                    skipped.push(SkippedDocument { source, reason });
                }
            }
        }

        let chunks_created = records.len();
        let generation = if records.is_empty() {
            tracing::warn!("No chunks produced; index left unchanged");
            None
        } else {
            let info = GenerationInfo {
                embedding_model: self.embedder.model_name().to_string(),
                chunk_size: self.chunker.chunk_size(),
                overlap: self.chunker.overlap(),
                document_count: documents_indexed,
            };
            Some(self.index.replace_all(records, info).await?)
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Ingestion complete: {} documents indexed, {} skipped, {} chunks created in {}ms",
            documents_indexed,
            skipped.len(),
            chunks_created,
            duration_ms
        );

        Ok(IngestReport {
            documents_total,
            documents_indexed,
            skipped,
            chunks_created,
            duration_ms,
            generation,
        })
    }

    /// Chunk and embed one document
    async fn process_document(
        &self,
        document: Document,
    ) -> std::result::Result<Vec<IndexedRecord>, SkipReason> {
        if document.is_blank() {
            return Err(SkipReason::Empty);
        }

        let chunks = self.chunker.chunk_text(&document.content, &document.source);
        if chunks.is_empty() {
            return Err(SkipReason::NoChunks);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedder
            .embed_many(&texts)
            .await
            .and_then(|v| check_batch(texts.len(), &v).map(|_| v))
            .map_err(|e| SkipReason::EmbeddingFailed(e.to_string()))?;

        Ok(chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexedRecord::from_chunk(chunk, vector))
            .collect())
    }
}
