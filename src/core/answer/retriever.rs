//! Query-time retrieval.
//!
//! Embeds the query, searches the active generation and applies the
//! optional distance cutoff. Used in two modes: `retrieve` never fails
//! and degrades to an empty result, `try_retrieve` surfaces errors for
//! callers that want them.

use std::sync::Arc;

use crate::core::embedding::Embedder;
use crate::core::error::Result;
use crate::core::storage::VectorIndex;
use crate::core::types::RetrievalResult;

pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    top_k: usize,
    max_distance: Option<f32>,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        top_k: usize,
        max_distance: Option<f32>,
    ) -> Self {
        Self {
            embedder,
            index,
            top_k,
            max_distance,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Top-k chunks for `query`, or an empty result on any failure
    pub async fn retrieve(&self, query: &str) -> RetrievalResult {
        let vector = match self.embedder.embed_one(query).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Query embedding failed, continuing without context: {}", e);
                return Vec::new();
            }
        };

        match self.index.exists_and_nonempty().await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Index is empty; no context available");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!("Failed to open index, continuing without context: {}", e);
                return Vec::new();
            }
        }

        match self.index.search(&vector, self.top_k).await {
            Ok(hits) => {
                let hits = self.apply_cutoff(hits);
                tracing::info!("Retrieved {} relevant chunks", hits.len());
                hits
            }
            Err(e) => {
                tracing::warn!("Vector search failed, continuing without context: {}", e);
                Vec::new()
            }
        }
    }

    /// Top-`k` chunks for `query`, propagating embedding and storage
    /// errors
    pub async fn try_retrieve(&self, query: &str, k: usize) -> Result<RetrievalResult> {
        let vector = self.embedder.embed_one(query).await?;
        let hits = self.index.search(&vector, k).await?;
        Ok(self.apply_cutoff(hits))
    }

    fn apply_cutoff(&self, hits: RetrievalResult) -> RetrievalResult {
        match self.max_distance {
            Some(limit) => {
                let before = hits.len();
                let kept: RetrievalResult =
                    hits.into_iter().filter(|h| h.distance <= limit).collect();
                if kept.len() < before {
                    tracing::debug!(
                        "Dropped {} chunks beyond max_distance {}",
                        before - kept.len(),
                        limit
                    );
                }
                kept
            }
            None => hits,
        }
    }
}
