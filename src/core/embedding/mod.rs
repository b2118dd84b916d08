//! Embedding adapter.
//!
//! Converts chunk and query text into fixed-dimension vectors through
//! an external embedding service.

mod ollama;

pub use ollama::OllamaEmbedder;

use async_trait::async_trait;

use crate::core::error::{KbaseError, Result};
use crate::core::types::EmbeddingVector;

/// Text-to-vector service
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch; one vector per input, in input order
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>>;

    async fn embed_one(&self, text: &str) -> Result<EmbeddingVector> {
        let mut vectors = self.embed_many(&[text.to_string()]).await?;
        check_batch(1, &vectors)?;
        Ok(vectors.remove(0))
    }

    /// Model identifier recorded in generation metadata
    fn model_name(&self) -> &str;

    /// Verify the service can serve requests
    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }
}

/// Check a batch reply: `expected` vectors, all non-empty and of one
/// dimension
pub fn check_batch(expected: usize, vectors: &[EmbeddingVector]) -> Result<()> {
    if vectors.len() != expected {
        return Err(KbaseError::EmbeddingFailed(format!(
            "service returned {} embeddings for {} inputs",
            vectors.len(),
            expected
        )));
    }

    let Some(first) = vectors.first() else {
        return Ok(());
    };
    if first.is_empty() {
        return Err(KbaseError::EmbeddingFailed(
            "service returned an empty embedding".to_string(),
        ));
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != first.len()) {
        return Err(KbaseError::DimensionMismatch {
            expected: first.len(),
            actual: bad.len(),
        });
    }
    Ok(())
}
