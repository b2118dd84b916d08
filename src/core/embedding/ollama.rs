//! Ollama `/api/embed` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{check_batch, Embedder};
use crate::core::error::{KbaseError, Result};
use crate::core::ollama::OllamaClient;
use crate::core::types::EmbeddingVector;

pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    batch_size: usize,
    auto_pull: bool,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<EmbeddingVector>,
}

impl OllamaEmbedder {
    pub fn new(
        client: Arc<OllamaClient>,
        model: impl Into<String>,
        batch_size: usize,
        auto_pull: bool,
    ) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(KbaseError::ConfigError(
                "embedding model must not be empty".to_string(),
            ));
        }
        if batch_size == 0 {
            return Err(KbaseError::ConfigError(
                "embedding batch_size must be > 0".to_string(),
            ));
        }

        Ok(Self {
            client,
            model,
            batch_size,
            auto_pull,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<EmbeddingVector>> {
        let request = EmbedRequest {
            model: &self.model,
            input: inputs,
        };
        let reply: EmbedResponse = self
            .client
            .post_json("/api/embed", &request)
            .await
            .map_err(|e| KbaseError::EmbeddingFailed(e.to_string()))?;

        check_batch(inputs.len(), &reply.embeddings)?;
        Ok(reply.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            tracing::debug!("Embedding batch of {} texts with {}", batch.len(), self.model);
            out.extend(self.embed_batch(batch).await?);
        }

        // Sub-batches must agree on dimension too
        check_batch(texts.len(), &out)?;
        Ok(out)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn ensure_ready(&self) -> Result<()> {
        self.client.ensure_model(&self.model, self.auto_pull).await
    }
}
