// Deterministic stand-ins for the Ollama services

use async_trait::async_trait;
use kbase::core::embedding::Embedder;
use kbase::core::llm::ChatModel;
use kbase::{EmbeddingVector, KbaseError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Embeds text as a normalized histogram of hashed character trigrams.
///
/// Identical texts map to identical vectors; texts sharing many trigrams
/// land close together.
pub struct HashingEmbedder {
    dimension: usize,
    calls: AtomicUsize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed_many` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn vector(&self, text: &str) -> EmbeddingVector {
        let chars: Vec<char> = text.to_lowercase().chars().collect();
        let mut v = vec![0.0f32; self.dimension];

        for gram in chars.windows(3) {
            // FNV-1a
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for c in gram {
                hash ^= *c as u64;
                hash = hash.wrapping_mul(0x0100_0000_01b3);
            }
            v[(hash % self.dimension as u64) as usize] += 1.0;
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        } else {
            v[0] = 1.0;
        }
        v
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_many(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "hashing-test"
    }
}

/// Embedding service that is always down
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_many(&self, _texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        Err(KbaseError::EmbeddingFailed("connection refused".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }
}

/// Chat model that replies with the prompt it was given
pub struct EchoChat;

#[async_trait]
impl ChatModel for EchoChat {
    async fn chat(&self, prompt: &str) -> Result<String> {
        Ok(prompt.to_string())
    }

    fn model_name(&self) -> &str {
        "echo-test"
    }
}

/// Chat model that always fails
pub struct FailingChat;

#[async_trait]
impl ChatModel for FailingChat {
    async fn chat(&self, _prompt: &str) -> Result<String> {
        Err(KbaseError::ChatFailed("model crashed".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }
}
