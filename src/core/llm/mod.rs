//! Chat-completion adapter.

mod ollama;

pub use ollama::OllamaChat;

use async_trait::async_trait;

use crate::core::error::Result;

/// Single-turn chat service: one prompt in, one reply out
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;

    async fn ensure_ready(&self) -> Result<()> {
        Ok(())
    }
}
