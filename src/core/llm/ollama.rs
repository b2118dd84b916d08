//! Ollama `/api/chat` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ChatModel;
use crate::core::error::{KbaseError, Result};
use crate::core::ollama::OllamaClient;

pub struct OllamaChat {
    client: Arc<OllamaClient>,
    model: String,
    auto_pull: bool,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

impl OllamaChat {
    pub fn new(client: Arc<OllamaClient>, model: impl Into<String>, auto_pull: bool) -> Result<Self> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(KbaseError::ConfigError(
                "llm model must not be empty".to_string(),
            ));
        }
        Ok(Self {
            client,
            model,
            auto_pull,
        })
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn chat(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let reply: ChatResponse = self
            .client
            .post_json("/api/chat", &request)
            .await
            .map_err(|e| KbaseError::ChatFailed(e.to_string()))?;

        Ok(reply.message.content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn ensure_ready(&self) -> Result<()> {
        self.client.ensure_model(&self.model, self.auto_pull).await
    }
}
