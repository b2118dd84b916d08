//! Per-query answer orchestration.
//!
//! `EMBED_QUERY -> RETRIEVE -> ASSEMBLE_CONTEXT -> GENERATE`, where any
//! failure degrades to the next weaker result instead of an error. Only
//! an invalid question is rejected up front.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use super::prompt::{build_context, PromptTemplate, GENERATION_APOLOGY};
use super::retriever::Retriever;
use crate::core::error::{KbaseError, Result};
use crate::core::llm::ChatModel;
use crate::core::types::RetrievedChunk;

/// How an answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The chat model replied
    Generated,

    /// No context survived retrieval and local refusal is enabled
    RefusedWithoutContext,

    /// The chat model failed; the text is the local apology
    GenerationFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<RetrievedChunk>,
    pub outcome: AnswerOutcome,
    pub duration_ms: u64,
}

pub struct AnswerService {
    retriever: Retriever,
    chat: Arc<dyn ChatModel>,
    template: PromptTemplate,
    refusal: String,
    refuse_without_context: bool,
    max_query_length: usize,
}

impl AnswerService {
    pub fn new(
        retriever: Retriever,
        chat: Arc<dyn ChatModel>,
        template: PromptTemplate,
        refusal: impl Into<String>,
    ) -> Self {
        Self {
            retriever,
            chat,
            template,
            refusal: refusal.into(),
            refuse_without_context: false,
            max_query_length: 2000,
        }
    }

    /// Answer with the refusal sentence, without calling the model,
    /// when retrieval yields nothing
    pub fn with_refuse_without_context(mut self, refuse: bool) -> Self {
        self.refuse_without_context = refuse;
        self
    }

    pub fn with_max_query_length(mut self, max_chars: usize) -> Self {
        self.max_query_length = max_chars;
        self
    }

    /// Answer a question from the knowledge base.
    ///
    /// # Errors
    ///
    /// Only `InvalidQuery`, for a blank or over-long question. Every
    /// later failure is absorbed into the returned `Answer`.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let question = self.validate(question)?;
        let start = Instant::now();
        tracing::info!("Processing query: '{}'", question);

        let sources = self.retriever.retrieve(question).await;

        if sources.is_empty() && self.refuse_without_context {
            tracing::info!("No context retrieved; refusing without generation");
            return Ok(Answer {
                text: self.refusal.clone(),
                sources,
                outcome: AnswerOutcome::RefusedWithoutContext,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }
        if sources.is_empty() {
            tracing::warn!("Generating without any retrieved context");
        }

        let prompt = self.prompt_for(question, &sources);
        tracing::debug!("Prompt: {} chars, {} context chunks", prompt.len(), sources.len());

        let (text, outcome) = match self.chat.chat(&prompt).await {
            Ok(reply) => {
                tracing::info!("Answer received from {}", self.chat.model_name());
                (reply, AnswerOutcome::Generated)
            }
            Err(e) => {
                tracing::error!("Chat model {} failed: {}", self.chat.model_name(), e);
                (GENERATION_APOLOGY.to_string(), AnswerOutcome::GenerationFailed)
            }
        };

        Ok(Answer {
            text,
            sources,
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// The grounded prompt sent to the model for `question` and `sources`
    pub fn prompt_for(&self, question: &str, sources: &[RetrievedChunk]) -> String {
        self.template
            .render(&build_context(sources), question, &self.refusal)
    }

    fn validate<'q>(&self, question: &'q str) -> Result<&'q str> {
        let question = question.trim();
        if question.is_empty() {
            return Err(KbaseError::InvalidQuery(
                "question must not be empty".to_string(),
            ));
        }
        let len = question.chars().count();
        if len > self.max_query_length {
            return Err(KbaseError::InvalidQuery(format!(
                "question is {len} characters (max {})",
                self.max_query_length
            )));
        }
        Ok(question)
    }
}
