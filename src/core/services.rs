//! Unified service container for kbase
//!
//! Holds the long-lived index and service handles shared by the
//! ingestion and answer orchestrators.

use crate::core::answer::{AnswerService, PromptTemplate, Retriever};
use crate::core::config::Config;
use crate::core::embedding::{Embedder, OllamaEmbedder};
use crate::core::error::Result;
use crate::core::indexer::{Chunker, DocumentLoader, IngestionPipeline};
use crate::core::llm::{ChatModel, OllamaChat};
use crate::core::ollama::OllamaClient;
use crate::core::storage::{LanceVectorIndex, VectorIndex};
use std::sync::Arc;
use std::time::Duration;

/// Which external services a command needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Embedding model only (ingest, search)
    Embedder,

    /// Embedding and chat models (ask)
    EmbedderAndChat,
}

/// Unified services container
#[derive(Clone)]
pub struct Services {
    pub config: Arc<Config>,
    pub index: Arc<dyn VectorIndex>,
    pub embedder: Arc<dyn Embedder>,
    pub chat: Arc<dyn ChatModel>,
}

impl Services {
    /// Build the Ollama-backed services from a validated config
    pub fn new(config: Config) -> Result<Self> {
        let request_timeout = Duration::from_secs(config.limits.request_timeout_sec);
        let pull_timeout = Duration::from_secs(config.limits.pull_timeout_sec);

        let embed_client = Arc::new(OllamaClient::new(
            &config.embedding.host,
            request_timeout,
            pull_timeout,
        )?);
        let chat_client = if config.llm.host == config.embedding.host {
            Arc::clone(&embed_client)
        } else {
            Arc::new(OllamaClient::new(
                &config.llm.host,
                request_timeout,
                pull_timeout,
            )?)
        };

        let embedder = Arc::new(OllamaEmbedder::new(
            embed_client,
            config.embedding.model.clone(),
            config.embedding.batch_size,
            config.embedding.auto_pull,
        )?);
        let chat = Arc::new(OllamaChat::new(
            chat_client,
            config.llm.model.clone(),
            config.llm.auto_pull,
        )?);

        let index = Arc::new(LanceVectorIndex::open(
            &config.storage.index_dir,
            &config.storage.table_name,
            config.storage.metric,
            config.storage.nprobe,
        )?);

        Ok(Self::with_components(config, index, embedder, chat))
    }

    /// Assemble services from explicit components
    pub fn with_components(
        config: Config,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            index,
            embedder,
            chat,
        }
    }

    /// Check the models a command depends on
    pub async fn ensure_ready(&self, needs: Readiness) -> Result<()> {
        self.embedder.ensure_ready().await?;
        if needs == Readiness::EmbedderAndChat {
            self.chat.ensure_ready().await?;
        }
        Ok(())
    }

    pub fn document_loader(&self) -> Result<DocumentLoader> {
        DocumentLoader::from_config(&self.config.documents)
    }

    pub fn ingestion_pipeline(&self) -> Result<IngestionPipeline> {
        let chunker = Chunker::new(
            self.config.indexing.chunk_size,
            self.config.indexing.overlap,
        )?;
        Ok(IngestionPipeline::new(
            chunker,
            Arc::clone(&self.embedder),
            Arc::clone(&self.index),
        ))
    }

    pub fn retriever(&self) -> Retriever {
        Retriever::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.index),
            self.config.retrieval.top_k,
            self.config.retrieval.max_distance,
        )
    }

    pub fn answer_service(&self) -> Result<AnswerService> {
        let template = PromptTemplate::parse(&self.config.prompt.template)?;
        Ok(AnswerService::new(
            self.retriever(),
            Arc::clone(&self.chat),
            template,
            self.config.prompt.refusal.clone(),
        )
        .with_refuse_without_context(self.config.retrieval.refuse_without_context)
        .with_max_query_length(self.config.retrieval.max_query_length))
    }
}
