//! Configuration management for kbase.
//!
//! Loads settings from a TOML file and `KBASE_*` environment
//! variables, with defaults for everything. A configuration that
//! fails `validate()` must stop the process before it ingests or
//! answers anything.

use crate::core::answer::{PromptTemplate, DEFAULT_REFUSAL, DEFAULT_TEMPLATE};
use crate::core::error::{KbaseError, Result};
use crate::core::storage::DistanceMetric;
use crate::core::xdg::{XdgDirs, LEGACY_CONFIG};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Where source documents come from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocumentsConfig {
    #[serde(default = "default_documents_dir")]
    pub dir: PathBuf,

    /// File patterns to include (glob syntax)
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// File patterns to exclude (glob syntax)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Maximum file size in MB (skip larger files)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,
}

/// Chunking configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Characters per chunk (not bytes!)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Character overlap between consecutive chunks
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Texts per `/api/embed` request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_true")]
    pub auto_pull: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Pull the model at startup when it is not installed
    #[serde(default = "default_true")]
    pub auto_pull: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory of the index tables
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,

    #[serde(default = "default_table_name")]
    pub table_name: String,

    #[serde(default)]
    pub metric: DistanceMetric,

    /// ANN index partitions probed per query
    #[serde(default = "default_nprobe")]
    pub nprobe: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Maximum question length in characters
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Drop retrieved chunks farther than this distance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance: Option<f32>,

    /// Reply with the refusal sentence, without calling the model,
    /// when no chunk is retrieved
    #[serde(default)]
    pub refuse_without_context: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptConfig {
    #[serde(default = "default_template")]
    pub template: String,

    #[serde(default = "default_refusal")]
    pub refusal: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Timeout of embedding and chat requests, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_sec: u64,

    /// Timeout of a model pull, in seconds
    #[serde(default = "default_pull_timeout")]
    pub pull_timeout_sec: u64,
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("knowledge_base_documents")
}

fn default_include_patterns() -> Vec<String> {
    [
        "*.txt", "*.md", "*.csv", "*.tsv", "*.xlsx", "*.xls", "*.pdf", "*.docx",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_exclude_patterns() -> Vec<String> {
    [
        "**/.git/**",
        "**/node_modules/**",
        "**/target/**",
        "**/__pycache__/**",
        "**/build/**",
        "**/dist/**",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

fn default_max_file_size() -> usize {
    50
}

fn default_chunk_size() -> usize {
    700
}

fn default_overlap() -> usize {
    70
}

fn default_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

fn default_llm_model() -> String {
    "phi3:mini".to_string()
}

fn default_batch_size() -> usize {
    32
}

fn default_true() -> bool {
    true
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("./data/index")
}

fn default_table_name() -> String {
    "knowledge_base".to_string()
}

fn default_nprobe() -> usize {
    8
}

fn default_top_k() -> usize {
    3
}

fn default_max_query_length() -> usize {
    2000
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_refusal() -> String {
    DEFAULT_REFUSAL.to_string()
}

fn default_request_timeout() -> u64 {
    120
}

fn default_pull_timeout() -> u64 {
    1800
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            dir: default_documents_dir(),
            include_patterns: default_include_patterns(),
            exclude_patterns: default_exclude_patterns(),
            max_file_size_mb: default_max_file_size(),
        }
    }
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_embedding_model(),
            batch_size: default_batch_size(),
            auto_pull: true,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            model: default_llm_model(),
            auto_pull: true,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            table_name: default_table_name(),
            metric: DistanceMetric::default(),
            nprobe: default_nprobe(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_query_length: default_max_query_length(),
            max_distance: None,
            refuse_without_context: false,
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
            refusal: default_refusal(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_sec: default_request_timeout(),
            pull_timeout_sec: default_pull_timeout(),
        }
    }
}

/// Accept `host:port` the way the Ollama CLI does
fn normalize_host(host: &str) -> String {
    let host = host.trim();
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: '{}'", name, raw);
            None
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            KbaseError::ConfigError(format!("Failed to read config file {path:?}: {e}"))
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// File lookup order:
    /// 1. `KBASE_CONFIG` env var or the XDG config file
    /// 2. Legacy `./kbase.toml`
    /// 3. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let config_file = xdg.config_file();
        let mut config = if config_file.exists() {
            Self::from_file(&config_file)?
        } else if env::var("KBASE_CONFIG").is_ok() {
            return Err(KbaseError::ConfigError(format!(
                "KBASE_CONFIG points to a missing file: {config_file:?}"
            )));
        } else if Path::new(LEGACY_CONFIG).exists() {
            Self::from_file(LEGACY_CONFIG)?
        } else {
            Self::default()
        };

        // Keep indexes under the XDG data dir unless set explicitly
        if config.storage.index_dir == default_index_dir() {
            config.storage.index_dir = xdg.index_dir();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Apply `KBASE_*` environment overrides
    pub fn merge_env(&mut self) {
        if let Some(size) = parse_env("KBASE_CHUNK_SIZE") {
            self.indexing.chunk_size = size;
        }
        if let Some(overlap) = parse_env("KBASE_OVERLAP") {
            self.indexing.overlap = overlap;
        }
        if let Some(k) = parse_env("KBASE_TOP_K") {
            self.retrieval.top_k = k;
        }
        if let Ok(dir) = env::var("KBASE_DOCUMENTS_DIR") {
            self.documents.dir = PathBuf::from(dir);
        }
        if let Ok(table) = env::var("KBASE_TABLE_NAME") {
            self.storage.table_name = table;
        }
        if let Ok(model) = env::var("KBASE_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Ok(model) = env::var("KBASE_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(timeout) = parse_env("KBASE_REQUEST_TIMEOUT_SEC") {
            self.limits.request_timeout_sec = timeout;
        }

        let host = env::var("KBASE_OLLAMA_HOST").or_else(|_| env::var("OLLAMA_HOST"));
        if let Ok(host) = host {
            if !host.trim().is_empty() {
                let host = normalize_host(&host);
                self.embedding.host = host.clone();
                self.llm.host = host;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(KbaseError::ConfigError(msg.to_string()));

        if self.indexing.chunk_size == 0 {
            return fail("Chunk size must be non-zero");
        }
        if self.indexing.overlap >= self.indexing.chunk_size {
            return Err(KbaseError::ConfigError(format!(
                "Overlap ({}) must be less than chunk size ({})",
                self.indexing.overlap, self.indexing.chunk_size
            )));
        }
        if self.documents.max_file_size_mb == 0 {
            return fail("Max file size must be non-zero");
        }

        if self.embedding.batch_size == 0 {
            return fail("Embedding batch size must be non-zero");
        }
        if self.embedding.model.trim().is_empty() {
            return fail("Embedding model must be set");
        }
        if self.llm.model.trim().is_empty() {
            return fail("LLM model must be set");
        }
        for host in [&self.embedding.host, &self.llm.host] {
            if !(host.starts_with("http://") || host.starts_with("https://")) {
                return Err(KbaseError::ConfigError(format!(
                    "Service host must start with http:// or https:// (got '{host}')"
                )));
            }
        }

        let table = &self.storage.table_name;
        if table.is_empty()
            || !table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(KbaseError::ConfigError(format!(
                "Table name must be non-empty and use only [A-Za-z0-9_-] (got '{table}')"
            )));
        }
        if self.storage.nprobe == 0 {
            return fail("nprobe must be non-zero");
        }

        if self.retrieval.top_k == 0 {
            return fail("top_k must be non-zero");
        }
        if self.retrieval.max_query_length == 0 {
            return fail("Max query length must be non-zero");
        }
        if let Some(d) = self.retrieval.max_distance {
            if !d.is_finite() || d < 0.0 {
                return fail("max_distance must be a finite number >= 0");
            }
        }

        PromptTemplate::parse(&self.prompt.template)?;
        if self.prompt.refusal.trim().is_empty() {
            return fail("Refusal sentence must not be empty");
        }

        if self.limits.request_timeout_sec == 0 {
            return fail("Request timeout must be non-zero");
        }
        if self.limits.pull_timeout_sec == 0 {
            return fail("Pull timeout must be non-zero");
        }

        Ok(())
    }

    /// Log the effective configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Documents dir: {:?}", self.documents.dir);
        tracing::info!(
            "  Chunking: {} chars, {} overlap",
            self.indexing.chunk_size,
            self.indexing.overlap
        );
        tracing::info!(
            "  Embedding: {} @ {} (batch {})",
            self.embedding.model,
            self.embedding.host,
            self.embedding.batch_size
        );
        tracing::info!("  LLM: {} @ {}", self.llm.model, self.llm.host);
        tracing::info!(
            "  Index: {:?} table '{}' ({})",
            self.storage.index_dir,
            self.storage.table_name,
            self.storage.metric
        );
        tracing::info!("  Top k: {}", self.retrieval.top_k);
        if let Some(d) = self.retrieval.max_distance {
            tracing::info!("  Max distance: {}", d);
        }
        tracing::info!("  Request timeout: {}s", self.limits.request_timeout_sec);
    }
}
