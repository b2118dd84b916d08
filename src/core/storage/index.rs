//! LanceDB-backed vector index with whole-generation replacement.
//!
//! Each ingestion overwrites the table in a single commit. The generation
//! metadata is stored in the Arrow schema metadata of that same commit,
//! so a reader always gets records and metadata of one generation.

use arrow_array::types::Float32Type;
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, Int64Array, RecordBatch, RecordBatchIterator,
    StringArray,
};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use lancedb::database::CreateTableMode;
use lancedb::index::Index;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::table::OptimizeAction;
use lancedb::{connect, Connection, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

use super::metric::DistanceMetric;
use crate::core::error::{KbaseError, Result};
use crate::core::types::{IndexedRecord, RetrievalResult, RetrievedChunk};

/// On-disk format version of a generation
pub const SCHEMA_VERSION: u32 = 2;

/// Generations smaller than this are searched without an ANN index
pub const MIN_INDEXED_RECORDS: usize = 256;

/// Schema metadata key holding the serialized `GenerationMetadata`
const GENERATION_KEY: &str = "kbase.generation";

/// Candidates re-ranked with exact distances per requested hit
const REFINE_FACTOR: u32 = 4;

/// Parameters of the ingestion run that produced a generation
#[derive(Debug, Clone, Default)]
pub struct GenerationInfo {
    pub embedding_model: String,
    pub chunk_size: usize,
    pub overlap: usize,
    pub document_count: usize,
}

/// Metadata stored alongside each generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    pub id: String,
    pub table: String,
    pub created_at: DateTime<Utc>,
    pub record_count: usize,
    pub document_count: usize,
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub overlap: usize,
    /// True when an ANN index was built for this generation
    pub accelerated: bool,
    pub schema_version: u32,
}

/// Read/replace contract of the vector store.
///
/// Only ingestion calls `replace_all`; retrieval only reads.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Discard the current generation and install `records` as the
    /// new one.
    async fn replace_all(
        &self,
        records: Vec<IndexedRecord>,
        info: GenerationInfo,
    ) -> Result<GenerationMetadata>;

    /// Up to `k` nearest records, closest first. Empty when no
    /// generation exists.
    async fn search(&self, query: &[f32], k: usize) -> Result<RetrievalResult>;

    async fn exists_and_nonempty(&self) -> Result<bool>;

    async fn current_metadata(&self) -> Result<Option<GenerationMetadata>>;
}

/// Vector index stored as one LanceDB table under `{index_dir}/`
pub struct LanceVectorIndex {
    index_dir: PathBuf,
    table: String,
    metric: DistanceMetric,
    nprobe: usize,
    connection: OnceCell<Connection>,
    /// Serializes `replace_all` calls made through this handle
    write_lock: Mutex<()>,
}

impl LanceVectorIndex {
    /// Prepare a handle on `table`. The database is opened on first use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an empty table name or a zero `nprobe`.
    pub fn open(
        index_dir: &Path,
        table: &str,
        metric: DistanceMetric,
        nprobe: usize,
    ) -> Result<Self> {
        if table.is_empty() {
            return Err(KbaseError::ConfigError(
                "table name must not be empty".to_string(),
            ));
        }
        if nprobe == 0 {
            return Err(KbaseError::ConfigError("nprobe must be > 0".to_string()));
        }

        Ok(Self {
            index_dir: index_dir.to_path_buf(),
            table: table.to_string(),
            metric,
            nprobe,
            connection: OnceCell::new(),
            write_lock: Mutex::new(()),
        })
    }

    async fn connection(&self) -> Result<&Connection> {
        self.connection
            .get_or_try_init(|| async {
                tokio::fs::create_dir_all(&self.index_dir).await?;
                tracing::debug!("Connecting to vector store at {:?}", self.index_dir);
                let uri = self.index_dir.to_string_lossy();
                Ok::<_, KbaseError>(connect(&uri).execute().await?)
            })
            .await
    }

    /// The table, or `None` before the first ingestion
    async fn open_table(&self) -> Result<Option<Table>> {
        let db = self.connection().await?;
        let names = db.table_names().execute().await?;
        if !names.iter().any(|name| name == &self.table) {
            return Ok(None);
        }
        Ok(Some(db.open_table(&self.table).execute().await?))
    }

    /// Build the ANN index, then compact and drop superseded versions.
    /// Both steps are best effort; flat search stays correct without them.
    async fn accelerate(&self, table: &Table, record_count: usize) -> bool {
        let built = if record_count < MIN_INDEXED_RECORDS {
            tracing::debug!(
                "Skipping vector index: {} records (< {})",
                record_count,
                MIN_INDEXED_RECORDS
            );
            false
        } else {
            match table.create_index(&["vector"], Index::Auto).execute().await {
                Ok(()) => {
                    tracing::info!("Built vector index for table '{}'", self.table);
                    true
                }
                Err(e) => {
                    tracing::warn!("Vector index build failed, using flat search: {}", e);
                    false
                }
            }
        };

        if let Err(e) = table.optimize(OptimizeAction::All).await {
            tracing::warn!("Failed to compact table '{}': {}", self.table, e);
        }

        built
    }
}

#[async_trait]
impl VectorIndex for LanceVectorIndex {
    async fn replace_all(
        &self,
        records: Vec<IndexedRecord>,
        info: GenerationInfo,
    ) -> Result<GenerationMetadata> {
        if records.is_empty() {
            return Err(KbaseError::StorageError(
                "refusing to install an empty generation".to_string(),
            ));
        }

        let dimension = records[0].vector.len();
        if dimension == 0 {
            return Err(KbaseError::StorageError(
                "embedding vectors must not be empty".to_string(),
            ));
        }
        if let Some(bad) = records.iter().find(|r| r.vector.len() != dimension) {
            return Err(KbaseError::DimensionMismatch {
                expected: dimension,
                actual: bad.vector.len(),
            });
        }

        let _guard = self.write_lock.lock().await;

        let mut meta = GenerationMetadata {
            id: new_generation_id(),
            table: self.table.clone(),
            created_at: Utc::now(),
            record_count: records.len(),
            document_count: info.document_count,
            dimension,
            metric: self.metric,
            embedding_model: info.embedding_model,
            chunk_size: info.chunk_size,
            overlap: info.overlap,
            accelerated: false,
            schema_version: SCHEMA_VERSION,
        };

        let schema = record_schema(dimension, &meta)?;
        let batch = record_batch(&records, dimension, Arc::clone(&schema))?;

        let db = self.connection().await?;
        let table = db
            .create_table(
                &self.table,
                RecordBatchIterator::new(vec![Ok(batch)], schema),
            )
            .mode(CreateTableMode::Overwrite)
            .execute()
            .await?;

        tracing::info!(
            "Installed generation {} in table '{}' ({} records, dim {})",
            meta.id,
            self.table,
            records.len(),
            dimension
        );

        meta.accelerated = self.accelerate(&table, records.len()).await;
        Ok(meta)
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let Some(table) = self.open_table().await? else {
            return Ok(Vec::new());
        };

        let table_schema = table.schema().await?;
        let dimension = vector_dimension(&table_schema)?;
        if query.len() != dimension {
            return Err(KbaseError::DimensionMismatch {
                expected: dimension,
                actual: query.len(),
            });
        }

        let batches: Vec<RecordBatch> = table
            .query()
            .nearest_to(query.to_vec())?
            .distance_type(self.metric.distance_type())
            .nprobes(self.nprobe)
            .refine_factor(REFINE_FACTOR)
            .limit(k)
            .execute()
            .await?
            .try_collect()
            .await?;

        let mut ranked = Vec::new();
        for batch in &batches {
            ranked.extend(read_hits(batch)?);
        }

        // Equal distances keep insertion order
        ranked.sort_by(|a, b| a.1.distance.total_cmp(&b.1.distance).then(a.0.cmp(&b.0)));
        ranked.truncate(k);

        Ok(ranked.into_iter().map(|(_, hit)| hit).collect())
    }

    async fn exists_and_nonempty(&self) -> Result<bool> {
        match self.open_table().await? {
            Some(table) => Ok(table.count_rows(None).await? > 0),
            None => Ok(false),
        }
    }

    async fn current_metadata(&self) -> Result<Option<GenerationMetadata>> {
        let Some(table) = self.open_table().await? else {
            return Ok(None);
        };

        let schema = table.schema().await?;
        let raw = schema.metadata().get(GENERATION_KEY).ok_or_else(|| {
            KbaseError::StorageError(format!(
                "Table '{}' has no generation metadata. Re-run ingestion.",
                self.table
            ))
        })?;
        let mut meta: GenerationMetadata = serde_json::from_str(raw)?;
        if meta.schema_version != SCHEMA_VERSION {
            return Err(KbaseError::StorageError(format!(
                "Generation '{}' uses schema v{} (current: v{}). Re-run ingestion.",
                meta.id, meta.schema_version, SCHEMA_VERSION
            )));
        }

        meta.accelerated = match table.list_indices().await {
            Ok(indices) => !indices.is_empty(),
            Err(e) => {
                tracing::warn!("Failed to list indices of table '{}': {}", self.table, e);
                false
            }
        };
        Ok(Some(meta))
    }
}

fn new_generation_id() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%.6fZ").to_string()
}

fn record_schema(dimension: usize, meta: &GenerationMetadata) -> Result<SchemaRef> {
    let dimension = i32::try_from(dimension).map_err(|_| {
        KbaseError::StorageError(format!("vector dimension {dimension} is too large"))
    })?;
    let metadata = HashMap::from([(GENERATION_KEY.to_string(), serde_json::to_string(meta)?)]);

    Ok(Arc::new(Schema::new_with_metadata(
        vec![
            Field::new("position", DataType::Int64, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("chunk_index", DataType::Int64, false),
            Field::new("text", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    dimension,
                ),
                false,
            ),
        ],
        metadata,
    )))
}

fn record_batch(
    records: &[IndexedRecord],
    dimension: usize,
    schema: SchemaRef,
) -> Result<RecordBatch> {
    let dimension = i32::try_from(dimension).map_err(|_| {
        KbaseError::StorageError(format!("vector dimension {dimension} is too large"))
    })?;

    let positions = Int64Array::from_iter_values(0..records.len() as i64);
    let sources = StringArray::from_iter_values(records.iter().map(|r| r.source.as_str()));
    let chunk_indices =
        Int64Array::from_iter_values(records.iter().map(|r| r.chunk_index as i64));
    let texts = StringArray::from_iter_values(records.iter().map(|r| r.text.as_str()));
    let vectors = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
        records
            .iter()
            .map(|r| Some(r.vector.iter().copied().map(Some).collect::<Vec<_>>())),
        dimension,
    );

    RecordBatch::try_new(
        schema,
        vec![
            Arc::new(positions),
            Arc::new(sources),
            Arc::new(chunk_indices),
            Arc::new(texts),
            Arc::new(vectors),
        ],
    )
    .map_err(|e| KbaseError::StorageError(format!("Failed to build record batch: {e}")))
}

fn vector_dimension(schema: &Schema) -> Result<usize> {
    match schema.field_with_name("vector").map(|f| f.data_type()) {
        Ok(DataType::FixedSizeList(_, dim)) => Ok(*dim as usize),
        _ => Err(KbaseError::StorageError(
            "table has no fixed-size 'vector' column".to_string(),
        )),
    }
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| KbaseError::StorageError(format!("search result lacks column '{name}'")))
}

/// `(position, hit)` pairs of one result batch
fn read_hits(batch: &RecordBatch) -> Result<Vec<(i64, RetrievedChunk)>> {
    let positions = column::<Int64Array>(batch, "position")?;
    let sources = column::<StringArray>(batch, "source")?;
    let chunk_indices = column::<Int64Array>(batch, "chunk_index")?;
    let texts = column::<StringArray>(batch, "text")?;
    let distances = column::<Float32Array>(batch, "_distance")?;

    Ok((0..batch.num_rows())
        .map(|i| {
            (
                positions.value(i),
                RetrievedChunk {
                    source: sources.value(i).to_string(),
                    chunk_index: chunk_indices.value(i) as usize,
                    text: texts.value(i).to_string(),
                    distance: distances.value(i),
                },
            )
        })
        .collect())
}
