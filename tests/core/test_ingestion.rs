//! Ingestion tests: generation replacement and per-document failures

use crate::common::{
    echo_services, known_text, test_services_with, EchoChat, FailingEmbedder, HashingEmbedder,
};
use kbase::core::config::Config;
use kbase::core::indexer::{Chunker, IngestionPipeline};
use kbase::core::storage::{DistanceMetric, LanceVectorIndex, VectorIndex};
use kbase::{Document, SkipReason};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_ingest_builds_first_generation() {
    let ts = echo_services();
    let pipeline = ts.services.ingestion_pipeline().unwrap();

    let report = pipeline
        .ingest(vec![
            Document::new("a.txt", known_text(1500)),
            Document::new("b.txt", "A short note about refunds."),
        ])
        .await
        .unwrap();

    assert_eq!(report.documents_total, 2);
    assert_eq!(report.documents_indexed, 2);
    assert_eq!(report.chunks_created, 4);
    assert!(report.skipped.is_empty());

    let generation = report.generation.unwrap();
    assert_eq!(generation.record_count, 4);
    assert_eq!(generation.document_count, 2);
    assert_eq!(generation.dimension, 64);
    assert_eq!(generation.embedding_model, "hashing-test");
    assert_eq!((generation.chunk_size, generation.overlap), (700, 70));

    assert!(ts.services.index.exists_and_nonempty().await.unwrap());
}

#[tokio::test]
async fn test_second_ingest_replaces_everything() {
    let ts = echo_services();
    let pipeline = ts.services.ingestion_pipeline().unwrap();

    let first = pipeline
        .ingest(vec![Document::new("old.txt", "Old content about the warehouse.")])
        .await
        .unwrap();
    let second = pipeline
        .ingest(vec![Document::new("new.txt", "New content about refunds.")])
        .await
        .unwrap();

    assert_ne!(first.generation.unwrap().id, second.generation.unwrap().id);

    let query = HashingEmbedder::default().vector("Old content about the warehouse.");
    let hits = ts.services.index.search(&query, 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, "new.txt");
}

#[tokio::test]
async fn test_reingesting_same_input_gives_same_records() {
    let ts = echo_services();
    let pipeline = ts.services.ingestion_pipeline().unwrap();
    let docs = vec![
        Document::new("a.txt", known_text(1500)),
        Document::new("b.txt", known_text(300)),
    ];

    pipeline.ingest(docs.clone()).await.unwrap();
    let query = HashingEmbedder::default().vector("word0042");
    let before = ts.services.index.search(&query, 10).await.unwrap();

    pipeline.ingest(docs).await.unwrap();
    let after = ts.services.index.search(&query, 10).await.unwrap();

    assert_eq!(before, after);
    assert_eq!(
        ts.services.index.current_metadata().await.unwrap().unwrap().record_count,
        4
    );
}

#[tokio::test]
async fn test_blank_documents_are_skipped() {
    let ts = echo_services();
    let pipeline = ts.services.ingestion_pipeline().unwrap();

    let report = pipeline
        .ingest(vec![
            Document::new("blank.txt", "  \n  "),
            Document::new("real.txt", "Some real text."),
        ])
        .await
        .unwrap();

    assert_eq!(report.documents_indexed, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].source, "blank.txt");
    assert_eq!(report.skipped[0].reason, SkipReason::Empty);
}

#[tokio::test]
async fn test_embedding_outage_leaves_previous_generation() {
    let dir = TempDir::new().unwrap();
    let index: Arc<dyn VectorIndex> =
        Arc::new(LanceVectorIndex::open(dir.path(), "kb", DistanceMetric::L2, 8).unwrap());
    let chunker = Chunker::new(700, 70).unwrap();

    let healthy = IngestionPipeline::new(
        chunker.clone(),
        Arc::new(HashingEmbedder::default()),
        Arc::clone(&index),
    );
    let first = healthy
        .ingest(vec![Document::new("a.txt", "Kept from the first run.")])
        .await
        .unwrap();

    let broken = IngestionPipeline::new(chunker, Arc::new(FailingEmbedder), Arc::clone(&index));
    let report = broken
        .ingest(vec![Document::new("b.txt", "Never embedded.")])
        .await
        .unwrap();

    assert_eq!(report.documents_indexed, 0);
    assert!(!report.replaced_index());
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::EmbeddingFailed(_)
    ));

    let current = index.current_metadata().await.unwrap().unwrap();
    assert_eq!(current.id, first.generation.unwrap().id);
}

#[tokio::test]
async fn test_each_document_is_embedded_in_one_batch() {
    let dir = TempDir::new().unwrap();
    let embedder = Arc::new(HashingEmbedder::default());
    let pipeline = IngestionPipeline::new(
        Chunker::new(700, 70).unwrap(),
        embedder.clone(),
        Arc::new(LanceVectorIndex::open(dir.path(), "kb", DistanceMetric::L2, 8).unwrap()),
    );

    let report = pipeline
        .ingest(vec![
            Document::new("long.txt", known_text(2000)),
            Document::new("blank.txt", "   "),
            Document::new("short.txt", "One chunk only."),
        ])
        .await
        .unwrap();

    assert_eq!(report.chunks_created, 5);
    // blank documents are skipped before embedding
    assert_eq!(embedder.calls(), 2);
}

#[tokio::test]
async fn test_configured_chunking_flows_into_pipeline() {
    let mut config = Config::default();
    config.indexing.chunk_size = 200;
    config.indexing.overlap = 20;
    let ts = test_services_with(
        config,
        Arc::new(HashingEmbedder::default()),
        Arc::new(EchoChat),
    );

    let report = ts
        .services
        .ingestion_pipeline()
        .unwrap()
        .ingest(vec![Document::new("a.txt", known_text(540))])
        .await
        .unwrap();

    // windows start at 0, 180, 360
    assert_eq!(report.chunks_created, 3);
    assert_eq!(report.generation.unwrap().chunk_size, 200);
}
