//! Tests for the ingest CLI command
//!
//! - Ingesting a document directory (human and JSON output)
//! - One embedding batch per loaded document
//! - Empty directory leaves the index untouched
//! - Missing directory is an error

use crate::cli::test_helpers::cli_services;
use crate::common::{test_services_with, DocDir, EchoChat, HashingEmbedder};
use kbase::cli::commands::ingest::{execute, IngestArgs};
use kbase::cli::OutputFormat;
use kbase::core::config::Config;
use std::sync::Arc;

fn args() -> IngestArgs {
    IngestArgs {
        dir: None,
        chunk_size: None,
        overlap: None,
        quiet: true,
    }
}

#[tokio::test]
async fn test_ingest_directory_human() {
    let docs = DocDir::small();
    let ts = cli_services(docs.path());

    let result = execute(args(), &ts.services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Ingest should succeed: {:?}", result.err());

    let meta = ts.services.index.current_metadata().await.unwrap().unwrap();
    assert_eq!(meta.document_count, 3);
    assert_eq!(meta.record_count, 3);
}

#[tokio::test]
async fn test_ingest_directory_json() {
    let docs = DocDir::small();
    let ts = cli_services(docs.path());

    let result = execute(args(), &ts.services, OutputFormat::Json).await;
    assert!(result.is_ok(), "Ingest should succeed: {:?}", result.err());
    assert!(ts.services.index.exists_and_nonempty().await.unwrap());
}

#[tokio::test]
async fn test_ingest_embeds_each_document_once() {
    let docs = DocDir::small();
    let mut config = Config::default();
    config.documents.dir = docs.path().to_path_buf();
    let embedder = Arc::new(HashingEmbedder::default());
    let ts = test_services_with(config, embedder.clone(), Arc::new(EchoChat));

    execute(args(), &ts.services, OutputFormat::Human)
        .await
        .unwrap();

    // three non-empty documents; the blank one never reaches the embedder
    assert_eq!(embedder.calls(), 3);
}

#[tokio::test]
async fn test_ingest_empty_directory_keeps_index() {
    let docs = DocDir::with_files(&[("image.png", "binary")]);
    let ts = cli_services(docs.path());

    let result = execute(args(), &ts.services, OutputFormat::Human).await;
    assert!(result.is_ok());
    assert!(ts.services.index.current_metadata().await.unwrap().is_none());
}

#[tokio::test]
async fn test_ingest_missing_directory_fails() {
    let ts = cli_services(std::path::Path::new("/no/such/kbase/docs"));

    let result = execute(args(), &ts.services, OutputFormat::Human).await;
    let err = result.unwrap_err().to_string();
    assert!(err.contains("not found"), "unexpected error: {err}");
}
