//! Tests for the status CLI command

use crate::cli::test_helpers::{cli_services, ingested_services};
use crate::common::DocDir;
use kbase::cli::commands::status::{execute, StatusArgs};
use kbase::cli::OutputFormat;

#[tokio::test]
async fn test_status_without_generation() {
    let docs = DocDir::small();
    let ts = cli_services(docs.path());

    for format in [OutputFormat::Human, OutputFormat::Json] {
        assert!(execute(StatusArgs {}, &ts.services, format).await.is_ok());
    }
}

#[tokio::test]
async fn test_status_with_generation() {
    let (ts, _docs) = ingested_services().await;

    for format in [OutputFormat::Human, OutputFormat::Json] {
        assert!(execute(StatusArgs {}, &ts.services, format).await.is_ok());
    }
}
