//! Tests for the ask CLI command
//!
//! - Refusal to start on an empty index
//! - One-shot answers
//! - Interactive session handling of blank lines and exit commands

use crate::cli::test_helpers::{cli_services, ingested_services};
use crate::common::DocDir;
use kbase::cli::commands::ask::{execute, run_session, AskArgs};
use kbase::cli::OutputFormat;

#[tokio::test]
async fn test_ask_refuses_empty_index() {
    let docs = DocDir::small();
    let ts = cli_services(docs.path());

    let args = AskArgs {
        question: Some("Where do orders ship from?".to_string()),
        k: None,
        show_sources: false,
    };
    let err = execute(args, &ts.services, OutputFormat::Human)
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("kbase ingest"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_ask_one_shot() {
    let (ts, _docs) = ingested_services().await;

    for format in [OutputFormat::Human, OutputFormat::Json] {
        let args = AskArgs {
            question: Some("Where do orders ship from?".to_string()),
            k: None,
            show_sources: true,
        };
        let result = execute(args, &ts.services, format).await;
        assert!(result.is_ok(), "Ask should succeed: {:?}", result.err());
    }
}

#[tokio::test]
async fn test_ask_rejects_blank_question() {
    let (ts, _docs) = ingested_services().await;

    let args = AskArgs {
        question: Some("   ".to_string()),
        k: None,
        show_sources: false,
    };
    assert!(execute(args, &ts.services, OutputFormat::Human).await.is_err());
}

#[tokio::test]
async fn test_session_skips_blank_lines_and_stops_on_exit() {
    let (ts, _docs) = ingested_services().await;
    let service = ts.services.answer_service().unwrap();

    let input: &[u8] = b"Where do orders ship from?\n\n   \nHow long do refunds take?\nquit\nNever asked\n";
    let answered = run_session(&service, input, false, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(answered, 2);
}

#[tokio::test]
async fn test_session_ends_at_eof() {
    let (ts, _docs) = ingested_services().await;
    let service = ts.services.answer_service().unwrap();

    let input: &[u8] = b"Where do orders ship from?";
    let answered = run_session(&service, input, true, OutputFormat::Json)
        .await
        .unwrap();
    assert_eq!(answered, 1);
}

#[tokio::test]
async fn test_session_survives_invalid_question() {
    let (ts, _docs) = ingested_services().await;
    let service = ts
        .services
        .answer_service()
        .unwrap()
        .with_max_query_length(10);

    let input: &[u8] = b"this question is far too long\nshort one\nexit\n";
    let answered = run_session(&service, input, false, OutputFormat::Human)
        .await
        .unwrap();
    assert_eq!(answered, 1);
}
