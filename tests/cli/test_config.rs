//! Tests for the show-config CLI command

use crate::cli::test_helpers::cli_services;
use crate::common::DocDir;
use kbase::cli::commands::config::{execute, ConfigArgs};
use kbase::cli::OutputFormat;

#[tokio::test]
async fn test_show_config_formats() {
    let docs = DocDir::small();
    let ts = cli_services(docs.path());

    for format in [OutputFormat::Human, OutputFormat::Json] {
        for all in [false, true] {
            let result = execute(ConfigArgs { all }, &ts.services, format).await;
            assert!(result.is_ok(), "show-config failed: {:?}", result.err());
        }
    }
}

#[test]
fn test_default_config_serializes_to_toml() {
    let config = kbase::Config::default();
    let text = toml::to_string_pretty(&config).unwrap();

    assert!(text.contains("[indexing]"));
    assert!(text.contains("chunk_size = 700"));
    assert!(!text.contains("max_distance"));

    let parsed: kbase::Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed.retrieval.top_k, 3);
}
