//! Document loading tests: walking, filtering and text extraction

use crate::common::DocDir;
use kbase::core::config::Config;
use kbase::core::indexer::DocumentLoader;

fn default_loader() -> DocumentLoader {
    DocumentLoader::from_config(&Config::default().documents).unwrap()
}

#[test]
fn test_load_small_directory() {
    let docs = DocDir::small();
    let report = default_loader().load_directory(docs.path()).unwrap();

    let sources: Vec<&str> = report.documents.iter().map(|d| d.source.as_str()).collect();
    assert_eq!(sources, vec!["refunds.txt", "shipping.md", "staff.csv"]);
    assert_eq!(report.empty.len(), 1);
    assert!(report.failed.is_empty());
    assert_eq!(report.files_seen(), 4);
}

#[test]
fn test_csv_rows_become_sentences() {
    let docs = DocDir::small();
    let report = default_loader().load_directory(docs.path()).unwrap();

    let staff = report
        .documents
        .iter()
        .find(|d| d.source == "staff.csv")
        .unwrap();
    assert!(staff.content.starts_with("name, role, office"));
    assert!(staff.content.contains("Ada, engineer, Delft"));
    assert!(staff.content.contains("Grace, manager, N/A"));
}

#[test]
fn test_nested_sources_use_forward_slashes() {
    let docs = DocDir::with_files(&[("guides/setup/install.md", "Install with cargo.")]);
    let report = default_loader().load_directory(docs.path()).unwrap();

    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.documents[0].source, "guides/setup/install.md");
}

#[test]
fn test_unsupported_and_excluded_files_are_ignored() {
    let docs = DocDir::with_files(&[
        ("keep.txt", "kept"),
        ("image.png", "not text"),
        ("node_modules/pkg/readme.md", "dependency docs"),
        (".hidden/secret.txt", "hidden"),
    ]);
    let report = default_loader().load_directory(docs.path()).unwrap();

    let sources: Vec<&str> = report.documents.iter().map(|d| d.source.as_str()).collect();
    assert_eq!(sources, vec!["keep.txt"]);
}

#[test]
fn test_broken_docx_is_reported_not_fatal() {
    let docs = DocDir::with_files(&[("ok.txt", "fine"), ("broken.docx", "not a zip archive")]);
    let report = default_loader().load_directory(docs.path()).unwrap();

    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].path.ends_with("broken.docx"));
}

#[test]
fn test_workbooks_are_picked_up_by_default() {
    let docs = DocDir::with_files(&[
        ("ok.txt", "fine"),
        ("budget.xlsx", "not a real workbook"),
        ("legacy.xls", "not a real workbook either"),
    ]);
    let report = default_loader().load_directory(docs.path()).unwrap();

    assert_eq!(report.documents.len(), 1);
    let failed: Vec<_> = report.failed.iter().map(|f| f.path.clone()).collect();
    assert_eq!(failed.len(), 2, "workbooks should be attempted: {failed:?}");
    assert!(failed.iter().any(|p| p.ends_with("budget.xlsx")));
    assert!(failed.iter().any(|p| p.ends_with("legacy.xls")));
}

#[test]
fn test_missing_directory_fails() {
    let err = default_loader()
        .load_directory(std::path::Path::new("/definitely/not/here"))
        .unwrap_err();
    assert!(matches!(err, kbase::KbaseError::LoadFailed(_)));
}
