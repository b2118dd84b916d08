//! Tests for argument parsing and output helpers

use clap::Parser;
use kbase::cli::output::{format_duration, format_duration_ms, preview};
use kbase::cli::{Cli, Commands, OutputFormat};

#[test]
fn test_parse_ingest_flags() {
    let cli = Cli::try_parse_from(["kbase", "ingest", "-q", "--chunk-size", "400"]).unwrap();
    match cli.command {
        Commands::Ingest(args) => {
            assert!(args.quiet);
            assert!(args.dir.is_none());
            assert_eq!(args.chunk_size, Some(400));
            assert_eq!(args.overlap, None);
        }
        other => panic!("unexpected command: {other:?}"),
    }
    assert_eq!(cli.format, OutputFormat::Human);
}

#[test]
fn test_parse_ask_without_question() {
    let cli = Cli::try_parse_from(["kbase", "ask", "--show-sources"]).unwrap();
    match cli.command {
        Commands::Ask(args) => {
            assert!(args.question.is_none());
            assert!(args.show_sources);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_global_format_after_subcommand() {
    let cli = Cli::try_parse_from(["kbase", "search", "refunds", "--format", "json"]).unwrap();
    assert_eq!(cli.format, OutputFormat::Json);
}

#[test]
fn test_rejects_bad_arguments() {
    assert!(Cli::try_parse_from(["kbase", "ingest", "--chunk-size", "big"]).is_err());
    assert!(Cli::try_parse_from(["kbase", "search"]).is_err());
    assert!(Cli::try_parse_from(["kbase", "--format", "xml", "status"]).is_err());
    assert!(Cli::try_parse_from(["kbase", "index-repository"]).is_err());
}

#[test]
fn test_format_helpers() {
    assert_eq!(format_duration(2.0), "2.00s");
    assert_eq!(format_duration_ms(1500), "1.50s");
    assert_eq!(preview("a  b\n\nc", 10), "a b c");
}
