//! Ingest command - load a document directory and rebuild the index

use crate::cli::output::{colors, format_duration_ms, print_warning};
use crate::cli::OutputFormat;
use crate::core::services::{Readiness, Services};
use crate::core::types::SkippedDocument;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Directory of documents (defaults to `documents.dir` from config)
    pub dir: Option<PathBuf>,

    /// Characters per chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Suppress progress output
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// File the loader could not read
#[derive(Debug, Serialize)]
pub struct FailedFile {
    pub path: String,
    pub error: String,
}

/// Ingestion result response
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub dir: String,
    pub files_seen: usize,
    pub files_failed: Vec<FailedFile>,
    pub documents_loaded: usize,
    pub documents_indexed: usize,
    pub skipped: Vec<SkippedDocument>,
    pub chunks_created: usize,
    pub generation: Option<String>,
    pub duration_ms: u64,
}

/// Execute the ingest command
pub async fn execute(
    args: IngestArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = services.config.documents.dir.clone();
    let chatty = !args.quiet && format == OutputFormat::Human;

    if chatty {
        eprintln!(
            "Loading documents from {}...",
            colors::source(&dir.display().to_string())
        );
    }

    let loader = services.document_loader()?;
    let loaded = loader.load_directory(&dir)?;
    let files_seen = loaded.files_seen();
    let files_failed: Vec<FailedFile> = loaded
        .failed
        .iter()
        .map(|f| FailedFile {
            path: f.path.display().to_string(),
            error: f.error.clone(),
        })
        .collect();
    let documents_loaded = loaded.documents.len();

    if loaded.documents.is_empty() {
        let response = IngestResponse {
            dir: dir.display().to_string(),
            files_seen,
            files_failed,
            documents_loaded,
            documents_indexed: 0,
            skipped: Vec::new(),
            chunks_created: 0,
            generation: None,
            duration_ms: 0,
        };
        return match format {
            OutputFormat::Human => {
                print_warning(&format!(
                    "No documents found in {}. The existing index was left unchanged.",
                    dir.display()
                ));
                print_failed(&response.files_failed);
                Ok(())
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&response)?);
                Ok(())
            }
        };
    }

    services.ensure_ready(Readiness::Embedder).await?;

    if chatty {
        eprintln!(
            "Embedding {} documents with {}...",
            colors::number(&documents_loaded.to_string()),
            colors::label(services.embedder.model_name())
        );
    }

    let pipeline = services.ingestion_pipeline()?;
    let report = pipeline.ingest(loaded.documents).await?;

    let response = IngestResponse {
        dir: dir.display().to_string(),
        files_seen,
        files_failed,
        documents_loaded,
        documents_indexed: report.documents_indexed,
        skipped: report.skipped,
        chunks_created: report.chunks_created,
        generation: report.generation.map(|g| g.id),
        duration_ms: report.duration_ms,
    };

    match format {
        OutputFormat::Human => print_human(&response),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    Ok(())
}

fn print_human(response: &IngestResponse) {
    println!(
        "{} {} of {} documents ({} chunks) in {}",
        colors::success("Indexed"),
        colors::number(&response.documents_indexed.to_string()),
        colors::number(&response.documents_loaded.to_string()),
        colors::number(&response.chunks_created.to_string()),
        format_duration_ms(response.duration_ms)
    );

    if !response.skipped.is_empty() {
        println!(
            "{} {} documents:",
            colors::warning("Skipped"),
            response.skipped.len()
        );
        for skipped in &response.skipped {
            println!("  {} ({})", colors::source(&skipped.source), skipped.reason);
        }
    }
    print_failed(&response.files_failed);

    match &response.generation {
        Some(id) => println!("{} {}", colors::label("Generation:"), colors::dim(id)),
        None => print_warning("Nothing was indexed. The existing index was left unchanged."),
    }
}

fn print_failed(failed: &[FailedFile]) {
    if failed.is_empty() {
        return;
    }
    println!(
        "{} {} files:",
        colors::error("Could not read"),
        failed.len()
    );
    for f in failed {
        println!("  {}: {}", colors::source(&f.path), colors::dim(&f.error));
    }
}
