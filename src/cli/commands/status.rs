//! Status command - describe the active index generation

use crate::cli::output::{colors, format_relative_time};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::storage::GenerationMetadata;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub index_dir: String,
    pub table: String,
    pub generation: Option<GenerationMetadata>,
}

/// Execute the status command
pub async fn execute(
    _args: StatusArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = StatusResponse {
        index_dir: services.config.storage.index_dir.display().to_string(),
        table: services.config.storage.table_name.clone(),
        generation: services.index.current_metadata().await?,
    };

    match format {
        OutputFormat::Human => print_human(&response),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    Ok(())
}

fn print_human(response: &StatusResponse) {
    println!("{} {}", colors::label("Index:"), colors::source(&response.index_dir));
    println!("{} {}", colors::label("Table:"), response.table);

    let Some(meta) = &response.generation else {
        println!("\nNo index generation yet. Run `kbase ingest` to build one.");
        return;
    };

    println!("\n{}", colors::label("Active generation"));
    println!("  id:         {}", colors::dim(&meta.id));
    println!(
        "  created:    {} ({})",
        meta.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        format_relative_time(&meta.created_at)
    );
    println!(
        "  documents:  {}",
        colors::number(&meta.document_count.to_string())
    );
    println!(
        "  chunks:     {}",
        colors::number(&meta.record_count.to_string())
    );
    println!("  dimension:  {}", meta.dimension);
    println!("  metric:     {}", meta.metric);
    println!("  model:      {}", meta.embedding_model);
    println!(
        "  chunking:   {} chars, {} overlap",
        meta.chunk_size, meta.overlap
    );
    println!(
        "  ann index:  {}",
        if meta.accelerated { "yes" } else { "no" }
    );
}
