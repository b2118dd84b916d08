//! Search command - show retrieved chunks without generating an answer

use crate::cli::output::{colors, preview};
use crate::cli::OutputFormat;
use crate::core::services::{Readiness, Services};
use crate::core::types::RetrievedChunk;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the search command
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Query text
    pub query: String,

    /// Number of chunks to return
    #[arg(long, short = 'k')]
    pub k: Option<usize>,
}

/// Search result response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub metric: String,
    pub results: Vec<RetrievedChunk>,
}

/// Execute the search command
pub async fn execute(
    args: SearchArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = args.query.trim();
    if query.is_empty() {
        return Err("Query cannot be empty.".into());
    }

    services.ensure_ready(Readiness::Embedder).await?;

    let retriever = services.retriever();
    let results = retriever.try_retrieve(query, retriever.top_k()).await?;

    let response = SearchResponse {
        query: query.to_string(),
        metric: services.config.storage.metric.to_string(),
        results,
    };

    match format {
        OutputFormat::Human => print_human(&response),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
    }

    Ok(())
}

fn print_human(response: &SearchResponse) {
    if response.results.is_empty() {
        println!("No results. Has anything been ingested yet?");
        return;
    }

    println!(
        "{} results ({} distance):\n",
        colors::number(&response.results.len().to_string()),
        response.metric
    );
    for (i, chunk) in response.results.iter().enumerate() {
        println!(
            "{} {} chunk {} {}",
            colors::rank(&format!("{}.", i + 1)),
            colors::source(&chunk.source),
            colors::number(&chunk.chunk_index.to_string()),
            colors::distance(&format!("{:.4}", chunk.distance))
        );
        println!("   {}\n", preview(&chunk.text, 160));
    }
}
