//! Ask command - answer questions from the indexed documents

use crate::cli::output::{colors, format_duration_ms, preview, print_error};
use crate::cli::OutputFormat;
use crate::core::answer::{Answer, AnswerOutcome, AnswerService};
use crate::core::services::{Readiness, Services};
use clap::Args;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Arguments for the ask command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to answer (omit for an interactive session)
    pub question: Option<String>,

    /// Number of chunks to retrieve
    #[arg(long, short = 'k')]
    pub k: Option<usize>,

    /// Print the retrieved chunks after each answer
    #[arg(long)]
    pub show_sources: bool,
}

/// Inputs that end an interactive session
pub fn is_exit_command(input: &str) -> bool {
    matches!(
        input.trim().to_ascii_lowercase().as_str(),
        "exit" | "quit" | "q"
    )
}

/// Execute the ask command
pub async fn execute(
    args: AskArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !services.index.exists_and_nonempty().await? {
        return Err(format!(
            "The knowledge base '{}' is empty. Run `kbase ingest` first.",
            services.config.storage.table_name
        )
        .into());
    }

    services.ensure_ready(Readiness::EmbedderAndChat).await?;
    let service = services.answer_service()?;

    match args.question {
        Some(question) => {
            let answer = service.answer(&question).await?;
            print_answer(&answer, args.show_sources, format)?;
        }
        None => {
            if format == OutputFormat::Human {
                println!(
                    "Ask a question about your documents ({} to leave).",
                    colors::dim("exit, quit or q")
                );
            }
            let stdin = BufReader::new(tokio::io::stdin());
            let answered = run_session(&service, stdin, args.show_sources, format).await?;
            tracing::info!("Interactive session ended after {} answers", answered);
        }
    }

    Ok(())
}

/// Answer questions read line by line until an exit command or EOF
///
/// Returns the number of answers produced. Invalid questions are reported
/// and the session keeps going.
pub async fn run_session<R>(
    service: &AnswerService,
    reader: R,
    show_sources: bool,
    format: OutputFormat,
) -> Result<usize, Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0;

    loop {
        if format == OutputFormat::Human {
            print!("\n{} ", colors::label("Question>"));
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if is_exit_command(question) {
            break;
        }

        match service.answer(question).await {
            Ok(answer) => {
                print_answer(&answer, show_sources, format)?;
                answered += 1;
            }
            Err(e) => print_error(&e.to_string()),
        }
    }

    Ok(answered)
}

fn print_answer(
    answer: &Answer,
    show_sources: bool,
    format: OutputFormat,
) -> Result<(), serde_json::Error> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(answer)?);
        }
        OutputFormat::Human => {
            println!("\n{}", answer.text);

            if show_sources && !answer.sources.is_empty() {
                println!("\n{}", colors::label("Sources:"));
                for (i, chunk) in answer.sources.iter().enumerate() {
                    println!(
                        "  {} {} chunk {} {}",
                        colors::rank(&format!("{}.", i + 1)),
                        colors::source(&chunk.source),
                        colors::number(&chunk.chunk_index.to_string()),
                        colors::distance(&format!("(distance {:.4})", chunk.distance))
                    );
                    println!("     {}", colors::dim(&preview(&chunk.text, 100)));
                }
            }

            let note = match answer.outcome {
                AnswerOutcome::Generated => String::new(),
                AnswerOutcome::RefusedWithoutContext => ", no relevant context".to_string(),
                AnswerOutcome::GenerationFailed => ", generation failed".to_string(),
            };
            println!(
                "{}",
                colors::dim(&format!(
                    "(answered in {}{note})",
                    format_duration_ms(answer.duration_ms)
                ))
            );
        }
    }
    Ok(())
}
