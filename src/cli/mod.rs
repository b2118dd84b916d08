//! CLI adapter for kbase
//!
//! Command-line front end over the `core/` orchestrators. Commands
//! never touch storage or the model services directly; everything goes
//! through [`Services`](crate::core::services::Services).
//!
//! ```text
//! +------------------+
//! |      cli/        |
//! | (clap adapter)   |
//! +--------+---------+
//!          |
//!          v
//! +------------------+
//! |     core/        |
//! |  (domain logic)  |
//! +------------------+
//! ```

pub mod commands;
pub mod output;

use crate::core::config::Config;
use clap::{Parser, Subcommand};

/// kbase - ask questions about your own documents
///
/// Ingest a directory of documents into a local vector index, then ask
/// questions answered by a local Ollama model from the retrieved passages.
#[derive(Parser, Debug)]
#[command(name = "kbase")]
#[command(version)]
#[command(about = "Question answering over a local document collection", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load, chunk and embed a document directory, replacing the index
    Ingest(commands::IngestArgs),

    /// Answer a question, or start an interactive session
    Ask(commands::AskArgs),

    /// Show the chunks retrieved for a query
    Search(commands::SearchArgs),

    /// Show the active index generation
    Status(commands::StatusArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  kbase completions bash > ~/.local/share/bash-completion/completions/kbase
    ///   zsh:   kbase completions zsh > ~/.zfunc/_kbase
    ///   fish:  kbase completions fish > ~/.config/fish/completions/kbase.fish
    Completions(commands::CompletionsArgs),
}

impl Commands {
    /// Apply command-line flags that shadow config values
    pub fn apply_overrides(&self, config: &mut Config) {
        match self {
            Commands::Ingest(args) => {
                if let Some(dir) = &args.dir {
                    config.documents.dir = dir.clone();
                }
                if let Some(size) = args.chunk_size {
                    config.indexing.chunk_size = size;
                }
                if let Some(overlap) = args.overlap {
                    config.indexing.overlap = overlap;
                }
            }
            Commands::Ask(args) => {
                if let Some(k) = args.k {
                    config.retrieval.top_k = k;
                }
            }
            Commands::Search(args) => {
                if let Some(k) = args.k {
                    config.retrieval.top_k = k;
                }
            }
            Commands::Status(_) | Commands::ShowConfig(_) | Commands::Completions(_) => {}
        }
    }
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::services::Services;
    use crate::core::xdg::{migrate_legacy_paths, XdgDirs};
    use std::sync::Arc;

    // Completions need neither config nor services
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let xdg = XdgDirs::new();
    xdg.log_paths();
    xdg.ensure_dirs_exist()?;

    if let Err(e) = migrate_legacy_paths(&xdg) {
        output::print_warning(&format!("Migration issue: {e}"));
    }

    let mut config = Config::load_with_xdg(&xdg)?;
    cli.command.apply_overrides(&mut config);
    config.validate()?;
    config.log_config();

    let services = Arc::new(Services::new(config)?);

    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args, &services, cli.format).await,
        Commands::Ask(args) => commands::ask::execute(args, &services, cli.format).await,
        Commands::Search(args) => commands::search::execute(args, &services, cli.format).await,
        Commands::Status(args) => commands::status::execute(args, &services, cli.format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::Completions(_) => Ok(()),
    }
}
