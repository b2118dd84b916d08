//! kbase - ask questions about a local document collection
//!
//! # Examples
//!
//! ```bash
//! # Build the index from a directory of documents
//! kbase ingest ./knowledge_base_documents
//!
//! # One question
//! kbase ask "What is the refund policy?" --show-sources
//!
//! # Interactive session
//! kbase ask
//!
//! # Inspect retrieval only
//! kbase search "refund policy" -k 5
//! ```

use clap::Parser;
use kbase::cli::{run, Cli};
use kbase::core::xdg::XdgDirs;
use kbase::KbaseError;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log files larger than this are rotated at startup
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Move `kbase.log` to `kbase.log.1` once it grows past the limit
fn rotate_if_large(path: &Path) -> std::io::Result<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > MAX_LOG_BYTES => {
            let mut rotated = path.as_os_str().to_owned();
            rotated.push(".1");
            fs::rename(path, rotated)
        }
        _ => Ok(()),
    }
}

fn open_log_file(xdg: &XdgDirs) -> std::io::Result<File> {
    let dir = xdg.logs_dir();
    fs::create_dir_all(&dir)?;
    let path = dir.join("kbase.log");
    rotate_if_large(&path)?;
    OpenOptions::new().create(true).append(true).open(path)
}

fn init_logging(xdg: &XdgDirs) {
    let file_layer = match open_log_file(xdg) {
        Ok(file) => Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {e}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "kbase=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(file_layer)
        .init();
}

fn hint_for(err: &KbaseError) -> Option<&'static str> {
    if err.is_config() {
        Some("check the config file and the KBASE_* environment variables")
    } else if err.is_external_service() {
        Some("is Ollama running? Start it with `ollama serve` or set KBASE_OLLAMA_HOST")
    } else {
        None
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let xdg = XdgDirs::new();
    init_logging(&xdg);
    tracing::debug!("kbase {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        if let Some(hint) = e.downcast_ref::<KbaseError>().and_then(hint_for) {
            eprintln!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}
