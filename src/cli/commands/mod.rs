//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for one
//! subcommand.

pub mod ask;
pub mod completions;
pub mod config;
pub mod ingest;
pub mod search;
pub mod status;

// Re-export argument types for use in mod.rs
pub use ask::AskArgs;
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use ingest::IngestArgs;
pub use search::SearchArgs;
pub use status::StatusArgs;
