//! Document loader.
//!
//! Walks a directory of source files, filters them with glob patterns
//! and a size cap, and turns each supported file into a `Document`.
//! A file that cannot be read or decoded is recorded in the
//! `LoadReport` and the walk continues.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::extract::{extract_text, DocumentFormat};
use crate::core::config::DocumentsConfig;
use crate::core::error::{KbaseError, Result};
use crate::core::types::Document;

/// A file the loader could not turn into a document
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of loading one directory
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Decoded documents, sorted by source
    pub documents: Vec<Document>,

    /// Files whose extracted text was empty
    pub empty: Vec<PathBuf>,

    /// Files that failed to load
    pub failed: Vec<LoadFailure>,
}

impl LoadReport {
    /// Number of files the loader looked at
    pub fn files_seen(&self) -> usize {
        self.documents.len() + self.empty.len() + self.failed.len()
    }
}

/// Directory loader with pattern-based filtering
pub struct DocumentLoader {
    include_patterns: Vec<Pattern>,
    exclude_patterns: Vec<Pattern>,
    max_file_size_bytes: u64,
}

fn compile_patterns(patterns: &[String], kind: &str) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| KbaseError::ConfigError(format!("Invalid {kind} pattern '{p}': {e}")))
        })
        .collect()
}

impl DocumentLoader {
    /// Create a loader from include/exclude globs and a size cap.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any pattern fails to parse.
    pub fn new(
        include_patterns: &[String],
        exclude_patterns: &[String],
        max_file_size_mb: usize,
    ) -> Result<Self> {
        Ok(Self {
            include_patterns: compile_patterns(include_patterns, "include")?,
            exclude_patterns: compile_patterns(exclude_patterns, "exclude")?,
            max_file_size_bytes: (max_file_size_mb as u64).saturating_mul(1024 * 1024),
        })
    }

    pub fn from_config(config: &DocumentsConfig) -> Result<Self> {
        Self::new(
            &config.include_patterns,
            &config.exclude_patterns,
            config.max_file_size_mb,
        )
    }

    /// Load every matching document under `root`.
    ///
    /// # Errors
    ///
    /// Returns `LoadFailed` if `root` is missing or not a directory.
    /// Failures on individual files are reported, not returned.
    pub fn load_directory(&self, root: &Path) -> Result<LoadReport> {
        if !root.is_dir() {
            return Err(KbaseError::LoadFailed(format!(
                "Documents directory not found: {root:?}"
            )));
        }

        let mut report = LoadReport::default();

        for path in self.collect_files(root) {
            let source = relative_source(root, &path);
            match extract_text(&path) {
                Ok(text) => {
                    let content = text.trim();
                    if content.is_empty() {
                        tracing::warn!("No text extracted from {}", source);
                        report.empty.push(path);
                    } else {
                        tracing::debug!("Loaded {} ({} chars)", source, content.chars().count());
                        report.documents.push(Document::new(source, content));
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}", source, e);
                    report.failed.push(LoadFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.documents.sort_by(|a, b| a.source.cmp(&b.source));

        tracing::info!(
            "Loaded {} documents from {:?} ({} empty, {} failed)",
            report.documents.len(),
            root,
            report.empty.len(),
            report.failed.len()
        );

        Ok(report)
    }

    /// Collect matching files of a supported format under `root`
    fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.keep_entry(e, root));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();

            if let Ok(metadata) = entry.metadata() {
                if metadata.len() > self.max_file_size_bytes {
                    tracing::debug!("Skipping large file: {:?} ({} bytes)", path, metadata.len());
                    continue;
                }
            }

            if DocumentFormat::from_path(path).is_none() {
                tracing::debug!("Skipping unsupported file: {:?}", path);
                continue;
            }

            if self.matches_patterns(path) {
                files.push(path.to_path_buf());
            }
        }

        files
    }

    /// Prune hidden and excluded directories; the root always passes
    fn keep_entry(&self, entry: &DirEntry, root: &Path) -> bool {
        let path = entry.path();
        if path == root || !entry.file_type().is_dir() {
            return true;
        }

        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            return false;
        }

        !self.exclude_patterns.iter().any(|p| p.matches_path(path))
    }

    /// Include patterns match the full path or the bare file name
    fn matches_patterns(&self, path: &Path) -> bool {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        let included = self.include_patterns.is_empty()
            || self
                .include_patterns
                .iter()
                .any(|p| p.matches_path(path) || p.matches(file_name));
        if !included {
            return false;
        }

        !self.exclude_patterns.iter().any(|p| p.matches_path(path))
    }
}

/// Source identifier: path relative to the root, `/`-separated
fn relative_source(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
