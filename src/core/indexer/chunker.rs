//! UTF-8 safe text chunking.
//!
//! Splits document text into fixed-size overlapping windows measured
//! in characters. Window boundaries come from `char_indices()`, so a
//! multi-byte character is never split and slicing never panics.
//!
//! # Example
//!
//! ```
//! use kbase::core::indexer::Chunker;
//!
//! let chunker = Chunker::new(10, 3).unwrap();
//! let chunks = chunker.chunk_text("0123456789ABCDEFGHIJKLMNO", "a.txt");
//!
//! assert_eq!(chunks.len(), 4);
//! assert_eq!(chunks[1].text, "789ABCDEFG");
//! assert_eq!(chunks[1].chunk_index, 2);
//! ```

use crate::core::error::{KbaseError, Result};
use crate::core::types::Chunk;

/// Split `text` into overlapping windows of `size` characters.
///
/// This is the total form of the chunking contract: it never panics.
/// The start offset advances by `size - overlap` characters; the main
/// pass stops when the next window would start at or past the end of
/// the text, or when it would not advance (`overlap >= size`). Any
/// non-whitespace text left after the last window is emitted as one
/// final window. Whitespace-only windows are dropped.
///
/// Returns `(byte_start, byte_end)` pairs into `text`.
pub fn split_windows(text: &str, size: usize, overlap: usize) -> Vec<(usize, usize)> {
    if size == 0 {
        return Vec::new();
    }

    let char_indices: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let char_count = char_indices.len();
    if char_count == 0 {
        return Vec::new();
    }

    // Byte offset of the character at `idx`, or the end of the text
    let byte_at = |idx: usize| -> usize {
        if idx < char_count {
            char_indices[idx]
        } else {
            text.len()
        }
    };

    let mut windows = Vec::new();
    let mut start = 0usize;
    let mut last_end = 0usize;

    while start < char_count {
        let end = (start + size).min(char_count);
        windows.push((byte_at(start), byte_at(end)));
        last_end = end;

        let next = (start + size).saturating_sub(overlap);
        if next <= start || next >= char_count {
            break;
        }
        start = next;
    }

    if last_end < char_count {
        let residual = &text[byte_at(last_end)..];
        if !residual.trim().is_empty() {
            windows.push((byte_at(last_end), text.len()));
        }
    }

    windows.retain(|&(s, e)| !text[s..e].trim().is_empty());
    windows
}

/// UTF-8 safe text chunker.
///
/// Holds a validated `(chunk_size, overlap)` pair. All sizes are
/// measured in **characters**, not bytes.
#[derive(Debug, Clone)]
pub struct Chunker {
    /// Number of characters per chunk
    chunk_size: usize,

    /// Number of characters shared by consecutive chunks
    overlap: usize,
}

impl Chunker {
    /// Create a new chunker with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `chunk_size` is 0 or if
    /// `overlap >= chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(KbaseError::ConfigError(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(KbaseError::ConfigError(format!(
                "overlap ({overlap}) must be < chunk_size ({chunk_size})"
            )));
        }

        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Get the chunk size in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Get the overlap size in characters.
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Chunk one document's text.
    ///
    /// Chunk indices start at 1 and have no gaps. Each chunk's text is
    /// `text[start_offset..end_offset]`.
    pub fn chunk_text(&self, text: &str, source: &str) -> Vec<Chunk> {
        split_windows(text, self.chunk_size, self.overlap)
            .into_iter()
            .enumerate()
            .map(|(i, (start, end))| Chunk {
                source: source.to_string(),
                chunk_index: i + 1,
                text: text[start..end].to_string(),
                start_offset: start,
                end_offset: end,
            })
            .collect()
    }
}
