//! Chunking tests: window layout, overlap and UTF-8 safety

use crate::common::known_text;
use kbase::core::indexer::{split_windows, Chunker};

#[test]
fn test_default_windows_over_1500_chars() {
    let text = known_text(1500);
    let chunker = Chunker::new(700, 70).unwrap();
    let chunks = chunker.chunk_text(&text, "a.txt");

    assert_eq!(chunks.len(), 3);
    let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
    assert_eq!(indices, vec![1, 2, 3]);

    assert_eq!(chunks[1].start_offset, 630);
    assert_eq!(chunks[1].text, &text[630..1330]);
    assert_eq!(chunks[2].start_offset, 1260);
    assert_eq!(chunks[2].end_offset, 1500);
}

#[test]
fn test_every_chunk_is_a_slice_of_the_source() {
    let text = known_text(2345);
    let chunker = Chunker::new(300, 45).unwrap();

    for chunk in chunker.chunk_text(&text, "doc.txt") {
        assert_eq!(chunk.source, "doc.txt");
        assert_eq!(&text[chunk.start_offset..chunk.end_offset], chunk.text);
        assert!(chunk.text.chars().count() <= 300);
    }
}

/// Text mixing whitespace runs, ASCII and multibyte characters
fn mixed_text(len: usize) -> String {
    let pieces = ["Café ", "   ", "日本語", "\n\n\t", "refund 🦀 ", "x", "  Ünïcødé  "];
    let mut text = String::new();
    let mut i = 0usize;
    while text.chars().count() < len {
        text.push_str(pieces[(i * 7 + i / 3) % pieces.len()]);
        i += 1;
    }
    text
}

#[test]
fn test_chunks_cover_every_non_whitespace_char() {
    let params = [(1, 0), (2, 1), (7, 3), (10, 0), (17, 4), (40, 39), (64, 8), (700, 70)];

    for len in [1, 13, 97, 500, 1234] {
        let text = mixed_text(len);
        for (size, overlap) in params {
            let chunks = Chunker::new(size, overlap).unwrap().chunk_text(&text, "mix.txt");

            for (byte, c) in text.char_indices() {
                if c.is_whitespace() {
                    continue;
                }
                assert!(
                    chunks
                        .iter()
                        .any(|ch| ch.start_offset <= byte && byte < ch.end_offset),
                    "char {c:?} at byte {byte} uncovered (len={len}, size={size}, overlap={overlap})"
                );
            }
        }
    }
}

#[test]
fn test_consecutive_chunks_share_overlap() {
    let text = known_text(1000);
    let chunker = Chunker::new(200, 50).unwrap();
    let chunks = chunker.chunk_text(&text, "doc.txt");

    for pair in chunks.windows(2) {
        let tail: String = pair[0].text.chars().skip(150).collect();
        let head: String = pair[1].text.chars().take(50).collect();
        assert_eq!(tail, head);
    }
}

#[test]
fn test_text_shorter_than_chunk() {
    let chunker = Chunker::new(700, 70).unwrap();
    let chunks = chunker.chunk_text("A single short paragraph.", "short.txt");

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_index, 1);
    assert_eq!(chunks[0].text, "A single short paragraph.");
}

#[test]
fn test_whitespace_only_text_yields_nothing() {
    let chunker = Chunker::new(10, 2).unwrap();
    assert!(chunker.chunk_text("   \n\t\n   ", "blank.txt").is_empty());
}

#[test]
fn test_multibyte_text_is_counted_in_characters() {
    let text = "日本語のテキストを分割します。".repeat(10); // 150 chars
    let chunker = Chunker::new(40, 10).unwrap();
    let chunks = chunker.chunk_text(&text, "ja.txt");

    assert!(chunks.len() >= 4);
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 40);
        assert!(text.is_char_boundary(chunk.start_offset));
        assert!(text.is_char_boundary(chunk.end_offset));
    }
    assert_eq!(chunks[0].text.chars().count(), 40);
}

#[test]
fn test_emoji_never_split() {
    let text = "Rust 🦀 is fast 🚀 and safe ✅ ".repeat(20);
    let chunker = Chunker::new(17, 4).unwrap();

    let chunks = chunker.chunk_text(&text, "emoji.txt");
    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 17);
    }
}

#[test]
fn test_split_windows_is_total() {
    // Degenerate parameters the validated chunker refuses still never panic
    assert!(split_windows("abc", 0, 0).is_empty());
    assert_eq!(split_windows("abcdef", 3, 3), vec![(0, 3), (3, 6)]);
    assert_eq!(split_windows("abcdef", 3, 5), vec![(0, 3), (3, 6)]);
    assert!(split_windows("", 5, 1).is_empty());
}
