//! Grounded prompt assembly.
//!
//! A template is parsed once into literal and placeholder segments.
//! Rendering walks the segments a single time, so retrieved text that
//! happens to contain `{question}` is copied verbatim and never
//! substituted again.

use crate::core::error::{KbaseError, Result};
use crate::core::types::RetrievedChunk;

/// Sentence the model is told to use when the context has no answer
pub const DEFAULT_REFUSAL: &str = "The information was not found in the provided knowledge base.";

/// Returned in place of an answer when the chat service fails
pub const GENERATION_APOLOGY: &str = "Sorry, an error occurred while generating the answer.";

/// Separator between context entries
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

pub const DEFAULT_TEMPLATE: &str = "You are an assistant for an internal knowledge base.
Answer the user's question using ONLY the excerpts below.
Be concise and direct. If the information needed to answer is not in the excerpts, reply exactly: '{refusal}'

Context:
{context}

Question:
{question}

Answer:
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Context,
    Question,
    Refusal,
}

/// Parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// `ConfigError` when `{context}` or `{question}` is missing or
    /// repeated, a placeholder name is unknown, or a brace is unmatched.
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for nc in chars.by_ref() {
                        if nc == '}' {
                            closed = true;
                            break;
                        }
                        name.push(nc);
                    }
                    if !closed {
                        return Err(KbaseError::ConfigError(
                            "prompt template has an unclosed '{'".to_string(),
                        ));
                    }

                    let segment = match name.as_str() {
                        "context" => Segment::Context,
                        "question" => Segment::Question,
                        "refusal" => Segment::Refusal,
                        other => {
                            return Err(KbaseError::ConfigError(format!(
                                "unknown prompt placeholder '{{{other}}}' \
                                 (use {{{{ and }}}} for literal braces)"
                            )))
                        }
                    };
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                '}' => {
                    return Err(KbaseError::ConfigError(
                        "prompt template has an unmatched '}'".to_string(),
                    ))
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        for (placeholder, name) in [(Segment::Context, "context"), (Segment::Question, "question")] {
            let count = segments.iter().filter(|s| **s == placeholder).count();
            if count != 1 {
                return Err(KbaseError::ConfigError(format!(
                    "prompt template must contain {{{name}}} exactly once (found {count})"
                )));
            }
        }

        Ok(Self { segments })
    }

    /// Substitute the placeholders in one pass
    pub fn render(&self, context: &str, question: &str, refusal: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Context => out.push_str(context),
                Segment::Question => out.push_str(question),
                Segment::Refusal => out.push_str(refusal),
            }
        }
        out
    }
}

/// Format retrieved chunks as provenance-tagged context.
///
/// Each entry is `Source: {source}, Chunk {chunk_index}` on its own
/// line followed by the chunk text. Empty input gives an empty string.
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|c| format!("Source: {}, Chunk {}\n{}", c.source, c.chunk_index, c.text))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
