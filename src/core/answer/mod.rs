//! Retrieval and answer orchestration.
//!
//! Turns a question into a grounded prompt over the top-k retrieved
//! chunks and hands it to the chat model. The caller always gets text
//! back: the model's reply, the refusal sentence or a fixed apology.

pub mod prompt;
mod retriever;
mod service;

pub use prompt::{
    build_context, PromptTemplate, CONTEXT_SEPARATOR, DEFAULT_REFUSAL, DEFAULT_TEMPLATE,
    GENERATION_APOLOGY,
};
pub use retriever::Retriever;
pub use service::{Answer, AnswerOutcome, AnswerService};
