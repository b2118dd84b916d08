//! Vector index storage.
//!
//! Persists indexed records as whole generations and answers
//! nearest-neighbour queries over the active one.
//!
//! # Architecture
//!
//! - **VectorIndex**: replace/search contract used by the orchestrators
//! - **LanceVectorIndex**: LanceDB table per knowledge base, replaced in
//!   one overwrite commit, with an ANN index built for large generations
//!
//! # Table Storage Structure
//!
//! ```text
//! {index_dir}/
//! └── {table}.lance/          # LanceDB dataset
//!     ├── _versions/          # one manifest per commit
//!     ├── _indices/           # present when accelerated
//!     └── data/
//! ```
//!
//! Columns: `position`, `source`, `chunk_index`, `text`, `vector`. The
//! generation metadata lives in the schema metadata under
//! `kbase.generation`.

mod index;
mod metric;

pub use index::{
    GenerationInfo, GenerationMetadata, LanceVectorIndex, VectorIndex, MIN_INDEXED_RECORDS,
    SCHEMA_VERSION,
};
pub use metric::DistanceMetric;
