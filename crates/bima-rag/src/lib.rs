//! bima-rag — lexical chunking and retrieval for insurance policy documents.
//!
//! Two components in index-dependency order: the [`ClauseChunker`] turns raw
//! per-page text into clause-annotated chunks, and the
//! [`RetrievalIndex`] filters, TF-IDF-indexes, and persists those chunks,
//! answering ranked similarity queries with query expansion and
//! domain-aware boosting. The HTTP layer, answer generation, and translation
//! live outside this crate and consume only `index`/`search`/`count`/`clear`.

pub mod config;
pub mod indexing;
pub mod processing;
pub mod retrieval;
pub mod search;
pub mod storage;
pub mod types;

// Re-export primary types for convenience
pub use config::EngineConfig;
pub use processing::ClauseChunker;
pub use retrieval::RetrievalIndex;
pub use types::{Chunk, ScoredDocument};
