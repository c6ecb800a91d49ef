pub mod chunker;

pub use chunker::ClauseChunker;
