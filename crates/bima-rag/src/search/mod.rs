pub mod expansion;
pub mod tfidf;

pub use tfidf::{SparseVector, TfidfModel};
