use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bounded passage of source text — the unit of indexing and retrieval.
///
/// `clause_title` and `clause_number` are best-effort heading annotations and
/// may be empty. `sequence_id` is the 0-based emission order within the page
/// that produced the chunk; combine with `source` and `page` for identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub page: u32,
    pub clause_title: String,
    pub clause_number: String,
    pub sequence_id: usize,
}

/// A chunk that passed the relevance filter and owns a row in the index
/// matrix. Lives exactly as long as the snapshot it was built into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: Uuid,
    pub chunk: Chunk,
    pub indexed_at: DateTime<Utc>,
}

/// Search result handed to the answer-generation collaborator:
/// the chunk fields plus the final (boosted) similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub id: Uuid,
    pub text: String,
    pub source: String,
    pub page: u32,
    pub clause_title: String,
    pub clause_number: String,
    pub sequence_id: usize,
    pub score: f32,
}

impl ScoredDocument {
    pub(crate) fn from_document(doc: &IndexedDocument, score: f32) -> Self {
        Self {
            id: doc.id,
            text: doc.chunk.text.clone(),
            source: doc.chunk.source.clone(),
            page: doc.chunk.page,
            clause_title: doc.chunk.clause_title.clone(),
            clause_number: doc.chunk.clause_number.clone(),
            sequence_id: doc.chunk.sequence_id,
            score,
        }
    }
}
