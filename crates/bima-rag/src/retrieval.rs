//! The retrieval index: a replace-on-ingest, term-weighted document index
//! with query expansion and score boosting.
//!
//! Concurrency model: a single writer mutex serializes `index`/`clear`, and
//! the published state is an immutable `Arc<IndexSnapshot>` behind an RwLock.
//! Readers clone the `Arc` and work against a consistent snapshot, so a
//! search running during a rebuild sees either the old index or the new one,
//! never a half-built matrix. Persistence happens before publish, outside any
//! reader-visible critical section.

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::indexing;
use crate::search::expansion;
use crate::search::tfidf::{SparseVector, TfidfModel};
use crate::storage::SnapshotStore;
use crate::types::{Chunk, IndexedDocument, ScoredDocument};

/// Raw-similarity floor: candidates at or below this never appear in
/// results, even when boosting would lift them past it.
pub const SCORE_FLOOR: f32 = 0.01;
/// Hard ceiling applied after every boost multiplication.
pub const SCORE_CEILING: f32 = 1.0;
/// Multiplier per distinct expansion term found verbatim in a document.
pub const EXPANSION_TERM_BOOST: f32 = 1.3;
/// Word-overlap boost: `min(MAX, 1.0 + STEP * |overlap|)`.
pub const WORD_OVERLAP_BOOST_STEP: f32 = 0.1;
pub const WORD_OVERLAP_BOOST_MAX: f32 = 1.5;

/// One complete, immutable index state. Row `i` of `matrix` is the
/// term-weight vector of `documents[i]`; the two always agree in length.
#[derive(Debug, Default)]
struct IndexSnapshot {
    model: TfidfModel,
    matrix: Vec<SparseVector>,
    documents: Vec<IndexedDocument>,
}

pub struct RetrievalIndex {
    store: SnapshotStore,
    max_vocab_terms: usize,
    default_k: usize,
    writer: Mutex<()>,
    current: RwLock<Arc<IndexSnapshot>>,
}

impl RetrievalIndex {
    /// Construct over the configured data directory, resuming from a
    /// persisted snapshot when one is present. Unreadable snapshots are
    /// logged and discarded; startup never fails on storage problems.
    pub fn new(config: &EngineConfig) -> Self {
        let store = SnapshotStore::new(config.data_dir.clone());

        let snapshot = match store.load() {
            Ok(Some((model, matrix, documents))) => {
                tracing::info!(documents = documents.len(), "resumed persisted index snapshot");
                Arc::new(IndexSnapshot {
                    model,
                    matrix,
                    documents,
                })
            }
            Ok(None) => {
                tracing::debug!("no persisted snapshot, starting empty");
                Arc::new(IndexSnapshot::default())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load persisted snapshot, starting empty");
                Arc::new(IndexSnapshot::default())
            }
        };

        Self {
            store,
            max_vocab_terms: config.indexing.max_vocab_terms,
            default_k: config.search.default_k,
            writer: Mutex::new(()),
            current: RwLock::new(snapshot),
        }
    }

    /// Replace the entire index contents with this batch. Chunks failing the
    /// relevance filter are dropped; if nothing survives the index becomes
    /// empty. Persistence failures are logged and the in-memory index is
    /// still published.
    pub fn index(&self, chunks: &[Chunk]) {
        let _writer = self.writer.lock();

        let survivors: Vec<&Chunk> = chunks
            .iter()
            .filter(|chunk| indexing::is_relevant(&chunk.text))
            .collect();
        tracing::info!(
            total = chunks.len(),
            kept = survivors.len(),
            "replacing index contents"
        );

        if survivors.is_empty() {
            tracing::warn!("no indexable content in batch, index is now empty");
            if let Err(e) = self.store.clear() {
                tracing::warn!(error = %e, "failed to remove persisted snapshot");
            }
            self.publish(IndexSnapshot::default());
            return;
        }

        let indexed_at = Utc::now();
        let documents: Vec<IndexedDocument> = survivors
            .into_iter()
            .map(|chunk| IndexedDocument {
                id: Uuid::new_v4(),
                chunk: chunk.clone(),
                indexed_at,
            })
            .collect();

        let texts: Vec<&str> = documents.iter().map(|d| d.chunk.text.as_str()).collect();
        let (model, matrix) = TfidfModel::fit(&texts, self.max_vocab_terms);

        if let Err(e) = self.store.save(&model, &matrix, &documents) {
            tracing::warn!(error = %e, "snapshot persistence failed, continuing in memory");
        }

        self.publish(IndexSnapshot {
            model,
            matrix,
            documents,
        });
    }

    /// Rank documents against the query. Empty when the index is empty;
    /// callers distinguish that from "no match" via [`count`](Self::count).
    pub fn search(&self, query: &str, k: usize) -> Vec<ScoredDocument> {
        if k == 0 {
            return Vec::new();
        }

        let snapshot: Arc<IndexSnapshot> = self.current.read().clone();
        if snapshot.documents.is_empty() {
            tracing::debug!("search against empty index");
            return Vec::new();
        }

        let expansion_terms = expansion::expand(query);
        let effective_query = if expansion_terms.is_empty() {
            query.to_string()
        } else {
            format!("{} {}", query, expansion_terms.join(" "))
        };

        let query_vector = snapshot.model.transform(&effective_query);
        if query_vector.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = snapshot
            .matrix
            .par_iter()
            .enumerate()
            .map(|(i, row)| (i, query_vector.cosine(row)))
            .collect();

        // Top k by raw similarity; the earlier-ingested chunk wins ties. The
        // floor applies to raw scores, so boosting can never re-admit a
        // document that failed it.
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored.retain(|&(_, score)| score > SCORE_FLOOR);

        let query_lower = query.to_lowercase();
        let query_words: HashSet<&str> = query_lower.split_whitespace().collect();

        let mut results: Vec<ScoredDocument> = scored
            .into_iter()
            .map(|(idx, raw)| {
                let doc = &snapshot.documents[idx];
                let score = boost(raw, &doc.chunk.text, &expansion_terms, &query_words);
                ScoredDocument::from_document(doc, score)
            })
            .collect();

        // Stable sort: equal boosted scores keep their raw-similarity order.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        tracing::debug!(query = %query, results = results.len(), "search complete");
        results
    }

    /// [`search`](Self::search) with the configured result count.
    pub fn search_default(&self, query: &str) -> Vec<ScoredDocument> {
        self.search(query, self.default_k)
    }

    /// Number of indexed documents in the published snapshot.
    pub fn count(&self) -> usize {
        self.current.read().documents.len()
    }

    /// Drop the snapshot and its persisted artifacts. Idempotent.
    pub fn clear(&self) {
        let _writer = self.writer.lock();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to remove persisted snapshot");
        }
        self.publish(IndexSnapshot::default());
        tracing::info!("index cleared");
    }

    fn publish(&self, snapshot: IndexSnapshot) {
        *self.current.write() = Arc::new(snapshot);
    }
}

/// Apply both boost passes, in order, each multiplication capped at the
/// ceiling: expansion terms found verbatim in the text first, then literal
/// query-word overlap.
fn boost(raw: f32, text: &str, expansion_terms: &[String], query_words: &HashSet<&str>) -> f32 {
    let text_lower = text.to_lowercase();
    let mut score = raw;

    for term in expansion_terms {
        if text_lower.contains(term.as_str()) {
            score = (score * EXPANSION_TERM_BOOST).min(SCORE_CEILING);
        }
    }

    let text_words: HashSet<&str> = text_lower.split_whitespace().collect();
    let overlap = query_words.intersection(&text_words).count();
    if overlap > 0 {
        let factor = WORD_OVERLAP_BOOST_MAX.min(1.0 + WORD_OVERLAP_BOOST_STEP * overlap as f32);
        score = (score * factor).min(SCORE_CEILING);
    }

    score
}
