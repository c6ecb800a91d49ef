//! Smoothed TF-IDF over unigrams and bigrams with L2-normalized sparse rows.
//!
//! `idf(t) = ln((N + 1) / (df(t) + 1)) + 1`, so weights fall as document
//! frequency rises and a term present everywhere still contributes. The
//! vocabulary is capped by corpus frequency with an alphabetical tie-break so
//! two builds over the same chunks produce the same model.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "after", "again", "all", "an", "and", "any", "are", "as", "at",
        "be", "because", "been", "being", "but", "by", "can", "could", "did", "do", "does",
        "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has", "have",
        "having", "he", "her", "here", "hers", "him", "his", "how", "if", "in", "into", "is",
        "it", "its", "itself", "just", "me", "more", "most", "my", "no", "nor", "not", "now",
        "of", "off", "on", "once", "only", "or", "other", "our", "out", "over", "own", "same",
        "she", "should", "so", "some", "such", "than", "that", "the", "their", "them", "then",
        "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
        "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
        "whom", "why", "will", "with", "would", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// An L2-normalized sparse term-weight vector. Entries are sorted by term
/// index so similarity is a single merge walk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cosine similarity. Both vectors are unit-length, so this is their
    /// dot product.
    pub fn cosine(&self, other: &SparseVector) -> f32 {
        let mut dot = 0.0f32;
        let (mut i, mut j) = (0usize, 0usize);
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_val) = self.entries[i];
            let (b_idx, b_val) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += a_val * b_val;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TfidfModel {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfModel {
    /// Fit a model over the corpus and return it together with the
    /// document-term matrix (one row per input text, in input order).
    pub fn fit(texts: &[&str], max_terms: usize) -> (Self, Vec<SparseVector>) {
        let tokenized: Vec<Vec<String>> = texts.par_iter().map(|t| tokenize(t)).collect();

        let mut totals: HashMap<&str, u64> = HashMap::new();
        let mut dfs: HashMap<&str, u32> = HashMap::new();
        for terms in &tokenized {
            let mut seen: HashSet<&str> = HashSet::new();
            for term in terms {
                *totals.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *dfs.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(&str, u64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked.truncate(max_terms);

        let mut selected: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        selected.sort_unstable();

        let vocabulary: HashMap<String, u32> = selected
            .iter()
            .enumerate()
            .map(|(i, term)| ((*term).to_string(), i as u32))
            .collect();

        let n = texts.len() as f32;
        let mut idf = vec![0.0f32; selected.len()];
        for (term, &index) in &vocabulary {
            let df = dfs.get(term.as_str()).copied().unwrap_or(0) as f32;
            idf[index as usize] = ((n + 1.0) / (df + 1.0)).ln() + 1.0;
        }

        let model = Self { vocabulary, idf };
        let matrix = tokenized
            .par_iter()
            .map(|terms| model.vectorize(terms))
            .collect();
        (model, matrix)
    }

    /// Map arbitrary text (typically a query) into the fitted term space.
    /// Out-of-vocabulary terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.vectorize(&tokenize(text))
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Inverse document frequency of a term, `None` when out of vocabulary.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.vocabulary
            .get(term)
            .map(|&index| self.idf[index as usize])
    }

    fn vectorize(&self, terms: &[String]) -> SparseVector {
        let mut tf: HashMap<u32, f32> = HashMap::new();
        for term in terms {
            if let Some(&index) = self.vocabulary.get(term) {
                *tf.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(u32, f32)> = tf
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index as usize]))
            .collect();
        entries.sort_unstable_by_key(|&(index, _)| index);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for entry in &mut entries {
                entry.1 /= norm;
            }
        }

        SparseVector { entries }
    }
}

/// Lowercased alphanumeric unigrams (length >= 2, stop-words removed) plus
/// bigrams over the surviving token stream.
fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let unigrams: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2 && !STOP_WORDS.contains(t))
        .collect();

    let mut terms: Vec<String> = Vec::with_capacity(unigrams.len() * 2);
    for token in &unigrams {
        terms.push((*token).to_string());
    }
    for pair in unigrams.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}
