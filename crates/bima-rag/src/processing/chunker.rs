//! Page text → clause-annotated chunks.
//!
//! Sentences are accumulated greedily up to a target size; the sentence that
//! overflows a chunk seeds the next one, so context carries forward without
//! duplicating text inside a chunk. Clause labelling is heuristic pattern
//! matching, not a parser.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::EngineConfig;
use crate::types::Chunk;

static PAGE_ARTIFACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Page\s+\d+\s+of\s+\d+").expect("page artifact regex is valid")
});
static DIGIT_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+\s*$").expect("digit line regex is valid"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

// Clause label patterns, tried in priority order; first match anywhere in the
// chunk wins. Group order differs: the last pattern puts the title first.
static LABELED_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Clause|Section|Article)\s+(\d+(?:\.\d+)*)\s*:?\s*([^\n.]+)")
        .expect("labeled clause regex is valid")
});
static NUMBERED_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)*)\.\s*([A-Z][^.]+)").expect("numbered heading regex is valid")
});
static TITLE_DASH_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([A-Z][^.]+?)\s*-\s*clause\s+(\d+(?:\.\d+)*)")
        .expect("title-dash clause regex is valid")
});

pub struct ClauseChunker {
    chunk_size: usize,
}

impl ClauseChunker {
    pub fn new(chunk_size: usize) -> Self {
        Self { chunk_size }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.chunking.chunk_size)
    }

    /// Chunk one page of raw extracted text. Empty or garbage input yields an
    /// empty sequence; this never fails.
    pub fn extract(&self, raw_page_text: &str, page: u32, source: &str) -> Vec<Chunk> {
        let text = clean_text(raw_page_text);
        if text.is_empty() {
            return Vec::new();
        }

        let sentences = split_sentences(&text);

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut buffer = String::new();
        let mut buffer_chars = 0usize;

        for sentence in sentences {
            let sentence_chars = sentence.chars().count();
            if !buffer.is_empty() && buffer_chars + sentence_chars > self.chunk_size {
                chunks.push(self.emit(&buffer, page, source, chunks.len()));
                buffer.clear();
                buffer_chars = 0;
            }
            buffer.push_str(sentence);
            buffer.push(' ');
            buffer_chars += sentence_chars + 1;
        }

        if !buffer.trim().is_empty() {
            chunks.push(self.emit(&buffer, page, source, chunks.len()));
        }

        chunks
    }

    /// Chunk a whole document given as `(page_number, text)` pairs. Pages are
    /// numbered by the extraction collaborator (1-based); empty pages
    /// contribute nothing.
    pub fn extract_pages<'a, I>(&self, pages: I, source: &str) -> Vec<Chunk>
    where
        I: IntoIterator<Item = (u32, &'a str)>,
    {
        let mut chunks = Vec::new();
        for (page, text) in pages {
            chunks.extend(self.extract(text, page, source));
        }
        tracing::debug!(source = %source, chunks = chunks.len(), "chunked document");
        chunks
    }

    fn emit(&self, buffer: &str, page: u32, source: &str, sequence_id: usize) -> Chunk {
        let text = buffer.trim().to_string();
        let (clause_title, clause_number) = extract_clause_info(&text);
        Chunk {
            text,
            source: source.to_string(),
            page,
            clause_title,
            clause_number,
            sequence_id,
        }
    }
}

impl Default for ClauseChunker {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Strip pagination artifacts, normalize typographic punctuation to ASCII,
/// and collapse whitespace runs to single spaces.
fn clean_text(raw: &str) -> String {
    let text = DIGIT_LINE_RE.replace_all(raw, "");
    let text = PAGE_ARTIFACT_RE.replace_all(&text, "");
    let text = text
        .replace(['\u{2014}', '\u{2013}'], "-")
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Split after `.`, `!` or `?` followed by whitespace. Text with no sentence
/// terminator comes back as a single sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut iter = text.char_indices().peekable();

    while let Some((_, ch)) = iter.next() {
        if matches!(ch, '.' | '!' | '?') {
            if let Some(&(next_idx, next_ch)) = iter.peek() {
                if next_ch.is_whitespace() {
                    let sentence = text[start..next_idx].trim();
                    if !sentence.is_empty() {
                        sentences.push(sentence);
                    }
                    start = next_idx;
                }
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

/// Returns `(title, number)`, empty strings when no pattern matches.
fn extract_clause_info(text: &str) -> (String, String) {
    if let Some(caps) = LABELED_CLAUSE_RE.captures(text) {
        return (caps[2].trim().to_string(), caps[1].to_string());
    }
    if let Some(caps) = NUMBERED_HEADING_RE.captures(text) {
        return (caps[2].trim().to_string(), caps[1].to_string());
    }
    if let Some(caps) = TITLE_DASH_CLAUSE_RE.captures(text) {
        return (caps[1].trim().to_string(), caps[2].to_string());
    }
    (String::new(), String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_yields_no_chunks() {
        let chunker = ClauseChunker::default();
        assert!(chunker.extract("", 1, "policy.pdf").is_empty());
        assert!(chunker.extract("   \n\t  ", 1, "policy.pdf").is_empty());
    }

    #[test]
    fn clause_header_is_annotated() {
        let chunker = ClauseChunker::default();
        let chunks = chunker.extract(
            "Clause 5.1: Room Rent. The room rent shall not exceed 2% of sum insured. \
             Clause 5.2: ICU charges apply.",
            1,
            "policy.pdf",
        );
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].clause_number, "5.1");
        assert_eq!(chunks[0].clause_title, "Room Rent");
        assert_eq!(chunks[0].page, 1);
        assert_eq!(chunks[0].sequence_id, 0);
    }

    #[test]
    fn numbered_heading_is_annotated() {
        let (title, number) = extract_clause_info("12.3. Waiting Periods shall apply as follows");
        assert_eq!(number, "12.3");
        assert_eq!(title, "Waiting Periods shall apply as follows");
    }

    #[test]
    fn lowercase_headings_are_annotated() {
        let (title, number) = extract_clause_info("12.3. waiting periods shall apply as follows");
        assert_eq!(number, "12.3");
        assert_eq!(title, "waiting periods shall apply as follows");

        let (title, number) = extract_clause_info("room rent limits - clause 4.2");
        assert_eq!(number, "4.2");
        assert_eq!(title, "room rent limits");
    }

    #[test]
    fn title_dash_clause_is_annotated() {
        let (title, number) = extract_clause_info("Room Rent Limits - Clause 4.2");
        assert_eq!(number, "4.2");
        assert_eq!(title, "Room Rent Limits");
    }

    #[test]
    fn unlabelled_text_gets_empty_annotations() {
        let chunker = ClauseChunker::default();
        let chunks = chunker.extract(
            "the insurer shall reimburse reasonable expenses incurred during hospitalization.",
            1,
            "policy.pdf",
        );
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].clause_title.is_empty());
        assert!(chunks[0].clause_number.is_empty());
    }

    #[test]
    fn text_without_terminator_is_one_sentence() {
        let sentences = split_sentences("no punctuation here just words");
        assert_eq!(sentences, vec!["no punctuation here just words"]);
    }

    #[test]
    fn pagination_artifacts_are_stripped() {
        let chunker = ClauseChunker::default();
        let chunks = chunker.extract(
            "Page 3 of 12\n42\nThe policy covers daycare procedures. More terms follow here.",
            3,
            "policy.pdf",
        );
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].text.contains("Page 3 of 12"));
        assert!(!chunks[0].text.contains("42"));
        assert!(chunks[0].text.starts_with("The policy covers"));
    }

    #[test]
    fn typographic_punctuation_is_normalized() {
        let chunker = ClauseChunker::default();
        let chunks = chunker.extract(
            "The \u{201c}insured person\u{2019}s\u{201d} claim \u{2014} once admitted \u{2013} is payable.",
            1,
            "policy.pdf",
        );
        assert_eq!(
            chunks[0].text,
            "The \"insured person's\" claim - once admitted - is payable."
        );
    }

    #[test]
    fn every_sentence_survives_chunking() {
        let sentences: Vec<String> = (0..12)
            .map(|i| format!("Sentence number {} talks about coverage terms and exclusions.", i))
            .collect();
        let page_text = sentences.join(" ");

        let chunker = ClauseChunker::new(150);
        let chunks = chunker.extract(&page_text, 1, "policy.pdf");
        assert!(chunks.len() > 1);

        let combined: String = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        for sentence in &sentences {
            assert!(combined.contains(sentence.as_str()), "lost: {}", sentence);
        }
    }

    #[test]
    fn chunks_respect_size_bound() {
        let sentences: Vec<String> = (0..20)
            .map(|i| format!("Sentence {} about the waiting period and sum insured limits.", i))
            .collect();
        let page_text = sentences.join(" ");
        let max_sentence = sentences.iter().map(|s| s.chars().count()).max().unwrap();

        let target = 200;
        let chunker = ClauseChunker::new(target);
        let chunks = chunker.extract(&page_text, 1, "policy.pdf");

        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                chunk.text.chars().count() <= target + max_sentence + 1,
                "oversized chunk: {} chars",
                chunk.text.chars().count()
            );
        }
    }

    #[test]
    fn config_chunk_size_is_honored() {
        let sentences: Vec<String> = (0..12)
            .map(|i| format!("Sentence number {} talks about coverage terms and exclusions.", i))
            .collect();
        let page_text = sentences.join(" ");

        let mut config = EngineConfig::default();
        config.chunking.chunk_size = 150;

        let from_config = ClauseChunker::from_config(&config).extract(&page_text, 1, "policy.pdf");
        let explicit = ClauseChunker::new(150).extract(&page_text, 1, "policy.pdf");
        assert!(from_config.len() > 1);
        assert_eq!(from_config, explicit);
    }

    #[test]
    fn sequence_ids_restart_per_page() {
        let chunker = ClauseChunker::new(80);
        let long_page = "One sentence about claims here. Another sentence about benefits there. \
                         A third sentence about exclusions now. A fourth about premiums too.";
        let chunks = chunker.extract_pages(vec![(1, long_page), (2, ""), (3, long_page)], "p.pdf");

        let page1: Vec<_> = chunks.iter().filter(|c| c.page == 1).collect();
        let page3: Vec<_> = chunks.iter().filter(|c| c.page == 3).collect();
        assert!(!page1.is_empty());
        assert_eq!(page1.len(), page3.len());
        for (i, chunk) in page1.iter().enumerate() {
            assert_eq!(chunk.sequence_id, i);
        }
        assert_eq!(page3[0].sequence_id, 0);
        assert!(chunks.iter().all(|c| c.page != 2));
    }
}
