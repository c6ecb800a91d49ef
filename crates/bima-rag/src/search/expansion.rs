//! Query expansion from structural cues.
//!
//! Raw queries like "46M knee surgery Pune 3-month policy" carry structure
//! (age, procedure, body part, duration, location) that rarely matches policy
//! wording literally. Expansion terms are appended to the query before
//! vectorization and reused verbatim in the boosting pass.

use regex::Regex;
use std::sync::LazyLock;

static AGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\s*(?:[mf]\b|-?\s*(?:year|yr)s?\b)").expect("age regex is valid")
});
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\s*-?\s*(?:month|year|day)s?\b").expect("duration regex is valid")
});

const PROCEDURE_TERMS: &[&str] = &["surgery", "operation", "treatment", "procedure", "therapy"];
const BODY_PARTS: &[&str] = &["knee", "hip", "heart", "eye", "spine", "shoulder", "ankle"];
const CITY_NAMES: &[&str] = &["pune", "mumbai", "delhi", "bangalore", "chennai", "hyderabad"];

/// Derive expansion terms from structural cues in the raw query.
/// Deduplicated, in detection order, so expansion is deterministic.
pub fn expand(query: &str) -> Vec<String> {
    let lower = query.to_lowercase();
    let mut terms: Vec<String> = Vec::new();

    if AGE_RE.is_match(query) {
        push_unique(&mut terms, "age");
    }

    for term in PROCEDURE_TERMS {
        if lower.contains(term) {
            push_unique(&mut terms, term);
        }
    }

    for part in BODY_PARTS {
        if lower.contains(part) {
            push_unique(&mut terms, part);
        }
    }

    if DURATION_RE.is_match(query) {
        push_unique(&mut terms, "waiting period");
        push_unique(&mut terms, "policy duration");
    }

    for city in CITY_NAMES {
        if lower.contains(city) {
            push_unique(&mut terms, "location");
        }
    }

    terms
}

fn push_unique(terms: &mut Vec<String>, term: &str) {
    if !terms.iter().any(|t| t == term) {
        terms.push(term.to_string());
    }
}
