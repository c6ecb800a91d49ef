//! Relevance filter applied to chunks before they enter the index.
//!
//! Deliberately permissive: the goal is to drop obvious noise (pure
//! headers/footers, registration stamps) while keeping anything with
//! plausible informational content. False negatives cost more than false
//! positives here.

use regex::Regex;
use std::sync::LazyLock;

/// Chunks shorter than this are headers/footers, never content.
pub const MIN_CHUNK_CHARS: usize = 50;
/// A chunk containing boilerplate is only rejected below this length;
/// longer chunks may quote the footer while still carrying content.
pub const BOILERPLATE_MAX_CHARS: usize = 200;

const MIN_SUBSTANTIAL_WORDS: usize = 5;
const MIN_SUBSTANTIAL_CHARS: usize = 100;

/// Literal contact/footer phrases that mark a chunk as boilerplate.
const BOILERPLATE_PHRASES: &[&str] = &[
    "bajaj allianz house, airport road, yerawada, pune",
    "www.bajajallianz.com",
    "bagichelp@bajajallianz.co.in",
    "for more details, log on to:",
];

/// Domain keywords that make a chunk worth indexing on sight.
const DOMAIN_KEYWORDS: &[&str] = &[
    "clause",
    "section",
    "coverage",
    "covered",
    "excluded",
    "waiting period",
    "sum insured",
    "premium",
    "deductible",
    "co-pay",
    "treatment",
    "surgery",
    "hospitalization",
    "medical",
    "claim",
    "benefit",
    "condition",
    "terms",
    "policy",
    "insured",
    "eligible",
    "reimbursement",
    "expenses",
    "limit",
    "pre-existing",
    "exclusion",
    "inclusion",
    "cashless",
    "network hospital",
    "procedure",
    "operation",
    "disease",
    "illness",
    "injury",
    "emergency",
    "ambulance",
    "consultation",
    "diagnostic",
    "therapy",
    "medicine",
    "rupees",
    "\u{20b9}",
    "amount",
    "cost",
    "fee",
    "charge",
    "payable",
];

static REGISTRATION_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^uin[-\s]*[a-z0-9]+$").expect("registration header regex is valid")
});
// Numeric clause references ("12.3") or enumerated procedure lines
// ("34 removal of foreign body") both signal indexable content.
static CLAUSE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\.\d+|\d+\s+[a-z].*?(surgery|procedure|treatment|removal|repair)")
        .expect("clause code regex is valid")
});

/// Decide whether a chunk carries enough information to index.
pub fn is_relevant(text: &str) -> bool {
    let trimmed = text.trim();
    let chars = trimmed.chars().count();
    if chars < MIN_CHUNK_CHARS {
        return false;
    }

    let lower = trimmed.to_lowercase();

    let is_pure_contact = BOILERPLATE_PHRASES.iter().any(|p| lower.contains(p))
        && chars < BOILERPLATE_MAX_CHARS;
    if is_pure_contact {
        return false;
    }

    if REGISTRATION_HEADER_RE.is_match(&lower) {
        return false;
    }

    if DOMAIN_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }

    if CLAUSE_CODE_RE.is_match(&lower) {
        return true;
    }

    let substantial_words = trimmed
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .count();
    substantial_words > MIN_SUBSTANTIAL_WORDS && chars > MIN_SUBSTANTIAL_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_fragments_are_rejected() {
        assert!(!is_relevant("knee surgery waiting period"));
        assert!(!is_relevant(""));
        assert!(!is_relevant("   "));
    }

    #[test]
    fn short_boilerplate_is_rejected() {
        assert!(!is_relevant(
            "For more details, log on to: www.bajajallianz.com today"
        ));
    }

    #[test]
    fn long_text_quoting_boilerplate_is_kept() {
        let text = "The insured may obtain cashless treatment at any network hospital, \
                    subject to prior authorization by the company. Claims must be intimated \
                    within thirty days. For more details, log on to: www.bajajallianz.com";
        assert!(text.chars().count() >= BOILERPLATE_MAX_CHARS);
        assert!(is_relevant(text));
    }

    #[test]
    fn registration_header_is_rejected() {
        // Long enough to pass the length gate, but purely a UIN stamp.
        assert!(!is_relevant(
            "UIN- BAJHLIP23020V012223BAJHLIP23020V012223BAJHLIP23020V012223"
        ));
    }

    #[test]
    fn domain_keywords_are_accepted() {
        assert!(is_relevant(
            "A waiting period of thirty six months applies to cataract and joint replacement"
        ));
    }

    #[test]
    fn clause_codes_are_accepted() {
        // No domain keyword, but a numeric clause reference.
        assert!(is_relevant(
            "Refer to item 12.3 in the annexure for the list applicable to plan B holders"
        ));
    }

    #[test]
    fn substantial_generic_text_is_accepted() {
        let text = "Several independent considerations determine the outcome described above, \
                    including documentation quality and timeliness of notification overall.";
        assert!(is_relevant(text));
    }

    #[test]
    fn generic_noise_is_rejected_even_past_min_length() {
        // Over 50 chars but few substantial words and under 100 chars total.
        assert!(!is_relevant("to a of in on at by is as it be we or so an do no up"));
    }
}
