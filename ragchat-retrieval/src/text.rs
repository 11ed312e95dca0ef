//! Text normalization, embedding pre-cleaning, and content hashing.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());

/// Common English words dropped before embedding.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "if", "then", "else", "for", "on", "in", "at", "to",
    "from", "by", "of", "with", "is", "are", "was", "were", "be", "been", "it", "this", "that",
    "these", "those", "as", "so", "we", "you", "i",
];

/// Maximum length (in bytes) of text passed to the embedding service.
const MAX_EMBED_CHARS: usize = 10_000;

/// Normalize whitespace: non-breaking spaces become regular spaces, runs of
/// whitespace collapse to one space, leading/trailing whitespace is trimmed.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace('\u{00A0}', " ");
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Prepare text for embedding: lowercase, strip non-alphanumerics, drop
/// stopwords and single-character tokens, cap the length.
pub fn clean_for_embedding(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_ALNUM_RE.replace_all(&lowered, " ");

    let cleaned: Vec<&str> = stripped
        .split_whitespace()
        .filter(|w| w.len() > 1 && !STOPWORDS.contains(w))
        .collect();

    let mut out = cleaned.join(" ");
    if out.len() > MAX_EMBED_CHARS {
        // Safe: the cleaned string is pure ASCII.
        out.truncate(MAX_EMBED_CHARS);
    }
    out
}

/// SHA-256 hex digest of the text, used for ingest dedup metadata.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  hello\u{00A0} \n\t world  "), "hello world");
    }

    #[test]
    fn clean_drops_stopwords_and_punctuation() {
        assert_eq!(
            clean_for_embedding("The quick, brown fox is on a log!"),
            "quick brown fox log"
        );
    }

    #[test]
    fn clean_drops_single_char_tokens() {
        assert_eq!(clean_for_embedding("x marks the spot"), "marks spot");
    }

    #[test]
    fn hash_is_stable_and_hex() {
        let h = content_hash("hello");
        assert_eq!(h, content_hash("hello"));
        assert_eq!(h.len(), 64);
        assert_ne!(h, content_hash("hello "));
        assert_eq!(
            h,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }
}
