use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::types::Platform;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").expect("valid regex"));
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9']+").expect("valid regex"));

/// Function words ignored when mining recurring phrases.
pub const STOPWORDS: [&str; 42] = [
    "the", "a", "an", "and", "or", "but", "if", "then", "this", "that", "these", "those", "is",
    "are", "was", "were", "be", "been", "being", "to", "of", "in", "on", "for", "with", "as", "at",
    "by", "from", "it", "its", "we", "our", "you", "your", "i", "me", "my", "us", "so", "not",
    "no",
];

#[must_use]
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Drop links and collapse runs of whitespace.
pub fn normalize_text(text: &str) -> String {
    let without_links = URL_RE.replace_all(text, "");
    SPACE_RE.replace_all(&without_links, " ").trim().to_string()
}

/// Lowercased word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F300..=0x1FAFF | 0x2600..=0x26FF | 0x2700..=0x27BF | 0x1F1E6..=0x1F1FF
    )
}

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Stable id for a post: SHA-256 of `platform:lowercased text`.
pub fn content_id(platform: Platform, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(platform.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(text.to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii_no_truncation() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 50), "hello world");
    }

    #[test]
    fn truncate_ascii_with_truncation() {
        assert_eq!(truncate_with_ellipsis("hello world", 5), "hello...");
    }

    #[test]
    fn truncate_multibyte_on_char_boundary() {
        assert_eq!(truncate_with_ellipsis("₹₹₹₹", 2), "₹₹...");
    }

    #[test]
    fn normalize_strips_links_and_whitespace() {
        let text = "Read this  https://example.com/a?b=1\n\n now ";
        assert_eq!(normalize_text(text), "Read this now");
    }

    #[test]
    fn tokenize_lowercases_and_keeps_apostrophes() {
        assert_eq!(
            tokenize("We're LIVE, finally!"),
            vec!["we're".to_string(), "live".into(), "finally".into()]
        );
    }

    #[test]
    fn split_sentences_ignores_empty_parts() {
        assert_eq!(
            split_sentences("One. Two?! Three"),
            vec!["One", "Two", "Three"]
        );
    }

    #[test]
    fn emoji_ranges() {
        assert!(is_emoji('🚀'));
        assert!(is_emoji('☀'));
        assert!(!is_emoji('a'));
        assert!(!is_emoji('₹'));
    }

    #[test]
    fn content_id_ignores_case_but_not_platform() {
        let a = content_id(Platform::X, "Hello World");
        let b = content_id(Platform::X, "hello world");
        let c = content_id(Platform::Linkedin, "hello world");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
