//! Text normalization into ID-safe slugs.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold arbitrary text into a slug matching `([a-z0-9]+(-[a-z0-9]+)*)?`.
///
/// NFKD-decomposes the input, drops combining marks, lowercases, collapses
/// every maximal run of characters outside `[a-z0-9]` into a single `-`, and
/// trims leading/trailing `-`. Idempotent; an empty input yields an empty
/// slug.
///
/// Only used to construct identifiers. Wiki-link lookup text is matched
/// against registered paths as-spelled and must never pass through here.
pub fn normalize(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;
    for ch in text.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        for lower in ch.to_lowercase() {
            if lower.is_ascii_alphanumeric() {
                if pending_sep && !slug.is_empty() {
                    slug.push('-');
                }
                pending_sep = false;
                slug.push(lower);
            } else {
                pending_sep = true;
            }
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_lowercase_hyphenation() {
        assert_eq!(normalize("Daily Notes"), "daily-notes");
        assert_eq!(normalize("2024-11-07 Thursday"), "2024-11-07-thursday");
    }

    #[test]
    fn test_diacritics_folded() {
        assert_eq!(normalize("Café Zürich"), "cafe-zurich");
        assert_eq!(normalize("naïve"), "naive");
    }

    #[test]
    fn test_punctuation_runs_collapse() {
        assert_eq!(normalize("foo--bar"), "foo-bar");
        assert_eq!(normalize("a / b / c"), "a-b-c");
        assert_eq!(normalize("!!hello!!"), "hello");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("???"), "");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn test_idempotent() {
        for s in ["Hello World", "café", "a--b", "", "X_Y_Z", "Ünïcøde Tëst"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_output_grammar() {
        for s in ["Hello, World!", "--x--", "Ünïcøde", "a1 b2", "日本語 text"] {
            let slug = normalize(s);
            if !slug.is_empty() {
                assert!(!slug.starts_with('-') && !slug.ends_with('-'), "{slug:?}");
                assert!(!slug.contains("--"), "{slug:?}");
                assert!(
                    slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                    "{slug:?}"
                );
            }
        }
    }
}
