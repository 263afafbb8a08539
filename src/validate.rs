//! URL shape validation
//!
//! This is a shape check, not a URL parser: an optional `http://` or
//! `https://` prefix, a dotted host ending in a 2-6 letter label, and an
//! optional path. Ports, query strings, IP literals and internationalized
//! hosts are rejected.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

const URL_SHAPE: &str = r"^(https?://)?([\w.]+)\.([a-z]{2,6}\.?)(/[\w.]*)*/?$";

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII-only word characters and case folding.
    RegexBuilder::new(URL_SHAPE)
        .case_insensitive(true)
        .unicode(false)
        .build()
        .expect("URL shape pattern is valid")
});

/// Returns `true` when `text` looks like a bare or scheme-prefixed URL.
pub fn is_valid_url(text: &str) -> bool {
    URL_PATTERN.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bare_and_prefixed_hosts() {
        for url in [
            "example.com",
            "www.example.com",
            "http://example.com",
            "https://example.com",
            "HTTPS://EXAMPLE.COM",
            "sub.domain.example.museum",
            "example.com.",
            "example.com/",
            "example.com/path/to/page.html",
            "https://docs.rs/qrcode/latest/",
            "foo_bar.io",
        ] {
            assert!(is_valid_url(url), "expected valid: {url}");
        }
    }

    #[test]
    fn test_rejects_malformed_text() {
        for url in [
            "",
            "not a url",
            "example",
            "example.c",
            "example.toolongtld",
            "example.c0m",
            "ftp://example.com",
            "https://",
            "example.com:8080",
            "example.com/search?q=rust",
            "https://münchen.de",
            "192.168.0.1",
            " example.com",
        ] {
            assert!(!is_valid_url(url), "expected invalid: {url}");
        }
    }

    #[test]
    fn test_top_level_label_length_bounds() {
        assert!(is_valid_url("a.io"));
        assert!(is_valid_url("a.travel"));
        assert!(!is_valid_url("a.x"));
        assert!(!is_valid_url("a.abcdefg"));
    }
}
