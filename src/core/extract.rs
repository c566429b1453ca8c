//! Text-level extraction: turning rendered badge text and CSS values into
//! typed fields.

use regex::Regex;
use std::sync::LazyLock;

static CSS_URL_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^url\(["']?"#).expect("static regex"));
static CSS_URL_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["']?\)$"#).expect("static regex"));

/// Parses a rating badge such as `"4,5"` or `"3"`. Comma decimals are
/// accepted; values outside `0..=5` are rejected.
pub fn parse_rating(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    let rating: f64 = normalized.parse().ok()?;
    (0.0..=5.0).contains(&rating).then_some(rating)
}

/// Parses a reviewer badge such as `"(1.234)"` into `1234`.
///
/// Parentheses, whitespace and both `.` and `,` thousands separators are
/// removed before parsing.
pub fn parse_reviewer_count(text: &str) -> Option<u32> {
    let digits: String = text
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .chars()
        .filter(|c| !matches!(c, '.' | ',') && !c.is_whitespace())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Strips a CSS `url("...")` wrapper down to the bare URL.
pub fn strip_css_url(value: &str) -> String {
    let value = value.trim();
    let value = CSS_URL_OPEN.replace(value, "");
    CSS_URL_CLOSE.replace(&value, "").into_owned()
}

/// Returns the full-size form of a photo URL, or `None` when the URL is not
/// a photo asset.
///
/// Only URLs ending in `marker` qualify. The second `=`-delimited segment is
/// replaced with `canonical_size`; URLs without `=` are returned unchanged.
pub fn canonical_photo_url(url: &str, marker: &str, canonical_size: &str) -> Option<String> {
    if url.is_empty() || !url.ends_with(marker) {
        return None;
    }
    let rewritten = url
        .split('=')
        .enumerate()
        .map(|(i, segment)| if i == 1 { canonical_size } else { segment })
        .collect::<Vec<_>>()
        .join("=");
    Some(rewritten)
}

/// Trimmed text, with blank values folded into `None`.
pub fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4,5"), Some(4.5));
        assert_eq!(parse_rating("3"), Some(3.0));
        assert_eq!(parse_rating(" 4.8 "), Some(4.8));
        assert_eq!(parse_rating("7,1"), None);
        assert_eq!(parse_rating(""), None);
        assert_eq!(parse_rating("n/a"), None);
    }

    #[test]
    fn test_parse_reviewer_count() {
        assert_eq!(parse_reviewer_count("(1.234)"), Some(1234));
        assert_eq!(parse_reviewer_count("(9)"), Some(9));
        assert_eq!(parse_reviewer_count("(10)"), Some(10));
        assert_eq!(parse_reviewer_count("(1.234.567)"), Some(1_234_567));
        assert_eq!(parse_reviewer_count("(2,048)"), Some(2048));
        assert_eq!(parse_reviewer_count("()"), None);
        assert_eq!(parse_reviewer_count("(1,2 rb)"), None);
    }

    #[test]
    fn test_strip_css_url() {
        assert_eq!(
            strip_css_url(r#"url("https://lh5.googleusercontent.com/p/AF1Q=w203-h152-k-no")"#),
            "https://lh5.googleusercontent.com/p/AF1Q=w203-h152-k-no"
        );
        assert_eq!(strip_css_url("url('https://a/b')"), "https://a/b");
        assert_eq!(strip_css_url("url(https://a/b)"), "https://a/b");
        assert_eq!(strip_css_url("none"), "none");
    }

    #[test]
    fn test_canonical_photo_url() {
        assert_eq!(
            canonical_photo_url(
                "https://lh5.googleusercontent.com/p/AF1Q=w203-h152-k-no",
                "k-no",
                "s1080-k-no"
            )
            .as_deref(),
            Some("https://lh5.googleusercontent.com/p/AF1Q=s1080-k-no")
        );
        assert_eq!(
            canonical_photo_url("https://a/p/X=w100-k-no=extra-k-no", "k-no", "s1080-k-no")
                .as_deref(),
            Some("https://a/p/X=s1080-k-no=extra-k-no")
        );
        assert_eq!(
            canonical_photo_url("https://a/p/X=w100-h100-k-no-pi-10", "k-no", "s1080-k-no"),
            None
        );
        assert_eq!(canonical_photo_url("", "k-no", "s1080-k-no"), None);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".to_string())).as_deref(), Some("x"));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }
}
