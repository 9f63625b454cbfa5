//! Text-to-markup helpers shared by the render pipeline. Nothing here does I/O.

use once_cell::sync::Lazy;
use regex::Regex;

// Matches on already-escaped text, so the only entity a URL may carry is `&amp;`.
static ESCAPED_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://(?:[^\s&]|&amp;)+").expect("static regex"));

static RAW_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("static regex"));

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Entity-encodes everything that is significant in text or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

pub fn trim_trailing_punctuation(url: &str) -> &str {
    url.trim_end_matches(TRAILING_PUNCTUATION)
}

/// Every `http(s)://` token in raw text, trailing punctuation removed.
pub fn find_urls(text: &str) -> Vec<String> {
    RAW_URL
        .find_iter(text)
        .map(|m| trim_trailing_punctuation(m.as_str()))
        .filter(|u| !u.ends_with("//"))
        .map(str::to_string)
        .collect()
}

pub fn first_url(text: &str) -> Option<String> {
    find_urls(text).into_iter().next()
}

/// Escapes `text`, then wraps each URL of the escaped result in an anchor that
/// opens a new browsing context without handing it `window.opener`.
pub fn linkify(text: &str) -> String {
    let escaped = escape_html(text);
    let mut out = String::with_capacity(escaped.len() + 64);
    let mut last = 0;

    for m in ESCAPED_URL.find_iter(&escaped) {
        let raw = html_escape::decode_html_entities(m.as_str());
        let url = trim_trailing_punctuation(&raw);
        if url.ends_with("//") {
            continue;
        }
        // escape() is deterministic, so the escaped URL is a prefix of the match.
        let href = escape_html(url);
        if !m.as_str().starts_with(&href) {
            continue;
        }

        out.push_str(&escaped[last..m.start()]);
        out.push_str(&format!(
            r#"<a href="{href}" target="_blank" rel="noopener noreferrer">{href}</a>"#
        ));
        out.push_str(&m.as_str()[href.len()..]);
        last = m.end();
    }

    out.push_str(&escaped[last..]);
    out
}

/// Relative luminance of a `#rgb` / `#rrggbb` color, `0.5` when unparsable.
pub fn luminance(hex: &str) -> f64 {
    parse_rgb(hex)
        .map(|(r, g, b)| {
            0.2126 * (r as f64 / 255.0) + 0.7152 * (g as f64 / 255.0) + 0.0722 * (b as f64 / 255.0)
        })
        .unwrap_or(0.5)
}

fn parse_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContrastText {
    Dark,
    Light,
}

impl ContrastText {
    pub fn for_background(hex: &str) -> Self {
        if luminance(hex) >= 0.5 {
            ContrastText::Dark
        } else {
            ContrastText::Light
        }
    }

    pub fn css(&self) -> &'static str {
        match self {
            ContrastText::Dark => "#1a1a1a",
            ContrastText::Light => "#ffffff",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        let out = escape_html(r#"<script>alert("x") & 'y'</script>"#);
        assert!(!out.contains('<'));
        assert!(!out.contains('>'));
        assert!(!out.contains('"'));
        assert!(!out.contains('\''));
        assert!(out.contains("&amp;"));
    }

    #[test]
    fn linkify_single_url() {
        let html = linkify("check this out https://example.com/page");
        assert_eq!(
            html,
            r#"check this out <a href="https://example.com/page" target="_blank" rel="noopener noreferrer">https://example.com/page</a>"#
        );
    }

    #[test]
    fn linkify_strips_trailing_punctuation() {
        let html = linkify("see (https://example.com/a).");
        assert!(html.contains(r#"href="https://example.com/a""#));
        assert!(html.ends_with("</a>)."));
    }

    #[test]
    fn linkify_keeps_query_ampersands_escaped() {
        let html = linkify("https://example.com/?a=1&b=2");
        assert!(html.contains(r#"href="https://example.com/?a=1&amp;b=2""#));
    }

    #[test]
    fn linkify_cannot_break_out_of_attribute() {
        let html = linkify(r#"https://evil.com/"onmouseover="alert(1)"#);
        assert!(html.contains(r#"href="https://evil.com/""#));
        assert!(!html.contains(r#""onmouseover"#));
        assert!(html.contains("&quot;onmouseover=&quot;"));
    }

    #[test]
    fn linkify_plain_text_is_only_escaped() {
        assert_eq!(linkify("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn url_extraction() {
        assert_eq!(
            first_url("check this out https://example.com/page!").as_deref(),
            Some("https://example.com/page")
        );
        assert_eq!(find_urls("http://a.io, https://b.io;").len(), 2);
        assert!(first_url("no links here").is_none());
        assert!(first_url("broken https://").is_none());
    }

    #[test]
    fn luminance_weights() {
        assert!((luminance("#ffffff") - 1.0).abs() < 1e-9);
        assert!(luminance("#000").abs() < 1e-9);
        assert!((luminance("#f00") - 0.2126).abs() < 1e-9);
        assert_eq!(luminance("javascript:alert(1)"), 0.5);
        assert_eq!(luminance("#12345"), 0.5);
    }

    #[test]
    fn contrast_picks_text_color() {
        assert_eq!(ContrastText::for_background("#ffffff"), ContrastText::Dark);
        assert_eq!(ContrastText::for_background("#1a2b3c"), ContrastText::Light);
        assert_eq!(ContrastText::for_background("bogus"), ContrastText::Dark);
    }
}
