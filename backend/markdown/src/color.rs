//! Color Literal Scanner
//!
//! Finds hex, `rgb()` and `rgba()` color literals in plain text and resolves
//! the fill each swatch is painted with.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::LazyLock;

// ASCII word boundary: a non-ASCII letter right after the digits still
// ends the literal.
const HEX_PATTERN: &str = r"#(?:[0-9a-f]{6}|[0-9a-f]{3})(?-u:\b)";
const RGB_PATTERN: &str = r"rgb\(\s*[0-9]+\s*,\s*[0-9]+\s*,\s*[0-9]+\s*\)";
const RGBA_PATTERN: &str = r"rgba\(\s*[0-9]+\s*,\s*[0-9]+\s*,\s*[0-9]+\s*,\s*[0-9.]+\s*\)";

// Alternation is leftmost-first: at any start position hex wins over rgb,
// rgb over rgba.
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?i){HEX_PATTERN}|{RGB_PATTERN}|{RGBA_PATTERN}")).unwrap()
});

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorKind {
    Hex,
    Rgb,
    Rgba,
}

/// A recognized color literal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorToken {
    /// Matched text, exactly as written in the source.
    pub literal: String,
    /// CSS color the swatch is filled with.
    pub fill: String,
    pub kind: ColorKind,
}

impl ColorToken {
    /// Builds a token from a literal the scanner matched.
    pub fn from_literal(literal: &str) -> Self {
        let (kind, fill) = if literal.starts_with('#') {
            (ColorKind::Hex, normalize_hex(literal))
        } else if literal.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("rgba")) {
            (ColorKind::Rgba, literal.to_string())
        } else {
            (ColorKind::Rgb, literal.to_string())
        };
        Self {
            literal: literal.to_string(),
            fill,
            kind,
        }
    }
}

/// Expands `#abc` to `#aabbcc`. Six-digit values pass through with a
/// leading `#` enforced; casing is never changed.
pub fn normalize_hex(hex: &str) -> String {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.chars().count() == 3 {
        let mut out = String::with_capacity(7);
        out.push('#');
        for c in digits.chars() {
            out.push(c);
            out.push(c);
        }
        return out;
    }
    format!("#{digits}")
}

/// A color literal and where it sits in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMatch {
    pub range: Range<usize>,
    pub token: ColorToken,
}

/// All color literals in `text`, left to right, non-overlapping.
pub fn find_color_tokens(text: &str) -> Vec<ColorMatch> {
    COLOR_RE
        .find_iter(text)
        .map(|m| ColorMatch {
            range: m.range(),
            token: ColorToken::from_literal(m.as_str()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSegment<'a> {
    Plain(&'a str),
    Color(ColorToken),
}

/// Splits `text` at color literal boundaries. Text with no literal comes
/// back as a single plain segment.
pub fn split_colors(text: &str) -> Vec<TextSegment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in find_color_tokens(text) {
        if m.range.start > last {
            segments.push(TextSegment::Plain(&text[last..m.range.start]));
        }
        last = m.range.end;
        segments.push(TextSegment::Color(m.token));
    }
    if last < text.len() {
        segments.push(TextSegment::Plain(&text[last..]));
    }
    if segments.is_empty() {
        segments.push(TextSegment::Plain(text));
    }
    segments
}
