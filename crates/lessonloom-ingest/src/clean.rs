//! Text normalization for extracted source text.
//!
//! Extractors hand us text with PDF line breaks, hard-wrapped paragraphs and
//! glued bullet glyphs. `clean` flattens all of that into the canonical
//! single-spaced form the chunker and embedding model expect.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Bullet glyphs commonly left glued to their item text by PDF extraction.
const BULLET_GLYPHS: [char; 6] = ['\u{2022}', '\u{25E6}', '\u{2023}', '\u{25AA}', '\u{25CF}', '\u{00B7}'];

/// Normalize raw extracted text.
///
/// Collapses every whitespace run (including newlines) to a single space,
/// inserts a space after a bullet glyph that is glued to the following
/// character, and trims the ends. Total and idempotent:
/// `clean(clean(x)) == clean(x)`.
pub fn clean(raw: &str) -> String {
    let collapsed = WHITESPACE_RUN.replace_all(raw, " ");
    let collapsed = collapsed.trim();

    let mut out = String::with_capacity(collapsed.len());
    let mut chars = collapsed.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if BULLET_GLYPHS.contains(&c) {
            if let Some(&next) = chars.peek() {
                if !next.is_whitespace() {
                    out.push(' ');
                }
            }
        }
    }
    out
}
