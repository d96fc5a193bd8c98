//! Sliding-window chunking with fixed overlap.
//!
//! Each chunk covers a char range `[start, end)` of the cleaned text and the
//! next chunk starts at `end - overlap`, so dropping the first `overlap`
//! chars of every chunk after the first reconstructs the input exactly. That
//! reconstruction law is what keeps chunk/vector pairing auditable.

use lessonloom_core::{Error, Result};

/// A chunk-sized span of cleaned text with its char-range position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    pub text: String,
    pub index: usize,
    pub char_start: usize,
    pub char_end: usize,
}

/// Reject chunking parameters that cannot make progress.
pub fn validate_chunk_params(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(Error::Validation("chunk_size must be positive".into()));
    }
    if overlap >= chunk_size {
        return Err(Error::Validation(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Split `text` into overlapping spans of at most `chunk_size` chars.
///
/// Boundary rule: when more than `chunk_size` chars remain, the cut goes
/// after the last whitespace char inside the window, provided that cut still
/// advances past the overlap; otherwise the window is hard-cut at
/// `chunk_size`. The hard cut keeps a single unbroken run (one huge token)
/// from stalling the walk. Indices are char-based, so multi-byte input never
/// splits inside a code point.
///
/// Requires `validate_chunk_params(chunk_size, overlap)` to hold. Empty
/// input yields an empty sequence; otherwise no span is empty.
pub fn split_chunks(text: &str, chunk_size: usize, overlap: usize) -> Vec<ChunkSpan> {
    debug_assert!(validate_chunk_params(chunk_size, overlap).is_ok());

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut spans = Vec::new();
    let mut start = 0usize;

    while start < total {
        let hard_end = (start + chunk_size).min(total);
        let end = if hard_end == total {
            total
        } else {
            match chars[start..hard_end]
                .iter()
                .rposition(|c| c.is_whitespace())
            {
                // Cut just after the whitespace so the next window starts
                // on (or near) a word boundary.
                Some(ws) if ws + 1 > overlap => start + ws + 1,
                _ => hard_end,
            }
        };

        spans.push(ChunkSpan {
            text: chars[start..end].iter().collect(),
            index: spans.len(),
            char_start: start,
            char_end: end,
        });

        if end == total {
            break;
        }
        start = end - overlap;
    }

    spans
}
