//! Span utilities for locating claims in narrative text
//!
//! Spans are UTF-8 byte ranges into the narrative as received. Offsets that
//! land inside a multi-byte character are moved back to its first byte.

use sha2::{Digest, Sha256};

use crate::domain::Span;

/// Fingerprint of an audited narrative, "sha256:" followed by 64 hex digits
pub fn compute_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    format!("sha256:{}", hex::encode(digest))
}

fn floor_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// The span plus up to `context` characters on each side, on one line
///
/// Truncated sides are marked with "...".
pub fn extract_anchor_text(text: &str, span: Span, context: usize) -> String {
    let start = floor_boundary(text, span.start);
    let end = floor_boundary(text, span.end).max(start);

    let from = text[..start]
        .char_indices()
        .rev()
        .take(context)
        .last()
        .map_or(start, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .nth(context)
        .map_or(text.len(), |(i, _)| end + i);

    let body = text[from..to].replace('\n', " ");
    let prefix = if from > 0 { "..." } else { "" };
    let suffix = if to < text.len() { "..." } else { "" };
    format!("{}{}{}", prefix, body, suffix)
}

/// Line and column position (1-indexed for editor compatibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub col: usize,
}

/// Line and character column of a byte offset
pub fn offset_to_line_col(text: &str, offset: usize) -> LineCol {
    let offset = floor_boundary(text, offset);
    let mut pos = LineCol { line: 1, col: 1 };
    for ch in text[..offset].chars() {
        if ch == '\n' {
            pos.line += 1;
            pos.col = 1;
        } else {
            pos.col += 1;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_hash() {
        let hash = compute_hash("Up 28.5% this year.");
        assert!(hash.starts_with("sha256:"));
        assert_eq!(hash.len(), 7 + 64);
        assert_eq!(hash, compute_hash("Up 28.5% this year."));
        assert_ne!(hash, compute_hash("Up 28.6% this year."));
    }

    #[test]
    fn test_offset_to_line_col() {
        let text = "line1\nline2\nline3";

        assert_eq!(offset_to_line_col(text, 0), LineCol { line: 1, col: 1 });
        assert_eq!(offset_to_line_col(text, 6), LineCol { line: 2, col: 1 });
        assert_eq!(offset_to_line_col(text, 8), LineCol { line: 2, col: 3 });
        assert_eq!(offset_to_line_col(text, 99), LineCol { line: 3, col: 6 });
    }

    #[test]
    fn test_offset_counts_chars_not_bytes() {
        let text = "é 12%";
        assert_eq!(offset_to_line_col(text, 3), LineCol { line: 1, col: 3 });
        // Inside the two-byte 'é'
        assert_eq!(offset_to_line_col(text, 1), LineCol { line: 1, col: 1 });
    }

    #[test]
    fn test_extract_anchor_text() {
        let text = "This is a long narrative with many words and content for testing.";
        let anchor = extract_anchor_text(text, Span::new(15, 24), 6);
        assert_eq!(anchor, "... long narrative with ...");
    }

    #[test]
    fn test_anchor_text_whole_line() {
        let anchor = extract_anchor_text("a\nb 5% c", Span::new(4, 6), 80);
        assert_eq!(anchor, "a b 5% c");
        assert_eq!(extract_anchor_text("5%", Span::new(0, 2), 0), "5%");
    }
}
