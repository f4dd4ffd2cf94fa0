//! Locating and fingerprinting audited narrative text
//!
//! Verdicts carry a `sha256:` hash of the narrative they judged so log lines
//! can be correlated with the exact text, and reports point at each
//! violation by line, column and surrounding context.

pub mod spans;

pub use spans::{compute_hash, extract_anchor_text, offset_to_line_col, LineCol};
