//! Tokens extracted from narrative text.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of verifiable claim a token represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// "28.5%", "-18.5 %", "1,234.5%"
    Percentage,
    /// "$229.87", "$125.0B"
    Currency,
    /// "July 15, 2025"
    Date,
    /// Bare number left after the other kinds are removed
    Number,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Percentage => "percentage",
            TokenKind::Currency => "currency",
            TokenKind::Date => "date",
            TokenKind::Number => "number",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UTF-8 byte offset range [start, end) into the narrative
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A raw claim found in the narrative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedToken {
    pub kind: TokenKind,
    /// Verbatim text of the match
    pub raw_text: String,
    pub span: Span,
}

impl ExtractedToken {
    pub fn new(kind: TokenKind, raw_text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            raw_text: raw_text.into(),
            span,
        }
    }
}

/// Canonical form a token (or index entry) is compared in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NormalizedValue {
    /// Percentage as a fraction of 1 ("28.5%" -> 0.285)
    Fraction(f64),
    /// ISO-8601 calendar date
    IsoDate(String),
    /// Opaque display string (currency)
    Display(String),
    /// Plain number
    Number(f64),
    /// Normalization failed; holds the raw text
    Unparsed(String),
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedValue::Fraction(v) | NormalizedValue::Number(v) => {
                f.write_str(&format_decimal(*v))
            }
            NormalizedValue::IsoDate(s)
            | NormalizedValue::Display(s)
            | NormalizedValue::Unparsed(s) => f.write_str(s),
        }
    }
}

/// Render a float rounded to 10 decimal places, trailing zeros trimmed
///
/// Keeps binary noise out of reports ("99.9%" normalizes to
/// 0.9990000000000001 but displays as 0.999).
pub fn format_decimal(value: f64) -> String {
    let fixed = format!("{:.10}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
