//! Deterministic token extraction from narrative text.
//!
//! Three independent patterns (percentage, currency, date) run over the
//! original text. Bare numbers are only scanned in lenient mode, on a working
//! copy where every other match is blanked out with spaces of the same byte
//! length, so spans still index the original text and no digit is counted
//! twice.
//!
//! The patterns use neither backreferences nor lookaround. A percentage
//! match that begins inside a longer digit run ("10034.5%" matches from
//! "034.5%") is widened back to the start of the run, so the token carries
//! the full figure and cannot verify as a shorter allowed one.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{ExtractedToken, ExtractionMode, Span, TokenKind};

fn percentage_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[-+]?\d{1,3}(?:,\d{3})*(?:\.\d+)?\s?%")
            .expect("percentage regex must compile")
    })
}

fn currency_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\d+(?:,\d{3})*(?:\.\d+)?[BMK]?").expect("currency regex must compile")
    })
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+\d{4}",
        )
        .expect("date regex must compile")
    })
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b\d{1,3}(?:,\d{3})+(?:\.\d+)?\b|\b\d+(?:\.\d+)?\b")
            .expect("number regex must compile")
    })
}

/// Extract percentages in order of appearance, duplicates included
pub fn extract_percentages(text: &str) -> Vec<ExtractedToken> {
    percentage_re()
        .find_iter(text)
        .map(|m| {
            let start = digit_run_start(text, m.start());
            ExtractedToken::new(
                TokenKind::Percentage,
                &text[start..m.end()],
                Span::new(start, m.end()),
            )
        })
        .collect()
}

/// Start of the numeric run a match begins inside
///
/// Walks back over digits, and over `,` or `.` between digits, then takes a
/// leading sign. A match that already starts with a sign is left alone.
fn digit_run_start(text: &str, start: usize) -> usize {
    let bytes = text.as_bytes();
    if matches!(bytes.get(start), Some(b'-' | b'+')) {
        return start;
    }

    let mut i = start;
    while i > 0 {
        match bytes[i - 1] {
            b'0'..=b'9' => i -= 1,
            b',' | b'.' if i >= 2 && bytes[i - 2].is_ascii_digit() => i -= 1,
            _ => break,
        }
    }
    if i < start && i > 0 && matches!(bytes[i - 1], b'-' | b'+') {
        i -= 1;
    }
    i
}

/// Extract currency amounts ("$229.87", "$125.0B")
pub fn extract_currency(text: &str) -> Vec<ExtractedToken> {
    scan(currency_re(), text, TokenKind::Currency)
}

/// Extract "Month D, YYYY" dates (month name case-insensitive)
pub fn extract_dates(text: &str) -> Vec<ExtractedToken> {
    scan(date_re(), text, TokenKind::Date)
}

/// Extract bare numbers not already part of a percentage, currency or date
pub fn extract_numbers(text: &str) -> Vec<ExtractedToken> {
    let mut claimed = extract_percentages(text);
    claimed.extend(extract_currency(text));
    claimed.extend(extract_dates(text));
    numbers_outside(text, &claimed)
}

fn numbers_outside(text: &str, claimed: &[ExtractedToken]) -> Vec<ExtractedToken> {
    let working = blank_spans(text, claimed.iter().map(|t| t.span));
    scan(number_re(), &working, TokenKind::Number)
}

/// Replace each span with ASCII spaces, keeping byte offsets stable
fn blank_spans(text: &str, spans: impl Iterator<Item = Span>) -> String {
    let mut bytes = text.as_bytes().to_vec();
    for span in spans {
        for b in &mut bytes[span.start..span.end] {
            *b = b' ';
        }
    }
    // Spans come from regex matches on `text`, so they sit on char boundaries
    // and blanking whole matches keeps the buffer valid UTF-8.
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn scan(re: &Regex, text: &str, kind: TokenKind) -> Vec<ExtractedToken> {
    re.find_iter(text)
        .map(|m| ExtractedToken::new(kind, m.as_str(), Span::new(m.start(), m.end())))
        .collect()
}

/// Extract all strict-mode tokens (percentage, currency, date)
///
/// Tokens are ordered by position in the text.
pub fn extract_tokens(text: &str) -> Vec<ExtractedToken> {
    extract_tokens_with(text, ExtractionMode::Strict)
}

/// Extract tokens for the given mode, ordered by position in the text
pub fn extract_tokens_with(text: &str, mode: ExtractionMode) -> Vec<ExtractedToken> {
    let mut tokens = extract_percentages(text);
    tokens.extend(extract_currency(text));
    tokens.extend(extract_dates(text));

    if mode == ExtractionMode::Lenient {
        let numbers = numbers_outside(text, &tokens);
        tokens.extend(numbers);
    }

    tokens.sort_by_key(|t| (t.span.start, t.span.end));
    tokens
}
