//! Canonical forms for tokens and audit index entries.
//!
//! - Percentages become fractions of 1 ("28.5%" -> 0.285)
//! - Dates become ISO-8601 (`YYYY-MM-DD`)
//! - Currency strings are compared as-is

use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

/// A single value could not be canonicalized
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("Invalid percentage: {input:?}")]
    InvalidPercentage { input: String },

    #[error("Invalid number: {input:?}")]
    InvalidNumber { input: String },

    #[error("Unknown month name in date: {input:?}")]
    UnknownMonth { input: String },

    #[error("Invalid date: {input:?}")]
    InvalidDate { input: String },
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Normalize a percentage display string to a fraction of 1
///
/// Strips the percent sign, surrounding whitespace and thousands
/// separators, then divides by 100. Negative zero collapses to zero.
pub fn normalize_percentage(percent_str: &str) -> Result<f64, NormalizeError> {
    let cleaned: String = percent_str
        .trim()
        .trim_end_matches('%')
        .trim()
        .chars()
        .filter(|c| *c != ',')
        .collect();

    let value: f64 = cleaned
        .parse()
        .map_err(|_| NormalizeError::InvalidPercentage {
            input: percent_str.to_string(),
        })?;

    if !value.is_finite() {
        return Err(NormalizeError::InvalidPercentage {
            input: percent_str.to_string(),
        });
    }

    Ok(unsign_zero(value / 100.0))
}

/// Normalize a bare number ("1,234.5" -> 1234.5)
pub fn normalize_number(number_str: &str) -> Result<f64, NormalizeError> {
    let cleaned: String = number_str.trim().chars().filter(|c| *c != ',').collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(unsign_zero(value)),
        _ => Err(NormalizeError::InvalidNumber {
            input: number_str.to_string(),
        }),
    }
}

fn unsign_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

/// Parse a "Month D, YYYY" (or ISO) date
///
/// Month names are matched case-insensitively, full or three-letter
/// abbreviated. The day may carry a leading zero.
pub fn try_normalize_date(date_str: &str) -> Result<NaiveDate, NormalizeError> {
    let trimmed = date_str.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    let invalid = || NormalizeError::InvalidDate {
        input: date_str.to_string(),
    };

    let (month_part, rest) = trimmed.split_once(char::is_whitespace).ok_or_else(invalid)?;
    let (day_part, year_part) = rest.trim_start().split_once(',').ok_or_else(invalid)?;

    let month = month_number(month_part).ok_or_else(|| NormalizeError::UnknownMonth {
        input: date_str.to_string(),
    })?;

    let day_part = day_part.trim();
    let year_part = year_part.trim();
    if day_part.is_empty()
        || day_part.len() > 2
        || year_part.len() != 4
        || !day_part.chars().all(|c| c.is_ascii_digit())
        || !year_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let day: u32 = day_part.parse().map_err(|_| invalid())?;
    let year: i32 = year_part.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// 1-indexed month for a full or abbreviated English month name
fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim().trim_end_matches('.').to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }

    MONTHS
        .iter()
        .position(|m| *m == lower || (lower.len() == 3 && m.starts_with(&lower)))
        .map(|i| i as u32 + 1)
}

/// Normalize a date string to `YYYY-MM-DD`
///
/// On failure the input is returned unchanged and a warning is logged;
/// callers treat a non-ISO result as a parse failure.
pub fn normalize_date(date_str: &str) -> String {
    match try_normalize_date(date_str) {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(e) => {
            warn!("Failed to parse date '{}': {}", date_str, e);
            date_str.to_string()
        }
    }
}

/// True if the string has the `YYYY-MM-DD` shape and is a real date
pub fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_simple_percentage() {
        assert!(close(normalize_percentage("28.5%").unwrap(), 0.285));
        assert!(close(normalize_percentage("-18.5%").unwrap(), -0.185));
        assert!(close(normalize_percentage("+5.2%").unwrap(), 0.052));
    }

    #[test]
    fn test_negative_zero_percentage() {
        let pos = normalize_percentage("0.0%").unwrap();
        let neg = normalize_percentage("-0.0%").unwrap();
        assert_eq!(pos, neg);
        assert!(neg.is_sign_positive());
    }

    #[test]
    fn test_percentage_with_thousands_and_space() {
        assert!(close(normalize_percentage("1,234.5%").unwrap(), 12.345));
        assert!(close(normalize_percentage("28.5 %").unwrap(), 0.285));
        assert!(close(normalize_percentage("  28.50% ").unwrap(), 0.285));
    }

    #[test]
    fn test_invalid_percentage() {
        assert!(matches!(
            normalize_percentage("abc%"),
            Err(NormalizeError::InvalidPercentage { .. })
        ));
        assert!(normalize_percentage("%").is_err());
        assert!(normalize_percentage("inf%").is_err());
    }

    #[test]
    fn test_percentage_round_trip() {
        for value in [0.285, -0.185, 0.0, 12.345, 0.0001] {
            let display = format!("{}%", value * 100.0);
            assert!(close(normalize_percentage(&display).unwrap(), value));
        }
    }

    #[test]
    fn test_normalize_number() {
        assert!(close(normalize_number("1,234.5").unwrap(), 1234.5));
        assert!(close(normalize_number("21").unwrap(), 21.0));
        assert!(normalize_number("twenty").is_err());
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(normalize_date("September 5, 2025"), "2025-09-05");
        assert_eq!(normalize_date("August 05, 2025"), "2025-08-05");
        assert_eq!(normalize_date("July 1, 2024"), "2024-07-01");
        assert_eq!(normalize_date("Aug 5, 2025"), "2025-08-05");
    }

    #[test]
    fn test_date_case_insensitive() {
        let expected = "2025-08-05";
        assert_eq!(normalize_date("august 05, 2025"), expected);
        assert_eq!(normalize_date("AUGUST 5, 2025"), expected);
        assert_eq!(normalize_date("August 5, 2025"), expected);
    }

    #[test]
    fn test_iso_date_is_idempotent() {
        assert_eq!(normalize_date("2025-08-05"), "2025-08-05");
        let once = normalize_date("July 15, 2025");
        assert_eq!(normalize_date(&once), once);
    }

    #[test]
    fn test_invalid_date_returns_input() {
        assert_eq!(normalize_date("Invalid Date"), "Invalid Date");
        assert_eq!(normalize_date("February 30, 2025"), "February 30, 2025");
        assert!(matches!(
            try_normalize_date("Smarch 3, 2025"),
            Err(NormalizeError::UnknownMonth { .. })
        ));
        assert!(try_normalize_date("July 15 2025").is_err());
        assert!(try_normalize_date("July 123, 2025").is_err());
    }

    #[test]
    fn test_is_iso_date() {
        assert!(is_iso_date("2025-07-15"));
        assert!(!is_iso_date("July 15, 2025"));
        assert!(!is_iso_date("2025-13-01"));
    }
}
