//! Tolerance-aware matching of extracted tokens against a canonical index.
//!
//! - Percentages: absolute tolerance on fractions, signs must agree unless
//!   one side is zero
//! - Dates: exact ISO equality
//! - Currency: exact display string equality
//! - Bare numbers (lenient mode): relative tolerance with an absolute floor

use tracing::debug;

use super::extract::extract_tokens_with;
use super::index::{build_canonical_index, CanonicalIndex};
use super::normalize::{is_iso_date, normalize_date, normalize_number, normalize_percentage};
use crate::domain::{
    AuditPolicy, AuditVerdict, ExtractedToken, MetricsDocument, NormalizedValue, TokenKind,
    VerifiedToken, Violation,
};
use crate::evidence::compute_hash;

/// Slack for binary floating point error at the tolerance boundary
pub const FLOAT_SLACK: f64 = 1e-9;

/// Audit `text` with the strict policy and the given percentage tolerance
pub fn audit(text: &str, index: &CanonicalIndex, tolerance: f64) -> AuditVerdict {
    audit_with_policy(
        text,
        index,
        &AuditPolicy::strict().with_percent_tolerance(tolerance),
    )
}

/// Build the canonical index from a document's audit index, then audit
///
/// The document is expected to have passed schema validation already.
pub fn audit_document(text: &str, document: &MetricsDocument, policy: &AuditPolicy) -> AuditVerdict {
    let index = build_canonical_index(&document.audit_index);
    audit_with_policy(text, &index, policy)
}

/// Audit `text` against `index` under `policy`
pub fn audit_with_policy(text: &str, index: &CanonicalIndex, policy: &AuditPolicy) -> AuditVerdict {
    let tokens = extract_tokens_with(text, policy.mode);
    debug!(
        tokens = tokens.len(),
        mode = policy.mode.as_str(),
        "Extracted narrative tokens"
    );

    let mut verified = Vec::new();
    let mut violations = Vec::new();

    for token in tokens {
        match check_token(&token, index, policy) {
            Check::Verified { normalized, matched } => verified.push(VerifiedToken {
                token,
                normalized,
                matched,
            }),
            Check::Violated {
                normalized,
                closest_allowed,
            } => violations.push(Violation {
                kind: token.kind,
                raw_text: token.raw_text,
                span: token.span,
                normalized,
                closest_allowed,
            }),
        }
    }

    AuditVerdict::new(
        policy.mode,
        compute_hash(text),
        verified,
        violations,
    )
}

enum Check {
    Verified {
        normalized: NormalizedValue,
        matched: NormalizedValue,
    },
    Violated {
        normalized: NormalizedValue,
        closest_allowed: Option<NormalizedValue>,
    },
}

fn check_token(token: &ExtractedToken, index: &CanonicalIndex, policy: &AuditPolicy) -> Check {
    match token.kind {
        TokenKind::Percentage => check_percentage(&token.raw_text, index, policy.percent_tolerance),
        TokenKind::Date => check_date(&token.raw_text, index),
        TokenKind::Currency => check_currency(&token.raw_text, index),
        TokenKind::Number => check_number(&token.raw_text, index, policy),
    }
}

fn check_percentage(raw: &str, index: &CanonicalIndex, tolerance: f64) -> Check {
    let value = match normalize_percentage(raw) {
        Ok(v) => v,
        Err(_) => return unparsed(raw),
    };

    let matched = index
        .fractions
        .iter()
        .copied()
        .find(|allowed| fraction_matches(value, *allowed, tolerance));

    match matched {
        Some(allowed) => Check::Verified {
            normalized: NormalizedValue::Fraction(value),
            matched: NormalizedValue::Fraction(allowed),
        },
        None => Check::Violated {
            normalized: NormalizedValue::Fraction(value),
            closest_allowed: index.closest_fraction(value).map(NormalizedValue::Fraction),
        },
    }
}

/// Within tolerance, and not of opposite sign
pub fn fraction_matches(found: f64, allowed: f64, tolerance: f64) -> bool {
    if found != 0.0 && allowed != 0.0 && found.is_sign_negative() != allowed.is_sign_negative() {
        return false;
    }
    (found - allowed).abs() <= tolerance + FLOAT_SLACK
}

fn check_date(raw: &str, index: &CanonicalIndex) -> Check {
    let normalized = normalize_date(raw);
    if !is_iso_date(&normalized) {
        return unparsed(raw);
    }

    if index.dates.contains(&normalized) {
        Check::Verified {
            normalized: NormalizedValue::IsoDate(normalized.clone()),
            matched: NormalizedValue::IsoDate(normalized),
        }
    } else {
        Check::Violated {
            normalized: NormalizedValue::IsoDate(normalized),
            closest_allowed: None,
        }
    }
}

fn check_currency(raw: &str, index: &CanonicalIndex) -> Check {
    if index.currency.contains(raw) {
        Check::Verified {
            normalized: NormalizedValue::Display(raw.to_string()),
            matched: NormalizedValue::Display(raw.to_string()),
        }
    } else {
        Check::Violated {
            normalized: NormalizedValue::Display(raw.to_string()),
            closest_allowed: None,
        }
    }
}

fn check_number(raw: &str, index: &CanonicalIndex, policy: &AuditPolicy) -> Check {
    let value = match normalize_number(raw) {
        Ok(v) => v,
        Err(_) => return unparsed(raw),
    };

    let matched = index
        .numbers
        .iter()
        .copied()
        .find(|allowed| (value - allowed).abs() <= policy.number_tolerance(*allowed) + FLOAT_SLACK);

    match matched {
        Some(allowed) => Check::Verified {
            normalized: NormalizedValue::Number(value),
            matched: NormalizedValue::Number(allowed),
        },
        None => Check::Violated {
            normalized: NormalizedValue::Number(value),
            closest_allowed: index.closest_number(value).map(NormalizedValue::Number),
        },
    }
}

fn unparsed(raw: &str) -> Check {
    Check::Violated {
        normalized: NormalizedValue::Unparsed(raw.to_string()),
        closest_allowed: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuditIndex, ExtractionMode};

    fn canonical(percents: &[&str], dates: &[&str]) -> CanonicalIndex {
        build_canonical_index(&AuditIndex {
            percent_strings: percents.iter().map(|s| s.to_string()).collect(),
            dates: dates.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn test_tolerance_boundary() {
        assert!(fraction_matches(0.2855, 0.285, 0.0005));
        assert!(fraction_matches(0.2845, 0.285, 0.0005));
        assert!(!fraction_matches(0.30, 0.285, 0.0005));
        assert!(!fraction_matches(0.2857, 0.285, 0.0005));
    }

    #[test]
    fn test_sign_must_agree() {
        assert!(!fraction_matches(0.0002, -0.0002, 0.0005));
        assert!(fraction_matches(0.0, -0.0002, 0.0005));
        assert!(fraction_matches(-0.0002, 0.0, 0.0005));
    }

    #[test]
    fn test_audit_passes_with_tolerance() {
        let index = canonical(&["28.5%"], &[]);
        let verdict = audit("The return was 28.50% this month.", &index, 0.0005);
        assert!(verdict.passed);
        assert_eq!(verdict.verified.len(), 1);
    }

    #[test]
    fn test_unauthorized_percentage_reports_closest() {
        let index = canonical(&["28.5%", "-18.5%"], &[]);
        let verdict = audit("The return was 99.9% this month.", &index, 0.0005);

        assert!(!verdict.passed);
        assert_eq!(verdict.violations.len(), 1);
        let v = &verdict.violations[0];
        assert_eq!(v.raw_text, "99.9%");
        match v.closest_allowed {
            Some(NormalizedValue::Fraction(c)) => assert!((c - 0.285).abs() < 1e-10),
            ref other => panic!("unexpected closest value: {:?}", other),
        }
    }

    #[test]
    fn test_negative_never_matches_positive() {
        let index = canonical(&["18.5%"], &[]);
        let verdict = audit("Drawdown of -18.5%.", &index, 0.0005);
        assert!(!verdict.passed);
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        let index = canonical(&["0.0%"], &[]);
        assert!(audit("No change at -0.0% today.", &index, 0.0005).passed);
    }

    #[test]
    fn test_empty_index_fails_closed() {
        let index = canonical(&[], &[]);
        let verdict = audit("Up 1.0% on July 15, 2025 at $10.00.", &index, 0.0005);
        assert_eq!(verdict.violations.len(), 3);
        assert!(verdict.violations.iter().all(|v| v.closest_allowed.is_none()));
    }

    #[test]
    fn test_dates_exact_after_normalization() {
        let index = canonical(&[], &["August 5, 2025"]);
        assert!(audit("It happened on August 05, 2025.", &index, 0.0005).passed);
        assert!(!audit("It happened on August 6, 2025.", &index, 0.0005).passed);
    }

    #[test]
    fn test_impossible_date_is_unparsed_violation() {
        let index = canonical(&[], &["February 28, 2025"]);
        let verdict = audit("Closed February 30, 2025.", &index, 0.0005);
        assert_eq!(
            verdict.violations[0].normalized,
            NormalizedValue::Unparsed("February 30, 2025".to_string())
        );
    }

    #[test]
    fn test_currency_exact_match() {
        let index = build_canonical_index(&AuditIndex {
            currency_strings: vec!["$229.87".to_string()],
            ..Default::default()
        });
        assert!(audit("It closed at $229.87.", &index, 0.0005).passed);
        assert!(!audit("It closed at $229.9.", &index, 0.0005).passed);
    }

    #[test]
    fn test_lenient_numbers() {
        let index = build_canonical_index(&AuditIndex {
            percent_strings: vec!["28.5%".to_string()],
            numbers: vec![100.0],
            windows: vec!["(21-day)".to_string()],
            ..Default::default()
        });
        let policy = AuditPolicy::lenient();

        let verdict = audit_with_policy("The 21-day return was 29.0% on 104 filers.", &index, &policy);
        assert!(verdict.passed, "{:?}", verdict.violations);
        assert_eq!(verdict.mode, ExtractionMode::Lenient);

        let verdict = audit_with_policy("There were 110 filers.", &index, &policy);
        assert!(!verdict.passed);
        assert_eq!(
            verdict.violations[0].closest_allowed,
            Some(NormalizedValue::Number(100.0))
        );
    }

    #[test]
    fn test_verdict_carries_text_hash() {
        let index = canonical(&["28.5%"], &[]);
        let a = audit("Up 28.5%.", &index, 0.0005);
        let b = audit("Up 28.5%.", &index, 0.0005);
        assert!(a.text_sha256.starts_with("sha256:"));
        assert_eq!(a, b);
    }
}
