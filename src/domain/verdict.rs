//! Audit verdicts and fallback decisions.
//!
//! A failed audit is a normal business outcome, so violations are data on
//! the verdict rather than errors.

use serde::{Deserialize, Serialize};

use super::policy::ExtractionMode;
use super::token::{ExtractedToken, NormalizedValue, Span, TokenKind};

/// A token that traced back to the audit index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedToken {
    pub token: ExtractedToken,
    pub normalized: NormalizedValue,
    /// Allowed value that satisfied the comparison
    pub matched: NormalizedValue,
}

/// A claim with no basis in the audit index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: TokenKind,
    pub raw_text: String,
    pub span: Span,
    pub normalized: NormalizedValue,
    /// Nearest allowed value, when the allowed set of this kind is non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closest_allowed: Option<NormalizedValue>,
}

impl Violation {
    /// One-line description used in reports and logs
    pub fn describe(&self) -> String {
        let mut line = format!("{}: {}", self.kind, self.raw_text);
        match (&self.normalized, &self.closest_allowed) {
            (NormalizedValue::Unparsed(_), _) => line.push_str(" (unparsed)"),
            (normalized, Some(closest)) => {
                line.push_str(&format!(
                    " (normalized {}, closest allowed {})",
                    normalized, closest
                ));
            }
            (normalized, None) => line.push_str(&format!(" (normalized {})", normalized)),
        }
        line
    }
}

/// Result of auditing one narrative against one index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditVerdict {
    pub passed: bool,
    pub mode: ExtractionMode,
    /// "sha256:..." of the audited text
    pub text_sha256: String,
    pub verified: Vec<VerifiedToken>,
    pub violations: Vec<Violation>,
}

impl AuditVerdict {
    /// Build a verdict; `passed` is derived from the violation list
    pub fn new(
        mode: ExtractionMode,
        text_sha256: String,
        verified: Vec<VerifiedToken>,
        violations: Vec<Violation>,
    ) -> Self {
        Self {
            passed: violations.is_empty(),
            mode,
            text_sha256,
            verified,
            violations,
        }
    }

    /// Total number of extracted tokens
    pub fn token_count(&self) -> usize {
        self.verified.len() + self.violations.len()
    }

    /// Violations of a single kind
    pub fn violations_of(&self, kind: TokenKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// Verified tokens of a single kind
    pub fn verified_of(&self, kind: TokenKind) -> impl Iterator<Item = &VerifiedToken> {
        self.verified.iter().filter(move |v| v.token.kind == kind)
    }
}

/// Publishable text chosen for a candidate narrative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackDecision {
    pub final_text: String,
    pub used_fallback: bool,
}
