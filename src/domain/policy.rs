//! Tolerance policy for an audit.
//!
//! Two matching strategies exist: a strict one (percentages within ±0.05
//! points, exact dates, no bare numbers) and a lenient one (±1 point, bare
//! numbers within 5%). A deployment picks exactly one.

use serde::{Deserialize, Serialize};

/// Which extraction/matching strategy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Percentages, currency and dates only
    #[default]
    Strict,
    /// Also scans bare numbers
    Lenient,
}

impl ExtractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Strict => "strict",
            ExtractionMode::Lenient => "lenient",
        }
    }

    /// Parse a mode name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Some(ExtractionMode::Strict),
            "lenient" | "loose" => Some(ExtractionMode::Lenient),
            _ => None,
        }
    }
}

/// ±0.05 percentage points, as a fraction
pub const DEFAULT_PERCENT_TOLERANCE: f64 = 0.0005;

/// ±1 percentage point, as a fraction
pub const LENIENT_PERCENT_TOLERANCE: f64 = 0.01;

pub const DEFAULT_NUMBER_RELATIVE_TOLERANCE: f64 = 0.05;

pub const DEFAULT_NUMBER_MIN_TOLERANCE: f64 = 0.1;

/// Tolerances applied by the matcher
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditPolicy {
    #[serde(default)]
    pub mode: ExtractionMode,

    /// Absolute tolerance on percentage fractions
    #[serde(default = "default_percent_tolerance")]
    pub percent_tolerance: f64,

    /// Relative tolerance on bare numbers (lenient mode)
    #[serde(default = "default_number_relative_tolerance")]
    pub number_relative_tolerance: f64,

    /// Floor of the bare number tolerance (lenient mode)
    #[serde(default = "default_number_min_tolerance")]
    pub number_min_tolerance: f64,
}

fn default_percent_tolerance() -> f64 {
    DEFAULT_PERCENT_TOLERANCE
}
fn default_number_relative_tolerance() -> f64 {
    DEFAULT_NUMBER_RELATIVE_TOLERANCE
}
fn default_number_min_tolerance() -> f64 {
    DEFAULT_NUMBER_MIN_TOLERANCE
}

impl Default for AuditPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

impl AuditPolicy {
    pub fn strict() -> Self {
        Self {
            mode: ExtractionMode::Strict,
            percent_tolerance: DEFAULT_PERCENT_TOLERANCE,
            number_relative_tolerance: DEFAULT_NUMBER_RELATIVE_TOLERANCE,
            number_min_tolerance: DEFAULT_NUMBER_MIN_TOLERANCE,
        }
    }

    pub fn lenient() -> Self {
        Self {
            mode: ExtractionMode::Lenient,
            percent_tolerance: LENIENT_PERCENT_TOLERANCE,
            ..Self::strict()
        }
    }

    /// Defaults for the given mode
    pub fn for_mode(mode: ExtractionMode) -> Self {
        match mode {
            ExtractionMode::Strict => Self::strict(),
            ExtractionMode::Lenient => Self::lenient(),
        }
    }

    pub fn with_percent_tolerance(mut self, tolerance: f64) -> Self {
        self.percent_tolerance = tolerance;
        self
    }

    /// Allowed distance between a bare number and an allowed value
    pub fn number_tolerance(&self, allowed: f64) -> f64 {
        (allowed.abs() * self.number_relative_tolerance).max(self.number_min_tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_strict() {
        let policy = AuditPolicy::default();
        assert_eq!(policy.mode, ExtractionMode::Strict);
        assert_eq!(policy.percent_tolerance, 0.0005);
    }

    #[test]
    fn test_lenient_policy() {
        let policy = AuditPolicy::lenient();
        assert_eq!(policy.mode, ExtractionMode::Lenient);
        assert_eq!(policy.percent_tolerance, 0.01);
        assert!((policy.number_tolerance(1000.0) - 50.0).abs() < 1e-9);
        assert!((policy.number_tolerance(1.0) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(ExtractionMode::parse("STRICT"), Some(ExtractionMode::Strict));
        assert_eq!(ExtractionMode::parse("loose"), Some(ExtractionMode::Lenient));
        assert_eq!(ExtractionMode::parse("fuzzy"), None);
    }

    #[test]
    fn test_policy_yaml_defaults() {
        let policy: AuditPolicy = serde_yaml::from_str("mode: lenient").unwrap();
        assert_eq!(policy.mode, ExtractionMode::Lenient);
        assert_eq!(policy.percent_tolerance, DEFAULT_PERCENT_TOLERANCE);
    }
}
