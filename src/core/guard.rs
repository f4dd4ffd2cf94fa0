//! Narrative guard: validate, index, audit, fall back.
//!
//! The one entry point a report generator needs. A document that fails the
//! schema gate never reaches the audit.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::audit::{audit_with_policy, build_canonical_index, resolve_final_text};
use crate::config::ResolvedConfig;
use crate::domain::{AuditPolicy, AuditVerdict, FallbackDecision, MetricsDocument};
use crate::schema::{validate_schema_version, SchemaError, ValidationReport, SCHEMA_VERSION};

/// Everything decided about one candidate narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardOutcome {
    pub decision: FallbackDecision,
    pub verdict: AuditVerdict,
    pub validation: ValidationReport,
}

impl GuardOutcome {
    /// Text to publish
    pub fn final_text(&self) -> &str {
        &self.decision.final_text
    }
}

/// Audit guard configured with one policy and schema version
#[derive(Debug, Clone)]
pub struct NarrativeGuard {
    policy: AuditPolicy,
    expected_schema_version: String,
}

impl Default for NarrativeGuard {
    fn default() -> Self {
        Self::new(AuditPolicy::default())
    }
}

impl NarrativeGuard {
    /// Create a guard for the built-in schema version
    pub fn new(policy: AuditPolicy) -> Self {
        Self {
            policy,
            expected_schema_version: SCHEMA_VERSION.to_string(),
        }
    }

    /// Create a guard from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            policy: config.policy,
            expected_schema_version: config.expected_schema_version.clone(),
        }
    }

    pub fn with_schema_version(mut self, version: impl Into<String>) -> Self {
        self.expected_schema_version = version.into();
        self
    }

    pub fn policy(&self) -> &AuditPolicy {
        &self.policy
    }

    pub fn expected_schema_version(&self) -> &str {
        &self.expected_schema_version
    }

    /// Validate the document, audit the candidate and pick the final text
    #[instrument(skip_all, fields(ticker = %document.ticker(), mode = self.policy.mode.as_str()))]
    pub fn check(
        &self,
        document: &MetricsDocument,
        candidate_text: &str,
        skeleton_text: &str,
    ) -> Result<GuardOutcome, SchemaError> {
        let validation = validate_schema_version(document, &self.expected_schema_version)
            .inspect_err(|e| warn!(error = %e, "Schema validation failed, audit skipped"))?;

        let index = build_canonical_index(&document.audit_index);
        if !index.dropped.is_empty() {
            warn!(dropped = index.dropped.len(), "Audit index had malformed entries");
        }

        let verdict = audit_with_policy(candidate_text, &index, &self.policy);
        let decision = resolve_final_text(candidate_text, skeleton_text, &verdict);

        info!(
            passed = verdict.passed,
            used_fallback = decision.used_fallback,
            text = %verdict.text_sha256,
            "Narrative guard finished"
        );

        Ok(GuardOutcome {
            decision,
            verdict,
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExtractionMode;
    use serde_json::json;

    fn document() -> MetricsDocument {
        serde_json::from_value(json!({
            "meta": {"ticker": "AAPL", "schema_version": "2.0.0"},
            "price": {
                "returns": {
                    "raw": {"1Y": 0.285},
                    "display": {"1Y": "28.5%"}
                }
            },
            "audit_index": {
                "percent_strings": ["28.5%"],
                "currency_strings": [],
                "dates": ["July 15, 2025"],
                "labels": [],
                "numbers": [],
                "windows": []
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_passing_candidate_published() {
        let guard = NarrativeGuard::default();
        let outcome = guard
            .check(&document(), "AAPL returned 28.5% as of July 15, 2025.", "Skeleton.")
            .unwrap();

        assert!(outcome.verdict.passed);
        assert!(!outcome.decision.used_fallback);
        assert_eq!(outcome.final_text(), "AAPL returned 28.5% as of July 15, 2025.");
        assert_eq!(outcome.validation.ticker, "AAPL");
    }

    #[test]
    fn test_failing_candidate_falls_back() {
        let guard = NarrativeGuard::default();
        let outcome = guard
            .check(&document(), "AAPL returned 31.0%.", "Skeleton.")
            .unwrap();

        assert!(!outcome.verdict.passed);
        assert_eq!(outcome.final_text(), "Skeleton.");
    }

    #[test]
    fn test_schema_failure_stops_before_audit() {
        let mut doc = document();
        doc.price
            .returns
            .as_mut()
            .unwrap()
            .display
            .insert("1Y".to_string(), "30.0%".to_string());

        let result = NarrativeGuard::default().check(&doc, "AAPL returned 28.5%.", "Skeleton.");
        assert!(matches!(result, Err(SchemaError::InconsistentDisplay { .. })));
    }

    #[test]
    fn test_from_config() {
        let config = ResolvedConfig {
            policy: AuditPolicy::lenient(),
            expected_schema_version: "2.1.0".to_string(),
            config_file: None,
        };
        let guard = NarrativeGuard::from_config(&config);
        assert_eq!(guard.policy().mode, ExtractionMode::Lenient);
        assert_eq!(guard.expected_schema_version(), "2.1.0");

        let result = guard.check(&document(), "Fine.", "Skeleton.");
        assert!(matches!(result, Err(SchemaError::SchemaVersionMismatch { .. })));
    }

    #[test]
    fn test_lenient_guard_tolerates_close_percent() {
        let guard = NarrativeGuard::new(AuditPolicy::lenient());
        let outcome = guard.check(&document(), "AAPL returned 29%.", "Skeleton.").unwrap();
        assert!(outcome.verdict.passed);
    }
}
