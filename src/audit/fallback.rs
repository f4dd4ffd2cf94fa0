//! Fallback policy: publish the candidate only if its audit passed.
//!
//! There is no retry loop here. A caller wanting regeneration re-invokes the
//! audit with a new candidate.

use tracing::{info, warn};

use super::index::CanonicalIndex;
use super::matcher::audit_with_policy;
use crate::domain::{AuditPolicy, AuditVerdict, FallbackDecision};

/// Choose the publishable text for an audited candidate
pub fn resolve_final_text(
    candidate_text: &str,
    skeleton_text: &str,
    verdict: &AuditVerdict,
) -> FallbackDecision {
    if verdict.passed {
        info!(
            verified = verdict.verified.len(),
            "Audit passed, publishing candidate narrative"
        );
        return FallbackDecision {
            final_text: candidate_text.to_string(),
            used_fallback: false,
        };
    }

    warn!(
        violations = verdict.violations.len(),
        "Audit failed, falling back to skeleton"
    );
    for violation in &verdict.violations {
        warn!("  Unauthorized {}", violation.describe());
    }

    FallbackDecision {
        final_text: skeleton_text.to_string(),
        used_fallback: true,
    }
}

/// Audit a candidate and resolve the final text in one call
pub fn audit_with_fallback(
    candidate_text: &str,
    skeleton_text: &str,
    index: &CanonicalIndex,
    policy: &AuditPolicy,
) -> (FallbackDecision, AuditVerdict) {
    let verdict = audit_with_policy(candidate_text, index, policy);
    let decision = resolve_final_text(candidate_text, skeleton_text, &verdict);
    (decision, verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::build_canonical_index;
    use crate::domain::AuditIndex;

    fn index() -> CanonicalIndex {
        build_canonical_index(&AuditIndex {
            percent_strings: vec!["28.5%".to_string()],
            ..Default::default()
        })
    }

    #[test]
    fn test_fallback_on_failure() {
        let skeleton = "The return was 28.5% this month.";
        let (decision, verdict) = audit_with_fallback(
            "The return was 99.9% this month.",
            skeleton,
            &index(),
            &AuditPolicy::default(),
        );

        assert!(!verdict.passed);
        assert!(decision.used_fallback);
        assert_eq!(decision.final_text, skeleton);
    }

    #[test]
    fn test_candidate_kept_on_success() {
        let candidate = "The return was 28.5% this month.";
        let (decision, _) =
            audit_with_fallback(candidate, "Fallback text.", &index(), &AuditPolicy::default());

        assert!(!decision.used_fallback);
        assert_eq!(decision.final_text, candidate);
    }
}
