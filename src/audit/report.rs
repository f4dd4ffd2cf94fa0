//! Human-readable audit reports.
//!
//! Pure formatting; never affects the pass/fail decision.

use crate::domain::AuditVerdict;
use crate::evidence::{extract_anchor_text, offset_to_line_col};

/// Characters of context shown on each side of a violation
const ANCHOR_CONTEXT: usize = 30;

/// Short summary: verified/hallucinated counts and one line per violation
pub fn render_audit_report(verdict: &AuditVerdict) -> String {
    if verdict.passed {
        return format!(
            "AUDIT PASSED\nVerified {} elements",
            verdict.verified.len()
        );
    }

    let mut lines = vec![
        "AUDIT FAILED".to_string(),
        format!("Hallucinated elements: {}", verdict.violations.len()),
    ];
    for violation in &verdict.violations {
        lines.push(format!("  - {}", violation.describe()));
    }
    lines.push(format!("Verified elements: {}", verdict.verified.len()));

    lines.join("\n")
}

/// Report with each violation located in the narrative (line, column, context)
pub fn render_audit_report_with_context(verdict: &AuditVerdict, text: &str) -> String {
    let mut report = render_audit_report(verdict);
    if verdict.passed {
        return report;
    }

    report.push_str("\nLocations:");
    for violation in &verdict.violations {
        let span = violation.span;
        if span.end > text.len() {
            continue;
        }
        let pos = offset_to_line_col(text, span.start);
        let anchor = extract_anchor_text(text, span, ANCHOR_CONTEXT);
        report.push_str(&format!(
            "\n  {}:{} {:?} in \"{}\"",
            pos.line, pos.col, violation.raw_text, anchor
        ));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{audit, build_canonical_index};
    use crate::domain::AuditIndex;

    fn index() -> crate::audit::CanonicalIndex {
        build_canonical_index(&AuditIndex {
            percent_strings: vec!["28.5%".to_string()],
            dates: vec!["July 15, 2025".to_string()],
            ..Default::default()
        })
    }

    #[test]
    fn test_passing_report() {
        let verdict = audit("Up 28.5% since July 15, 2025.", &index(), 0.0005);
        assert_eq!(render_audit_report(&verdict), "AUDIT PASSED\nVerified 2 elements");
    }

    #[test]
    fn test_failing_report_lists_violations() {
        let verdict = audit(
            "Return was 99.9% from January 1, 2025 to February 1, 2025.",
            &index(),
            0.0005,
        );
        let report = render_audit_report(&verdict);

        assert!(report.starts_with("AUDIT FAILED"));
        assert!(report.contains("Hallucinated elements: 3"));
        assert!(report.contains("  - percentage: 99.9% (normalized 0.999, closest allowed 0.285)"));
        assert!(report.contains("  - date: January 1, 2025 (normalized 2025-01-01)"));
        assert!(report.ends_with("Verified elements: 0"));
    }

    #[test]
    fn test_report_with_context() {
        let text = "Line one.\nReturn was 99.9% overall.";
        let verdict = audit(text, &index(), 0.0005);
        let report = render_audit_report_with_context(&verdict, text);

        assert!(report.contains("Locations:"));
        assert!(report.contains("2:12 \"99.9%\""));
    }
}
