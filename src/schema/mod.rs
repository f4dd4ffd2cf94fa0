//! Schema and consistency gate for the structured metrics document.
//!
//! Runs before the audit index is trusted:
//! - `structure`: required sections and audit index shape, typed parsing
//! - `consistency`: schema version, raw/display pairs, level labels
//! - `labels`: fixed classification thresholds
//! - `completeness`: every display value is whitelisted in the audit index

pub mod completeness;
pub mod consistency;
pub mod labels;
pub mod structure;

use thiserror::Error;

pub use completeness::{
    check_audit_index_completeness, check_value_completeness, collect_display_values,
    derive_audit_index, CompletenessReport, DisplayValues,
};
pub use consistency::{
    consistency_report, expected_percent_display, validate_schema, validate_schema_version,
    ConsistencyReport, ValidationReport,
};
pub use structure::{check_structure, validate_json, validate_value, REQUIRED_SECTIONS};

/// Schema version the engine is built against
pub const SCHEMA_VERSION: &str = "2.0.0";

/// Structural problem with a metrics document
///
/// Fatal to validation: callers must not build an audit index from a
/// document that produced one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Metrics document must be a JSON object")]
    NotAnObject,

    #[error("Missing required section: {section}")]
    MissingSection { section: String },

    #[error("Invalid schema version: expected {expected}, found {found:?}")]
    SchemaVersionMismatch {
        expected: String,
        found: Option<String>,
    },

    #[error("audit_index must be an object")]
    AuditIndexNotObject,

    #[error("Missing audit index category: {category}")]
    MissingAuditCategory { category: String },

    #[error("Audit index {category} must be list")]
    AuditCategoryNotList { category: String },

    #[error("Malformed metrics document: {message}")]
    Malformed { message: String },

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("{field}: raw {raw} -> display '{display}' (expected '{expected}')")]
    InconsistentDisplay {
        field: String,
        raw: f64,
        display: String,
        expected: String,
    },

    #[error("{field}: label '{label}' does not match raw {raw} (expected '{expected}')")]
    LabelMismatch {
        field: String,
        raw: f64,
        label: String,
        expected: String,
    },

    #[error("{field}: unknown label '{label}'")]
    UnknownLabel { field: String, label: String },

    #[error("{field}: value {raw} out of range")]
    OutOfRange { field: String, raw: f64 },
}

impl SchemaError {
    /// Dotted path of the offending field, when the error names one
    pub fn field(&self) -> Option<&str> {
        match self {
            SchemaError::MissingSection { section } => Some(section),
            SchemaError::SchemaVersionMismatch { .. } => Some("meta.schema_version"),
            SchemaError::AuditIndexNotObject => Some("audit_index"),
            SchemaError::MissingAuditCategory { category }
            | SchemaError::AuditCategoryNotList { category } => Some(category),
            SchemaError::MissingField { field }
            | SchemaError::InconsistentDisplay { field, .. }
            | SchemaError::LabelMismatch { field, .. }
            | SchemaError::UnknownLabel { field, .. }
            | SchemaError::OutOfRange { field, .. } => Some(field),
            SchemaError::NotAnObject | SchemaError::Malformed { .. } => None,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Malformed {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        assert_eq!(SCHEMA_VERSION, "2.0.0");
    }

    #[test]
    fn test_error_names_field() {
        let err = SchemaError::InconsistentDisplay {
            field: "price.volatility.display".to_string(),
            raw: 0.25,
            display: "24.0%".to_string(),
            expected: "25.0%".to_string(),
        };
        assert_eq!(err.field(), Some("price.volatility.display"));
        assert_eq!(
            err.to_string(),
            "price.volatility.display: raw 0.25 -> display '24.0%' (expected '25.0%')"
        );
        assert_eq!(SchemaError::NotAnObject.field(), None);
    }
}
