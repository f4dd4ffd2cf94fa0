//! narrative-audit - Number and date audit for generated financial narratives
//!
//! Checks that a machine-generated narrative introduces no percentage,
//! currency amount or date beyond those declared in the structured metrics
//! document it summarizes. A narrative that fails is replaced by a
//! deterministic skeleton text.
//!
//! # Architecture
//!
//! - The metrics document is validated before its audit index is trusted
//! - The audit index is canonicalized fresh for every audit
//! - Audits are pure functions returning a verdict; violations are data
//! - Matching is fail-closed: an empty category rejects every claim of that kind
//!
//! # Modules
//!
//! - `audit`: Extraction, normalization, matching, fallback, reports
//! - `schema`: Structure, consistency and completeness checks
//! - `core`: NarrativeGuard combining the two
//! - `domain`: Data structures (MetricsDocument, AuditPolicy, AuditVerdict)
//! - `evidence`: Text hashing and span location
//! - `config`: Policy configuration from file and environment
//!
//! # Usage
//!
//! ```
//! use narrative_audit::{MetricsDocument, NarrativeGuard};
//!
//! let document = MetricsDocument::from_json(r#"{
//!     "meta": {"ticker": "AAPL", "schema_version": "2.0.0"},
//!     "price": {},
//!     "audit_index": {
//!         "percent_strings": ["28.5%"], "currency_strings": [], "dates": [],
//!         "labels": [], "numbers": [], "windows": []
//!     }
//! }"#).unwrap();
//!
//! let outcome = NarrativeGuard::default()
//!     .check(&document, "Shares returned 31.2% over the year.", "Summary unavailable.")
//!     .unwrap();
//! assert!(outcome.decision.used_fallback);
//! ```

pub mod audit;
pub mod config;
pub mod core;
pub mod domain;
pub mod evidence;
pub mod schema;

// Re-export main types at crate root for convenience
pub use audit::{
    audit, audit_document, build_canonical_index, extract_tokens, render_audit_report,
    resolve_final_text, CanonicalIndex,
};
pub use crate::core::{GuardOutcome, NarrativeGuard};
pub use domain::{
    AuditIndex, AuditPolicy, AuditVerdict, ExtractedToken, ExtractionMode, FallbackDecision,
    MetricsDocument, TokenKind, Violation,
};
pub use schema::{validate_schema, SchemaError, ValidationReport};
