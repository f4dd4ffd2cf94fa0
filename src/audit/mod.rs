//! Number and date audit for generated narratives.
//!
//! Ensures a narrative introduces no percentage, currency amount or date that
//! cannot be traced to the audit index.
//!
//! # Pipeline
//!
//! - `extract`: regex scan of the narrative into raw tokens
//! - `normalize`: canonical forms (fraction, ISO date, display string)
//! - `index`: canonical index built from the producer's audit index
//! - `matcher`: tolerance-aware comparison into an `AuditVerdict`
//! - `fallback`: candidate or skeleton, decided from the verdict
//! - `report`: human-readable rendering of a verdict
//!
//! Every step is a pure function over borrowed inputs.
//!
//! # Example
//!
//! ```
//! use narrative_audit::audit::{audit, build_canonical_index, resolve_final_text};
//! use narrative_audit::domain::AuditIndex;
//!
//! let index = build_canonical_index(&AuditIndex {
//!     percent_strings: vec!["28.5%".to_string()],
//!     ..Default::default()
//! });
//!
//! let verdict = audit("The stock returned 99.9%.", &index, 0.0005);
//! let decision = resolve_final_text("The stock returned 99.9%.", "Skeleton.", &verdict);
//! assert!(decision.used_fallback);
//! ```

pub mod extract;
pub mod fallback;
pub mod index;
pub mod matcher;
pub mod normalize;
pub mod report;

pub use extract::{
    extract_currency, extract_dates, extract_numbers, extract_percentages, extract_tokens,
    extract_tokens_with,
};
pub use fallback::{audit_with_fallback, resolve_final_text};
pub use index::{build_canonical_index, CanonicalIndex, MalformedEntry};
pub use matcher::{audit, audit_document, audit_with_policy, fraction_matches};
pub use normalize::{
    is_iso_date, normalize_date, normalize_number, normalize_percentage, try_normalize_date,
    NormalizeError,
};
pub use report::{render_audit_report, render_audit_report_with_context};
