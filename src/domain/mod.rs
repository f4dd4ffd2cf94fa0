//! Domain types for narrative auditing.
//!
//! This module contains the core data structures:
//! - MetricsDocument: Trusted structured metrics with the audit index
//! - ExtractedToken: A numeric/date claim found in narrative text
//! - AuditPolicy: Tolerances and extraction mode
//! - AuditVerdict: Result of an audit, plus the fallback decision

pub mod metrics;
pub mod policy;
pub mod token;
pub mod verdict;

pub use metrics::{
    AuditIndex, Concentration, CurrentPrice, DataQuality, Drawdown, Holder, Meta,
    MetricsDocument, OwnershipSection, PriceSection, RawDisplay, Returns, Volatility,
    NOT_AVAILABLE,
};
pub use policy::{AuditPolicy, ExtractionMode, DEFAULT_PERCENT_TOLERANCE};
pub use token::{ExtractedToken, NormalizedValue, Span, TokenKind};
pub use verdict::{AuditVerdict, FallbackDecision, VerifiedToken, Violation};
