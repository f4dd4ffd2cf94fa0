//! Core guard logic.
//!
//! This module contains:
//! - NarrativeGuard: schema gate, audit and fallback in one call

pub mod guard;

pub use guard::{GuardOutcome, NarrativeGuard};
