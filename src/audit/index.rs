//! Canonical audit index.
//!
//! Built fresh from an `AuditIndex` for every audit and never mutated
//! afterwards, so one index can be shared by reference across threads.
//! Malformed entries are dropped with a warning: index construction is
//! best-effort, while matching stays fail-closed (a dropped entry can never
//! satisfy a comparison).

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::normalize::{normalize_percentage, try_normalize_date};
use crate::domain::AuditIndex;

/// An index entry that failed to normalize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedEntry {
    /// Audit index category ("percent_strings", "dates", ...)
    pub category: String,
    pub value: String,
    pub reason: String,
}

/// Comparable form of an audit index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalIndex {
    /// Allowed percentages as fractions, sorted and de-duplicated
    pub fractions: Vec<f64>,
    /// Allowed dates as `YYYY-MM-DD`
    pub dates: BTreeSet<String>,
    /// Allowed currency displays, compared verbatim
    pub currency: BTreeSet<String>,
    /// Allowed bare numbers, sorted and de-duplicated
    pub numbers: Vec<f64>,
    pub labels: BTreeSet<String>,
    pub windows: BTreeSet<String>,
    /// Entries excluded because they did not normalize
    pub dropped: Vec<MalformedEntry>,
}

fn window_days_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)-day").expect("window regex must compile"))
}

/// Build the canonical index for one audit
pub fn build_canonical_index(audit_index: &AuditIndex) -> CanonicalIndex {
    let mut dropped = Vec::new();

    let mut fractions = Vec::with_capacity(audit_index.percent_strings.len());
    for percent_str in &audit_index.percent_strings {
        match normalize_percentage(percent_str) {
            Ok(value) => fractions.push(value),
            Err(e) => {
                warn!("Failed to normalize percentage '{}': {}", percent_str, e);
                dropped.push(MalformedEntry {
                    category: "percent_strings".to_string(),
                    value: percent_str.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut dates = BTreeSet::new();
    for date_str in &audit_index.dates {
        match try_normalize_date(date_str) {
            Ok(date) => {
                dates.insert(date.format("%Y-%m-%d").to_string());
            }
            Err(e) => {
                warn!("Failed to normalize date '{}': {}", date_str, e);
                dropped.push(MalformedEntry {
                    category: "dates".to_string(),
                    value: date_str.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let mut numbers: Vec<f64> = audit_index
        .numbers
        .iter()
        .copied()
        .filter(|n| n.is_finite())
        .collect();
    for window in &audit_index.windows {
        for caps in window_days_re().captures_iter(window) {
            if let Ok(days) = caps[1].parse::<f64>() {
                numbers.push(days);
            }
        }
    }

    CanonicalIndex {
        fractions: sorted_unique(fractions),
        dates,
        currency: audit_index.currency_strings.iter().cloned().collect(),
        numbers: sorted_unique(numbers),
        labels: audit_index.labels.iter().cloned().collect(),
        windows: audit_index.windows.iter().cloned().collect(),
        dropped,
    }
}

fn sorted_unique(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
    values
}

impl CanonicalIndex {
    /// Shorthand for [`build_canonical_index`]
    pub fn build(audit_index: &AuditIndex) -> Self {
        build_canonical_index(audit_index)
    }

    /// True when no kind of token could ever verify
    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
            && self.dates.is_empty()
            && self.currency.is_empty()
            && self.numbers.is_empty()
    }

    /// Allowed fraction nearest to `value`
    pub fn closest_fraction(&self, value: f64) -> Option<f64> {
        closest(&self.fractions, value)
    }

    /// Allowed number nearest to `value`
    pub fn closest_number(&self, value: f64) -> Option<f64> {
        closest(&self.numbers, value)
    }
}

fn closest(values: &[f64], target: f64) -> Option<f64> {
    values
        .iter()
        .copied()
        .min_by(|a, b| (a - target).abs().total_cmp(&(b - target).abs()))
}
