//! Audit index derivation and completeness.
//!
//! A narrative may quote any display value the document renders, so every
//! such value has to be whitelisted. Values are found by walking the JSON
//! form of the document:
//! - `display` keys (a string, or a map of strings as in `returns.display`)
//! - other `*_display` keys carrying a percent or currency rendering
//! - `*date_display` and `as_of_display` keys as dates
//! - `level`, `basis` and `recovery_status` as labels, parenthesised
//!   `window_display` values as windows

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::SchemaError;
use crate::domain::{AuditIndex, MetricsDocument, NOT_AVAILABLE};

/// Display values found in a document, grouped by audit category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayValues {
    pub percent: BTreeSet<String>,
    pub currency: BTreeSet<String>,
    pub dates: BTreeSet<String>,
    pub labels: BTreeSet<String>,
    pub windows: BTreeSet<String>,
}

impl DisplayValues {
    fn add_rendered(&mut self, value: &str) {
        if value == NOT_AVAILABLE {
            return;
        }
        if value.contains('%') {
            self.percent.insert(value.to_string());
        } else if value.contains('$') {
            self.currency.insert(value.to_string());
        }
    }

    fn add_date(&mut self, value: &str) {
        if value != NOT_AVAILABLE {
            self.dates.insert(value.to_string());
        }
    }

    fn add_label_or_window(&mut self, value: &str) {
        if value.contains('(') && value.contains(')') {
            self.windows.insert(value.to_string());
        } else {
            self.labels.insert(value.to_string());
        }
    }

    fn visit(&mut self, value: &Value) {
        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if key == "audit_index" || key == "auditIndex" {
                        continue;
                    }
                    self.visit_entry(key, child);
                }
            }
            Value::Array(items) => items.iter().for_each(|item| self.visit(item)),
            _ => {}
        }
    }

    fn visit_entry(&mut self, key: &str, value: &Value) {
        match (key, value) {
            ("display", Value::String(s)) => self.add_rendered(s),
            ("display", Value::Object(map)) => map
                .values()
                .filter_map(Value::as_str)
                .for_each(|s| self.add_rendered(s)),
            (k, Value::String(s)) if k.ends_with("date_display") || k == "as_of_display" => {
                self.add_date(s)
            }
            ("level" | "basis", Value::String(s)) => {
                self.labels.insert(s.clone());
            }
            ("window_display" | "recovery_status", Value::String(s)) => {
                self.add_label_or_window(s)
            }
            (k, Value::String(s)) if k.ends_with("_display") => self.add_rendered(s),
            _ => self.visit(value),
        }
    }
}

/// Walk a JSON document and collect its display values
///
/// The `audit_index` block itself is skipped.
pub fn collect_display_values(value: &Value) -> DisplayValues {
    let mut values = DisplayValues::default();
    values.visit(value);
    values
}

/// Build the audit index a producer should declare for this document
///
/// Categories are sorted and de-duplicated. `numbers` is left empty; window
/// day counts reach the number set through `windows`.
pub fn derive_audit_index(document: &MetricsDocument) -> Result<AuditIndex, SchemaError> {
    let value = serde_json::to_value(document)?;
    let values = collect_display_values(&value);

    let index = AuditIndex {
        percent_strings: values.percent.into_iter().collect(),
        currency_strings: values.currency.into_iter().collect(),
        dates: values.dates.into_iter().collect(),
        labels: values.labels.into_iter().collect(),
        numbers: Vec::new(),
        windows: values.windows.into_iter().collect(),
    };

    debug!(
        ticker = document.ticker(),
        percent = index.percent_strings.len(),
        currency = index.currency_strings.len(),
        dates = index.dates.len(),
        "Derived audit index"
    );

    Ok(index)
}

impl AuditIndex {
    /// Derive the index from a document's display values
    pub fn derive(document: &MetricsDocument) -> Result<Self, SchemaError> {
        derive_audit_index(document)
    }
}

/// Which display values the declared audit index fails to whitelist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessReport {
    pub complete: bool,
    pub missing_percentages: Vec<String>,
    pub missing_currency: Vec<String>,
    pub missing_dates: Vec<String>,
    /// Display values present in the index
    pub found_count: usize,
    /// Share of display values present, 0-100
    pub coverage_pct: f64,
}

fn missing(expected: &BTreeSet<String>, declared: &[String]) -> Vec<String> {
    expected
        .iter()
        .filter(|v| !declared.contains(v))
        .cloned()
        .collect()
}

fn completeness_against(values: &DisplayValues, index: &AuditIndex) -> CompletenessReport {
    let missing_percentages = missing(&values.percent, &index.percent_strings);
    let missing_currency = missing(&values.currency, &index.currency_strings);
    let missing_dates = missing(&values.dates, &index.dates);

    let total = values.percent.len() + values.currency.len() + values.dates.len();
    let missing_count = missing_percentages.len() + missing_currency.len() + missing_dates.len();
    let found_count = total - missing_count;
    let coverage_pct = if total == 0 {
        100.0
    } else {
        found_count as f64 / total as f64 * 100.0
    };

    CompletenessReport {
        complete: missing_count == 0,
        missing_percentages,
        missing_currency,
        missing_dates,
        found_count,
        coverage_pct,
    }
}

/// Compare the declared audit index with the document's display values
///
/// Walks the typed document, so only fields `MetricsDocument` models are
/// seen. Use [`check_value_completeness`] on the producer's raw JSON to
/// also cover keys the typed model drops.
pub fn check_audit_index_completeness(
    document: &MetricsDocument,
) -> Result<CompletenessReport, SchemaError> {
    let value = serde_json::to_value(document)?;
    Ok(completeness_against(
        &collect_display_values(&value),
        &document.audit_index,
    ))
}

/// Completeness of a raw JSON document against its own `audit_index`
pub fn check_value_completeness(value: &Value) -> Result<CompletenessReport, SchemaError> {
    let index_value = value
        .get("audit_index")
        .or_else(|| value.get("auditIndex"))
        .ok_or_else(|| SchemaError::MissingSection {
            section: "audit_index".to_string(),
        })?;
    let index: AuditIndex = serde_json::from_value(index_value.clone())?;
    Ok(completeness_against(&collect_display_values(value), &index))
}
