//! Typed model of the structured metrics document (schema v2).
//!
//! The metrics producer owns this document; the audit engine only reads it.
//! Every section is a concrete struct so a missing required field fails at
//! deserialization instead of at some later read site.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display value used by the producer when a figure could not be computed
pub const NOT_AVAILABLE: &str = "Not available";

/// The full structured metrics document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDocument {
    /// Ticker, schema version and provenance
    pub meta: Meta,

    /// Price-derived figures
    pub price: PriceSection,

    /// Institutional ownership block (13F), absent for uncovered tickers
    #[serde(
        default,
        rename = "ownership_13f",
        alias = "ownership",
        skip_serializing_if = "Option::is_none"
    )]
    pub ownership: Option<OwnershipSection>,

    /// Data coverage notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<DataQuality>,

    /// Free-text footnotes rendered under the report
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footnotes: Vec<String>,

    /// Whitelist of display values a narrative may quote
    #[serde(alias = "auditIndex")]
    pub audit_index: AuditIndex,
}

impl MetricsDocument {
    /// Ticker symbol from the meta block
    pub fn ticker(&self) -> &str {
        &self.meta.ticker
    }

    /// Declared schema version
    pub fn schema_version(&self) -> &str {
        &self.meta.schema_version
    }
}

/// Provenance block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub ticker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_local: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_utc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<i64>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub schema_version: String,
}

/// A raw numeric value paired with its human-facing rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDisplay {
    pub raw: Option<f64>,
    pub display: String,
}

/// Price-derived section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<CurrentPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Returns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<Volatility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawdown: Option<Drawdown>,
}

impl PriceSection {
    /// Names of the sub-sections that are present
    pub fn section_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.current.is_some() {
            names.push("current");
        }
        if self.returns.is_some() {
            names.push("returns");
        }
        if self.volatility.is_some() {
            names.push("volatility");
        }
        if self.drawdown.is_some() {
            names.push("drawdown");
        }
        names
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPrice {
    pub value: Option<f64>,
    pub display: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_display: Option<String>,
}

/// Trailing returns keyed by window label ("1M", "1Y", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Returns {
    #[serde(default)]
    pub windows: Vec<String>,
    pub raw: BTreeMap<String, Option<f64>>,
    pub display: BTreeMap<String, String>,
    /// Performance label ("strong", "positive", "flat", "negative", "poor")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_return: Option<f64>,
}

/// Annualized volatility over a fixed window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volatility {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_days: Option<u32>,
    pub raw: Option<f64>,
    pub display: String,
    /// "low", "moderate", "high" or "unknown"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// e.g. "(21-day)"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    pub max_dd_raw: Option<f64>,
    pub max_dd_display: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_date_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trough_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trough_date_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_date_display: Option<String>,
    #[serde(default)]
    pub recovered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_status: Option<String>,
}

/// Institutional ownership (13F filings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of_display: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_value: Option<RawDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_holders: Option<u64>,
    pub concentration: Concentration,
    #[serde(default)]
    pub top_holders: Vec<Holder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
}

/// Holder concentration with the basis the level was judged on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concentration {
    /// "CR5", "HHI" or "insufficient_data"
    pub basis: String,
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cr1: Option<RawDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cr5: Option<RawDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cr10: Option<RawDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hhi: Option<RawDisplay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holder {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub filer: Option<String>,
    #[serde(default)]
    pub value_raw: Option<f64>,
    #[serde(default)]
    pub value_display: Option<String>,
    #[serde(default)]
    pub share_of_total_raw: Option<f64>,
    #[serde(default)]
    pub share_of_total_display: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_coverage: Option<RawDisplay>,
    #[serde(default)]
    pub missing_days: u32,
    #[serde(
        default,
        rename = "13f_age_days",
        skip_serializing_if = "Option::is_none"
    )]
    pub ownership_age_days: Option<u32>,
    #[serde(default)]
    pub limitations: Vec<String>,
}

/// Categorized whitelist declared by the metrics producer
///
/// Every category defaults to empty so a partial index (as produced by older
/// producers or hand-written fixtures) still deserializes; the schema gate is
/// where missing categories are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditIndex {
    #[serde(default)]
    pub percent_strings: Vec<String>,
    #[serde(default)]
    pub currency_strings: Vec<String>,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub numbers: Vec<f64>,
    #[serde(default)]
    pub windows: Vec<String>,
}

impl AuditIndex {
    /// JSON keys of the six categories, in declaration order
    pub const CATEGORIES: [&'static str; 6] = [
        "percent_strings",
        "currency_strings",
        "dates",
        "labels",
        "numbers",
        "windows",
    ];

    /// Number of entries per category
    pub fn category_sizes(&self) -> BTreeMap<String, usize> {
        [
            ("percent_strings", self.percent_strings.len()),
            ("currency_strings", self.currency_strings.len()),
            ("dates", self.dates.len()),
            ("labels", self.labels.len()),
            ("numbers", self.numbers.len()),
            ("windows", self.windows.len()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.category_sizes().values().all(|n| *n == 0)
    }
}
