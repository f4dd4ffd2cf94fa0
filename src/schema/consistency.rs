//! Raw/display and label consistency of a parsed document.
//!
//! Display rule for percentages: sign + `|raw * 100|` to one decimal + "%".
//! Drawdowns are always rendered negative. Null raws and "Not available"
//! displays are skipped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::labels::{classify_cr5, classify_hhi, classify_return_overall, classify_vol_level};
use super::{SchemaError, SCHEMA_VERSION};
use crate::domain::{MetricsDocument, RawDisplay, NOT_AVAILABLE};

/// Summary of a successful validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub schema_version: String,
    pub ticker: String,
    pub price_sections: Vec<String>,
    pub has_ownership: bool,
    pub has_data_quality: bool,
    pub audit_categories: BTreeMap<String, usize>,
    /// Raw/display pairs compared
    pub checked_pairs: usize,
    /// Level labels recomputed
    pub checked_labels: usize,
}

/// Every inconsistency found, rather than only the first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsistencyReport {
    pub checked_pairs: usize,
    pub checked_labels: usize,
    pub errors: Vec<SchemaError>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.errors.is_empty()
    }

    fn check_percent(&mut self, field: String, raw: Option<f64>, display: &str) {
        let Some(raw) = raw else { return };
        if display == NOT_AVAILABLE {
            return;
        }
        self.checked_pairs += 1;
        let expected = expected_percent_display(raw);
        if display != expected {
            self.errors.push(SchemaError::InconsistentDisplay {
                field,
                raw,
                display: display.to_string(),
                expected,
            });
        }
    }

    fn check_display(&mut self, field: String, raw: f64, display: &str, expected: String) {
        if display == NOT_AVAILABLE {
            return;
        }
        self.checked_pairs += 1;
        if display != expected {
            self.errors.push(SchemaError::InconsistentDisplay {
                field,
                raw,
                display: display.to_string(),
                expected,
            });
        }
    }

    fn check_label(&mut self, field: String, raw: f64, label: &str, expected: &str) {
        self.checked_labels += 1;
        if label != expected {
            self.errors.push(SchemaError::LabelMismatch {
                field,
                raw,
                label: label.to_string(),
                expected: expected.to_string(),
            });
        }
    }

    fn check_unit_range(&mut self, field: String, raw: f64) -> bool {
        if (0.0..=1.0).contains(&raw) {
            true
        } else {
            self.errors.push(SchemaError::OutOfRange { field, raw });
            false
        }
    }
}

/// Expected display for a raw fraction ("0.285" -> "28.5%")
pub fn expected_percent_display(raw: f64) -> String {
    let magnitude = format!("{:.1}", (raw * 100.0).abs());
    if raw < 0.0 {
        format!("-{}%", magnitude)
    } else {
        format!("{}%", magnitude)
    }
}

fn expected_drawdown_display(raw: f64) -> String {
    format!("-{:.1}%", (raw * 100.0).abs())
}

/// Check every raw/display pair and level label in the document
pub fn consistency_report(document: &MetricsDocument) -> ConsistencyReport {
    let mut report = ConsistencyReport::default();
    let price = &document.price;

    if let Some(returns) = &price.returns {
        for (window, raw) in &returns.raw {
            let field = format!("price.returns.display.{}", window);
            match returns.display.get(window) {
                Some(display) => report.check_percent(field, *raw, display),
                None if raw.is_some() => report.errors.push(SchemaError::MissingField { field }),
                None => {}
            }
        }

        if let Some(overall) = returns.overall.as_deref().filter(|l| *l != "unknown") {
            if let Some((_, value, expected)) = classify_return_overall(&returns.raw) {
                report.check_label(
                    "price.returns.overall".to_string(),
                    value,
                    overall,
                    expected,
                );
            }
        }
    }

    if let Some(vol) = &price.volatility {
        report.check_percent("price.volatility.display".to_string(), vol.raw, &vol.display);

        if let (Some(raw), Some(level)) = (vol.raw, vol.level.as_deref()) {
            if raw < 0.0 {
                report.errors.push(SchemaError::OutOfRange {
                    field: "price.volatility.raw".to_string(),
                    raw,
                });
            } else {
                report.check_label(
                    "price.volatility.level".to_string(),
                    raw,
                    level,
                    classify_vol_level(raw),
                );
            }
        }
    }

    if let Some(dd) = &price.drawdown {
        if let Some(raw) = dd.max_dd_raw {
            report.check_display(
                "price.drawdown.max_dd_display".to_string(),
                raw,
                &dd.max_dd_display,
                expected_drawdown_display(raw),
            );
        }
    }

    if let Some(ownership) = &document.ownership {
        let conc = &ownership.concentration;
        let pairs: [(&str, &Option<RawDisplay>); 3] =
            [("cr1", &conc.cr1), ("cr5", &conc.cr5), ("cr10", &conc.cr10)];
        for (name, pair) in pairs {
            if let Some(pair) = pair {
                report.check_percent(
                    format!("ownership_13f.concentration.{}.display", name),
                    pair.raw,
                    &pair.display,
                );
            }
        }
        if let Some(RawDisplay {
            raw: Some(raw),
            display,
        }) = &conc.hhi
        {
            report.check_display(
                "ownership_13f.concentration.hhi.display".to_string(),
                *raw,
                display,
                format!("{:.3}", raw),
            );
        }

        check_concentration_level(&mut report, document);

        for (i, holder) in ownership.top_holders.iter().enumerate() {
            if let Some(display) = &holder.share_of_total_display {
                report.check_percent(
                    format!("ownership_13f.top_holders[{}].share_of_total_display", i),
                    holder.share_of_total_raw,
                    display,
                );
            }
        }
    }

    report
}

fn check_concentration_level(report: &mut ConsistencyReport, document: &MetricsDocument) {
    let Some(ownership) = &document.ownership else {
        return;
    };
    let conc = &ownership.concentration;
    let level_field = "ownership_13f.concentration.level".to_string();

    let (name, pair, classify): (&str, &Option<RawDisplay>, fn(f64) -> &'static str) =
        match conc.basis.as_str() {
            "CR5" => ("cr5", &conc.cr5, classify_cr5),
            "HHI" => ("hhi", &conc.hhi, classify_hhi),
            "insufficient_data" => {
                report.checked_labels += 1;
                if conc.level != "unknown" {
                    report.errors.push(SchemaError::UnknownLabel {
                        field: level_field,
                        label: conc.level.clone(),
                    });
                }
                return;
            }
            other => {
                report.errors.push(SchemaError::UnknownLabel {
                    field: "ownership_13f.concentration.basis".to_string(),
                    label: other.to_string(),
                });
                return;
            }
        };

    let raw_field = format!("ownership_13f.concentration.{}.raw", name);
    let Some(raw) = pair.as_ref().and_then(|p| p.raw) else {
        report.errors.push(SchemaError::MissingField { field: raw_field });
        return;
    };

    if report.check_unit_range(raw_field, raw) {
        report.check_label(level_field, raw, &conc.level, classify(raw));
    }
}

/// Validate schema version and internal consistency against [`SCHEMA_VERSION`]
pub fn validate_schema(document: &MetricsDocument) -> Result<ValidationReport, SchemaError> {
    validate_schema_version(document, SCHEMA_VERSION)
}

/// Validate against an explicit expected schema version
///
/// Fails with the first inconsistency; use [`consistency_report`] to see all
/// of them.
pub fn validate_schema_version(
    document: &MetricsDocument,
    expected_version: &str,
) -> Result<ValidationReport, SchemaError> {
    if document.schema_version() != expected_version {
        return Err(SchemaError::SchemaVersionMismatch {
            expected: expected_version.to_string(),
            found: Some(document.schema_version().to_string()),
        });
    }

    let consistency = consistency_report(document);
    if let Some(first) = consistency.errors.into_iter().next() {
        return Err(first);
    }

    Ok(ValidationReport {
        valid: true,
        schema_version: document.schema_version().to_string(),
        ticker: document.ticker().to_string(),
        price_sections: document
            .price
            .section_names()
            .into_iter()
            .map(String::from)
            .collect(),
        has_ownership: document.ownership.is_some(),
        has_data_quality: document.data_quality.is_some(),
        audit_categories: document.audit_index.category_sizes(),
        checked_pairs: consistency.checked_pairs,
        checked_labels: consistency.checked_labels,
    })
}
