//! Structural checks on the raw JSON document, then typed parsing.
//!
//! The shape checks run on `serde_json::Value` first so the error names the
//! missing section or category instead of a generic serde message.

use serde_json::{Map, Value};

use super::consistency::{validate_schema, ValidationReport};
use super::SchemaError;
use crate::domain::{AuditIndex, MetricsDocument};

/// Top-level sections every document must carry
pub const REQUIRED_SECTIONS: [&str; 3] = ["meta", "price", "audit_index"];

fn section<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).or_else(|| match name {
        "audit_index" => obj.get("auditIndex"),
        _ => None,
    })
}

/// Check required sections, schema version presence and audit index shape
pub fn check_structure(value: &Value) -> Result<(), SchemaError> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;

    for name in REQUIRED_SECTIONS {
        if section(obj, name).is_none() {
            return Err(SchemaError::MissingSection {
                section: name.to_string(),
            });
        }
    }

    let version = obj
        .get("meta")
        .and_then(|meta| meta.get("schema_version"))
        .and_then(Value::as_str);
    if version.is_none() {
        return Err(SchemaError::SchemaVersionMismatch {
            expected: super::SCHEMA_VERSION.to_string(),
            found: None,
        });
    }

    let audit_index = section(obj, "audit_index")
        .and_then(Value::as_object)
        .ok_or(SchemaError::AuditIndexNotObject)?;

    for category in AuditIndex::CATEGORIES {
        match audit_index.get(category) {
            None => {
                return Err(SchemaError::MissingAuditCategory {
                    category: category.to_string(),
                })
            }
            Some(v) if !v.is_array() => {
                return Err(SchemaError::AuditCategoryNotList {
                    category: category.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    Ok(())
}

impl MetricsDocument {
    /// Shape-check then deserialize a document
    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        check_structure(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Parse a document from JSON text
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }
}

/// Parse and fully validate a document
pub fn validate_value(value: Value) -> Result<(MetricsDocument, ValidationReport), SchemaError> {
    let document = MetricsDocument::from_value(value)?;
    let report = validate_schema(&document)?;
    Ok((document, report))
}

/// Parse and fully validate a document from JSON text
pub fn validate_json(json: &str) -> Result<(MetricsDocument, ValidationReport), SchemaError> {
    let value: Value = serde_json::from_str(json)?;
    validate_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "meta": {"ticker": "AAPL", "schema_version": "2.0.0"},
            "price": {},
            "audit_index": {
                "percent_strings": [],
                "currency_strings": [],
                "dates": [],
                "labels": [],
                "numbers": [],
                "windows": []
            }
        })
    }

    #[test]
    fn test_minimal_document_passes() {
        assert!(check_structure(&minimal()).is_ok());
        let doc = MetricsDocument::from_value(minimal()).unwrap();
        assert_eq!(doc.ticker(), "AAPL");
    }

    #[test]
    fn test_missing_section() {
        for name in REQUIRED_SECTIONS {
            let mut value = minimal();
            value.as_object_mut().unwrap().remove(name);
            assert_eq!(
                check_structure(&value),
                Err(SchemaError::MissingSection {
                    section: name.to_string()
                })
            );
        }
    }

    #[test]
    fn test_not_an_object() {
        assert_eq!(check_structure(&json!([1, 2])), Err(SchemaError::NotAnObject));
    }

    #[test]
    fn test_missing_schema_version() {
        let mut value = minimal();
        value["meta"].as_object_mut().unwrap().remove("schema_version");
        assert!(matches!(
            check_structure(&value),
            Err(SchemaError::SchemaVersionMismatch { found: None, .. })
        ));
    }

    #[test]
    fn test_audit_index_shape() {
        let mut value = minimal();
        value["audit_index"] = json!(["28.5%"]);
        assert_eq!(check_structure(&value), Err(SchemaError::AuditIndexNotObject));

        let mut value = minimal();
        value["audit_index"].as_object_mut().unwrap().remove("windows");
        assert_eq!(
            check_structure(&value),
            Err(SchemaError::MissingAuditCategory {
                category: "windows".to_string()
            })
        );

        let mut value = minimal();
        value["audit_index"]["dates"] = json!("July 15, 2025");
        assert_eq!(
            check_structure(&value),
            Err(SchemaError::AuditCategoryNotList {
                category: "dates".to_string()
            })
        );
    }

    #[test]
    fn test_camel_case_audit_index_accepted() {
        let mut value = minimal();
        let index = value.as_object_mut().unwrap().remove("audit_index").unwrap();
        value["auditIndex"] = index;
        assert!(MetricsDocument::from_value(value).is_ok());
    }

    #[test]
    fn test_typed_errors_become_malformed() {
        let mut value = minimal();
        value["audit_index"]["numbers"] = json!(["twelve"]);
        assert!(matches!(
            MetricsDocument::from_value(value),
            Err(SchemaError::Malformed { .. })
        ));
    }

    #[test]
    fn test_invalid_json_text() {
        assert!(matches!(
            MetricsDocument::from_json("{not json"),
            Err(SchemaError::Malformed { .. })
        ));
    }
}
