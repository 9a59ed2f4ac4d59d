//! Filter criteria for selecting survey responses
//!
//! Criteria arrive as JSON and are validated once, up front, into typed
//! predicates. Anything outside the closed operator set is rejected here, so
//! evaluation never has to deal with malformed input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

pub const DATA_CLAUSE: &str = "data";
pub const PERSON_ATTRIBUTES_CLAUSE: &str = "personAttributes";

/// Criteria failed validation against the closed operator schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("{clause}.{key}: unknown operator '{op}'")]
    UnknownOperator {
        clause: &'static str,
        key: String,
        op: String,
    },
    #[error("{clause}.{key}: predicate must be an object with a string 'op' field")]
    MissingOperator { clause: &'static str, key: String },
    #[error("{clause}.{key}: operator '{op}' requires {expected}")]
    InvalidOperand {
        clause: &'static str,
        key: String,
        op: String,
        expected: &'static str,
    },
    #[error("{clause}.{key}: operator '{op}' does not take a value")]
    UnexpectedOperand {
        clause: &'static str,
        key: String,
        op: String,
    },
    #[error("{clause}.{key}: unexpected field '{field}'")]
    UnexpectedField {
        clause: &'static str,
        key: String,
        field: String,
    },
    #[error("malformed filter criteria: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Right-hand side of an equality test
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Operand {
    Text(String),
    Number(f64),
}

impl Operand {
    fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::String(s) => Some(Operand::Text(s.clone())),
            JsonValue::Number(n) => n.as_f64().map(Operand::Number),
            _ => None,
        }
    }
}

/// Predicate on a single question's answer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DataPredicate {
    LessThan { value: f64 },
    LessEqual { value: f64 },
    GreaterEqual { value: f64 },
    GreaterThan { value: f64 },
    IncludesOne { value: Vec<String> },
    IncludesAll { value: Vec<String> },
    Equals { value: Operand },
    NotEquals { value: Operand },
    Accepted,
    Clicked,
    Submitted,
    Skipped,
    Uploaded,
    NotUploaded,
    Booked,
}

impl DataPredicate {
    fn parse(key: &str, raw: &JsonValue) -> Result<Self, SchemaValidationError> {
        let RawPredicate { op, value } = RawPredicate::parse(DATA_CLAUSE, key, raw)?;

        let invalid = |expected: &'static str| SchemaValidationError::InvalidOperand {
            clause: DATA_CLAUSE,
            key: key.to_string(),
            op: op.to_string(),
            expected,
        };
        let number = || value.and_then(JsonValue::as_f64).ok_or_else(|| invalid("a numeric value"));
        let strings = || {
            value
                .and_then(JsonValue::as_array)
                .and_then(|items| {
                    items
                        .iter()
                        .map(|item| item.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .ok_or_else(|| invalid("an array of strings"))
        };
        let operand = || {
            value
                .and_then(Operand::from_json)
                .ok_or_else(|| invalid("a string or numeric value"))
        };
        let no_operand = |predicate: DataPredicate| match value {
            None => Ok(predicate),
            Some(_) => Err(SchemaValidationError::UnexpectedOperand {
                clause: DATA_CLAUSE,
                key: key.to_string(),
                op: op.to_string(),
            }),
        };

        match op {
            "lessThan" => Ok(DataPredicate::LessThan { value: number()? }),
            "lessEqual" => Ok(DataPredicate::LessEqual { value: number()? }),
            "greaterEqual" => Ok(DataPredicate::GreaterEqual { value: number()? }),
            "greaterThan" => Ok(DataPredicate::GreaterThan { value: number()? }),
            "includesOne" => Ok(DataPredicate::IncludesOne { value: strings()? }),
            "includesAll" => Ok(DataPredicate::IncludesAll { value: strings()? }),
            "equals" => Ok(DataPredicate::Equals { value: operand()? }),
            "notEquals" => Ok(DataPredicate::NotEquals { value: operand()? }),
            "accepted" => no_operand(DataPredicate::Accepted),
            "clicked" => no_operand(DataPredicate::Clicked),
            "submitted" => no_operand(DataPredicate::Submitted),
            "skipped" => no_operand(DataPredicate::Skipped),
            "uploaded" => no_operand(DataPredicate::Uploaded),
            "notUploaded" => no_operand(DataPredicate::NotUploaded),
            "booked" => no_operand(DataPredicate::Booked),
            _ => Err(SchemaValidationError::UnknownOperator {
                clause: DATA_CLAUSE,
                key: key.to_string(),
                op: op.to_string(),
            }),
        }
    }
}

/// Predicate on a person attribute; only (in)equality is supported
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum AttributePredicate {
    Equals { value: Operand },
    NotEquals { value: Operand },
}

impl AttributePredicate {
    fn parse(key: &str, raw: &JsonValue) -> Result<Self, SchemaValidationError> {
        let RawPredicate { op, value } = RawPredicate::parse(PERSON_ATTRIBUTES_CLAUSE, key, raw)?;

        let operand = || {
            value
                .and_then(Operand::from_json)
                .ok_or_else(|| SchemaValidationError::InvalidOperand {
                    clause: PERSON_ATTRIBUTES_CLAUSE,
                    key: key.to_string(),
                    op: op.to_string(),
                    expected: "a string or numeric value",
                })
        };

        match op {
            "equals" => Ok(AttributePredicate::Equals { value: operand()? }),
            "notEquals" => Ok(AttributePredicate::NotEquals { value: operand()? }),
            _ => Err(SchemaValidationError::UnknownOperator {
                clause: PERSON_ATTRIBUTES_CLAUSE,
                key: key.to_string(),
                op: op.to_string(),
            }),
        }
    }
}

/// `{ "op": ..., "value"?: ... }` before the operator is known to be valid
struct RawPredicate<'a> {
    op: &'a str,
    value: Option<&'a JsonValue>,
}

impl<'a> RawPredicate<'a> {
    fn parse(
        clause: &'static str,
        key: &str,
        raw: &'a JsonValue,
    ) -> Result<Self, SchemaValidationError> {
        let object = raw
            .as_object()
            .ok_or_else(|| SchemaValidationError::MissingOperator {
                clause,
                key: key.to_string(),
            })?;

        if let Some(field) = object.keys().find(|k| *k != "op" && *k != "value") {
            return Err(SchemaValidationError::UnexpectedField {
                clause,
                key: key.to_string(),
                field: field.clone(),
            });
        }

        let op = object
            .get("op")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| SchemaValidationError::MissingOperator {
                clause,
                key: key.to_string(),
            })?;

        Ok(RawPredicate {
            op,
            value: object.get("value"),
        })
    }
}

/// Inclusive creation-time window; either bound may be open
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatedAtRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<DateTime<Utc>>,
}

impl CreatedAtRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.min.is_none_or(|min| at >= min) && self.max.is_none_or(|max| at <= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TagsFilter {
    #[serde(default)]
    pub applied: Vec<String>,
    #[serde(default)]
    pub not_applied: Vec<String>,
}

/// Validated filter criteria
///
/// All clauses are optional and AND-combined. `FilterCriteria::default()` is
/// the identity filter and matches every response.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<CreatedAtRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_attributes: Option<HashMap<String, AttributePredicate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, DataPredicate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagsFilter>,
}

/// Wire shape: top-level fields are checked by serde, predicates by hand so
/// errors can name the offending key and operator.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawFilterCriteria {
    #[serde(default)]
    finished: Option<bool>,
    #[serde(default)]
    created_at: Option<CreatedAtRange>,
    #[serde(default)]
    person_attributes: Option<HashMap<String, JsonValue>>,
    #[serde(default)]
    data: Option<HashMap<String, JsonValue>>,
    #[serde(default)]
    tags: Option<TagsFilter>,
}

impl FilterCriteria {
    /// Validate a JSON criteria document
    pub fn from_json(value: JsonValue) -> Result<Self, SchemaValidationError> {
        let raw: RawFilterCriteria = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }

    fn from_raw(raw: RawFilterCriteria) -> Result<Self, SchemaValidationError> {
        let person_attributes = raw
            .person_attributes
            .map(|clause| {
                clause
                    .iter()
                    .map(|(key, predicate)| {
                        AttributePredicate::parse(key, predicate).map(|p| (key.clone(), p))
                    })
                    .collect::<Result<HashMap<_, _>, _>>()
            })
            .transpose()?;

        let data = raw
            .data
            .map(|clause| {
                clause
                    .iter()
                    .map(|(key, predicate)| {
                        DataPredicate::parse(key, predicate).map(|p| (key.clone(), p))
                    })
                    .collect::<Result<HashMap<_, _>, _>>()
            })
            .transpose()?;

        Ok(FilterCriteria {
            finished: raw.finished,
            created_at: raw.created_at,
            person_attributes,
            data,
            tags: raw.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_criteria() {
        let criteria = FilterCriteria::from_json(json!({})).unwrap();
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_full_criteria() {
        let criteria = FilterCriteria::from_json(json!({
            "finished": true,
            "createdAt": { "min": "2024-01-01T00:00:00Z" },
            "personAttributes": { "plan": { "op": "equals", "value": "pro" } },
            "data": {
                "nps": { "op": "greaterEqual", "value": 9 },
                "features": { "op": "includesAll", "value": ["a", "b"] },
                "cta": { "op": "clicked" }
            },
            "tags": { "applied": ["t1"], "notApplied": ["t2"] }
        }))
        .unwrap();

        assert_eq!(criteria.finished, Some(true));
        assert!(criteria.created_at.as_ref().unwrap().max.is_none());

        let data = criteria.data.unwrap();
        assert_eq!(data["nps"], DataPredicate::GreaterEqual { value: 9.0 });
        assert_eq!(
            data["features"],
            DataPredicate::IncludesAll {
                value: vec!["a".to_string(), "b".to_string()]
            }
        );
        assert_eq!(data["cta"], DataPredicate::Clicked);

        let attrs = criteria.person_attributes.unwrap();
        assert_eq!(
            attrs["plan"],
            AttributePredicate::Equals {
                value: Operand::Text("pro".to_string())
            }
        );

        let tags = criteria.tags.unwrap();
        assert_eq!(tags.applied, vec!["t1"]);
        assert_eq!(tags.not_applied, vec!["t2"]);
    }

    #[test]
    fn test_unknown_operator_names_key_and_op() {
        let err = FilterCriteria::from_json(json!({
            "data": { "q1": { "op": "betweenx", "value": 3 } }
        }))
        .unwrap_err();

        assert!(matches!(err, SchemaValidationError::UnknownOperator { .. }));
        let message = err.to_string();
        assert!(message.contains("q1"));
        assert!(message.contains("betweenx"));
    }

    #[test]
    fn test_numeric_operator_requires_number() {
        let err = FilterCriteria::from_json(json!({
            "data": { "q1": { "op": "lessThan", "value": "5" } }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaValidationError::InvalidOperand { .. }));

        let err = FilterCriteria::from_json(json!({
            "data": { "q1": { "op": "lessThan" } }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaValidationError::InvalidOperand { .. }));
    }

    #[test]
    fn test_includes_requires_string_array() {
        let err = FilterCriteria::from_json(json!({
            "data": { "q1": { "op": "includesOne", "value": ["a", 1] } }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("an array of strings"));
    }

    #[test]
    fn test_equals_accepts_string_or_number() {
        let criteria = FilterCriteria::from_json(json!({
            "data": {
                "q1": { "op": "equals", "value": "yes" },
                "q2": { "op": "notEquals", "value": 4 }
            }
        }))
        .unwrap();
        let data = criteria.data.unwrap();
        assert_eq!(
            data["q1"],
            DataPredicate::Equals {
                value: Operand::Text("yes".to_string())
            }
        );
        assert_eq!(
            data["q2"],
            DataPredicate::NotEquals {
                value: Operand::Number(4.0)
            }
        );

        let err = FilterCriteria::from_json(json!({
            "data": { "q1": { "op": "equals", "value": ["yes"] } }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaValidationError::InvalidOperand { .. }));
    }

    #[test]
    fn test_presence_operator_rejects_value() {
        let err = FilterCriteria::from_json(json!({
            "data": { "q1": { "op": "skipped", "value": true } }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaValidationError::UnexpectedOperand { .. }));
    }

    #[test]
    fn test_predicate_must_have_op() {
        let err = FilterCriteria::from_json(json!({
            "data": { "q1": { "value": 3 } }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaValidationError::MissingOperator { .. }));

        let err = FilterCriteria::from_json(json!({ "data": { "q1": "equals" } })).unwrap_err();
        assert!(matches!(err, SchemaValidationError::MissingOperator { .. }));
    }

    #[test]
    fn test_predicate_extra_field_rejected() {
        let err = FilterCriteria::from_json(json!({
            "data": { "q1": { "op": "equals", "value": 1, "strict": true } }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("strict"));
    }

    #[test]
    fn test_person_attribute_operators_are_limited() {
        let err = FilterCriteria::from_json(json!({
            "personAttributes": { "age": { "op": "lessThan", "value": 30 } }
        }))
        .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("personAttributes.age"));
        assert!(message.contains("lessThan"));
    }

    #[test]
    fn test_top_level_shape_errors() {
        let err = FilterCriteria::from_json(json!({ "finished": "yes" })).unwrap_err();
        assert!(matches!(err, SchemaValidationError::Malformed(_)));

        let err = FilterCriteria::from_json(json!({ "surveyIds": [] })).unwrap_err();
        assert!(matches!(err, SchemaValidationError::Malformed(_)));

        let err = FilterCriteria::from_json(json!({
            "createdAt": { "min": "not a date" }
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaValidationError::Malformed(_)));
    }

    #[test]
    fn test_created_at_range_inclusive() {
        let min: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        let max: DateTime<Utc> = "2024-01-31T00:00:00Z".parse().unwrap();
        let range = CreatedAtRange {
            min: Some(min),
            max: Some(max),
        };

        assert!(range.contains(min));
        assert!(range.contains(max));
        assert!(!range.contains(min - chrono::Duration::seconds(1)));
        assert!(!range.contains(max + chrono::Duration::seconds(1)));
        assert!(CreatedAtRange::default().contains(min));
    }

    #[test]
    fn test_serialize_predicate() {
        let value = serde_json::to_value(DataPredicate::LessThan { value: 3.0 }).unwrap();
        assert_eq!(value, json!({ "op": "lessThan", "value": 3.0 }));

        let value = serde_json::to_value(DataPredicate::NotUploaded).unwrap();
        assert_eq!(value, json!({ "op": "notUploaded" }));
    }
}
