//! Structural validation of tool input against its JSON Schema.
//!
//! Only the subset of JSON Schema that the tool parameter types produce is
//! checked: top-level object shape, `required`, per-property `type`, and
//! `minLength`. Unknown properties are ignored.

use serde_json::{Map, Value};

use super::error::{FieldIssue, ValidationError};

pub type JsonObject = Map<String, Value>;

/// Check `input` against `schema`, collecting every offending field.
pub fn validate_input(tool: &str, schema: &JsonObject, input: &Value) -> Result<(), ValidationError> {
    let Some(object) = input.as_object() else {
        return Err(ValidationError::single(tool, "input", "must be an object"));
    };

    let mut issues = Vec::new();

    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();

    for name in &required {
        if object.get(*name).is_none_or(Value::is_null) {
            issues.push(FieldIssue::new(*name, "is required"));
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            let Some(value) = object.get(name) else {
                continue;
            };
            // null is "absent": fine when optional, already reported when required
            if value.is_null() {
                continue;
            }
            if let Some(problem) = check_property(property, value) {
                issues.push(FieldIssue::new(name.as_str(), problem));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(tool, issues))
    }
}

fn check_property(property: &Value, value: &Value) -> Option<String> {
    let allowed = declared_types(property);
    if !allowed.is_empty() && !allowed.iter().any(|t| matches_type(t, value)) {
        return Some(format!("must be of type {}", allowed.join(" or ")));
    }

    if let (Some(min), Some(s)) = (
        property.get("minLength").and_then(Value::as_u64),
        value.as_str(),
    ) {
        if (s.chars().count() as u64) < min {
            return Some(if min == 1 {
                "must not be empty".to_string()
            } else {
                format!("must be at least {min} characters")
            });
        }
    }

    None
}

/// `type` may be a single name or an array of names (`Option<T>` renders as
/// `["string", "null"]`).
fn declared_types(property: &Value) -> Vec<&str> {
    match property.get("type") {
        Some(Value::String(t)) => vec![t.as_str()],
        Some(Value::Array(ts)) => ts.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}
