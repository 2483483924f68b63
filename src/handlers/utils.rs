use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::ApiError;

/// Reject update payloads that name fields outside `allowed` or carry
/// array/object values.
pub fn ensure_updatable(data: &Map<String, Value>, allowed: &[&str]) -> Result<(), ApiError> {
    let field_errors: HashMap<String, String> = data
        .iter()
        .filter_map(|(key, value)| {
            if !allowed.contains(&key.as_str()) {
                Some((key.clone(), "is not an updatable field".to_string()))
            } else if value.is_array() || value.is_object() {
                Some((key.clone(), "must be a single value".to_string()))
            } else {
                None
            }
        })
        .collect();

    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Invalid fields in update", Some(field_errors)))
    }
}

/// Row cap for list endpoints
pub fn list_limit() -> Option<i64> {
    crate::config::config().filter.max_results
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_known_fields() {
        let data = json!({ "name": "New", "numEmployees": 3 }).as_object().cloned().unwrap();
        assert!(ensure_updatable(&data, &["name", "numEmployees"]).is_ok());
    }

    #[test]
    fn reports_unknown_fields() {
        let data = json!({ "name": "New", "handle": "x" }).as_object().cloned().unwrap();
        let err = ensure_updatable(&data, &["name"]).unwrap_err();
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["field_errors"].get("handle").is_some());
        assert!(body["field_errors"].get("name").is_none());
    }

    #[test]
    fn rejects_nested_values() {
        let data = json!({ "name": ["x"], "description": { "a": 1 }, "logoUrl": null })
            .as_object()
            .cloned()
            .unwrap();
        let err = ensure_updatable(&data, &["name", "description", "logoUrl"]).unwrap_err();
        let body = err.to_json();
        assert_eq!(body["field_errors"]["name"], "must be a single value");
        assert_eq!(body["field_errors"]["description"], "must be a single value");
        assert!(body["field_errors"].get("logoUrl").is_none());
    }
}
