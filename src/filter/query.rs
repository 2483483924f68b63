use serde_json::Value;

use super::types::FilterCriteria;

/// Parse a raw URL query string into filter criteria, keeping parameter order.
///
/// Every value arrives as text; `FilterWhere` coerces it per filter key. A
/// repeated key keeps its first position and its last value.
pub fn criteria_from_query(raw: Option<&str>) -> FilterCriteria {
    let mut criteria = FilterCriteria::new();
    if let Some(raw) = raw {
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            criteria.insert(key.into_owned(), Value::String(value.into_owned()));
        }
    }
    criteria
}
