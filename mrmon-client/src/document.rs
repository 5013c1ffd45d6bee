//! JSON normalization
//!
//! Turns a raw response body into a status document. Only a JSON object
//! counts as a document; everything else is reported as unparseable.

use serde_json::Value;

/// Parses `body` into a JSON object, or `None` if it is not one
///
/// `serde_json` keeps object keys sorted, so two documents compare equal
/// exactly when their serialized forms are equal.
pub fn normalize(body: &str) -> Option<Value> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_object() {
        assert_eq!(
            normalize(r#" {"job": {"state": "RUNNING"}} "#),
            Some(json!({"job": {"state": "RUNNING"}}))
        );
    }

    #[test]
    fn test_normalize_rejects_non_objects() {
        assert_eq!(normalize(""), None);
        assert_eq!(normalize("   "), None);
        assert_eq!(normalize("[1, 2]"), None);
        assert_eq!(normalize("\"text\""), None);
        assert_eq!(normalize("<html>proxy error</html>"), None);
        assert_eq!(normalize(r#"{"truncated": "#), None);
    }

    #[test]
    fn test_key_order_does_not_matter() {
        assert_eq!(normalize(r#"{"a":1,"b":2}"#), normalize(r#"{"b":2,"a":1}"#));
        assert_eq!(
            normalize(r#"{"a":1,"b":2}"#).unwrap().to_string(),
            normalize(r#"{"b":2,"a":1}"#).unwrap().to_string()
        );
    }
}
