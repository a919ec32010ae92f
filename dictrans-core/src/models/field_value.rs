use serde_json::Value;

/// The lookup key for a raw field value.
///
/// Null, empty strings, arrays and objects have no key and are never
/// translated. Numbers and booleans use their JSON rendering.
pub fn key_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
