use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of a system-dictionary batch lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictModel {
    pub dict_code: String,
    pub code: String,
    pub label: String,
}

impl DictModel {
    pub fn new(dict_code: impl Into<String>, code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            dict_code: dict_code.into(),
            code: code.into(),
            label: label.into(),
        }
    }
}

/// One row of a table-dictionary batch lookup: column name to value.
pub type TableRow = serde_json::Map<String, Value>;

/// Text of `column` in `row`, or `None` when the column is absent or null.
pub fn row_text(row: &TableRow, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_text_unquotes_strings_and_renders_numbers() {
        let row: TableRow = json!({"id": 7, "name": "Ops", "gone": null})
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(row_text(&row, "id").as_deref(), Some("7"));
        assert_eq!(row_text(&row, "name").as_deref(), Some("Ops"));
        assert_eq!(row_text(&row, "gone"), None);
        assert_eq!(row_text(&row, "missing"), None);
    }
}
