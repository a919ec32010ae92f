use serde::{Deserialize, Serialize};

use super::{DirectiveKind, TranslationDirective};
use crate::constants::DICT_TEXT_SUFFIX;
use crate::errors::DirectiveError;

/// Raw translation attributes attached to a field.
///
/// Blank strings mean "not set", matching what the code generator emits for
/// absent annotation attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictAnnotation {
    pub dict_code: String,
    pub table: String,
    pub code_column: String,
    pub name_column: String,
    pub condition: String,
    pub expression: String,
    pub serialization_alias: String,
    pub ignore_original: bool,
    pub delimiter: Option<String>,
}

impl DictAnnotation {
    /// System-dictionary annotation.
    pub fn dict(dict_code: impl Into<String>) -> Self {
        Self {
            dict_code: dict_code.into(),
            ..Default::default()
        }
    }

    /// Table-dictionary annotation.
    pub fn table(
        table: impl Into<String>,
        code_column: impl Into<String>,
        name_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            code_column: code_column.into(),
            name_column: name_column.into(),
            ..Default::default()
        }
    }

    /// Expression annotation.
    pub fn expression(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Default::default()
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.serialization_alias = alias.into();
        self
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Write the label to a separate field instead of overwriting the source.
    pub fn ignore_original(mut self) -> Self {
        self.ignore_original = true;
        self
    }

    /// Validate the attributes and build the directive for `field`.
    ///
    /// Priority, first match wins: a dictionary code with no table is a
    /// system dictionary; a table (with a name column) is a table dictionary;
    /// an expression is expression-based.
    pub fn extract(
        &self,
        type_name: &str,
        field: &str,
        default_delimiter: &str,
    ) -> Result<TranslationDirective, DirectiveError> {
        let delimiter = self
            .delimiter
            .clone()
            .unwrap_or_else(|| default_delimiter.to_string());
        if delimiter.is_empty() {
            return Err(DirectiveError::EmptyDelimiter {
                type_name: type_name.to_string(),
                field: field.to_string(),
            });
        }

        let kind = self.kind(type_name, field)?;

        // Alias, then the name column in camel case, then `<field>Text`.
        let target_field = if self.ignore_original {
            non_blank(&self.serialization_alias)
                .map(str::to_string)
                .or_else(|| non_blank(&self.name_column).map(camel_case))
                .unwrap_or_else(|| format!("{field}{DICT_TEXT_SUFFIX}"))
        } else {
            field.to_string()
        };

        Ok(TranslationDirective {
            source_field: field.to_string(),
            target_field,
            delimiter,
            ignore_original: self.ignore_original,
            kind,
        })
    }

    fn kind(&self, type_name: &str, field: &str) -> Result<DirectiveKind, DirectiveError> {
        let missing = |attribute: &'static str| DirectiveError::MissingAttribute {
            type_name: type_name.to_string(),
            field: field.to_string(),
            attribute,
        };

        if let (Some(dict_code), None) = (non_blank(&self.dict_code), non_blank(&self.table)) {
            return Ok(DirectiveKind::SystemDict {
                dict_code: dict_code.to_string(),
            });
        }

        if let Some(table) = non_blank(&self.table) {
            let name_column = non_blank(&self.name_column).ok_or_else(|| missing("name_column"))?;
            // A blank code column means the table is keyed by the field's own name.
            let code_column = non_blank(&self.code_column).unwrap_or(field);
            return Ok(DirectiveKind::TableDict {
                table: table.to_string(),
                code_column: code_column.to_string(),
                name_column: name_column.to_string(),
                condition: non_blank(&self.condition).map(str::to_string),
            });
        }

        if let Some(expression) = non_blank(&self.expression) {
            return Ok(DirectiveKind::Expression {
                expression: expression.to_string(),
            });
        }

        if non_blank(&self.code_column).is_some() || non_blank(&self.name_column).is_some() {
            return Err(missing("table"));
        }

        Err(DirectiveError::Unclassifiable {
            type_name: type_name.to_string(),
            field: field.to_string(),
        })
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// `dept_name` -> `deptName`. Names without underscores are kept as given.
fn camel_case(column: &str) -> String {
    if !column.contains('_') {
        return column.to_string();
    }
    let mut out = String::with_capacity(column.len());
    let mut upper_next = false;
    for c in column.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_joins_snake_segments() {
        assert_eq!(camel_case("dept_name"), "deptName");
        assert_eq!(camel_case("DEPT_NAME"), "deptName");
        assert_eq!(camel_case("_dept__name_"), "deptName");
        assert_eq!(camel_case("deptName"), "deptName");
        assert_eq!(camel_case("name"), "name");
    }
}
