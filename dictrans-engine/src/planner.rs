//! Batch query planner.
//!
//! Groups occurrences by dictionary identity so that every distinct
//! dictionary code or `(table, code column, name column)` triple is queried
//! exactly once per translation call. Single and multi-valued occurrences of
//! the same identity share a group.

use std::collections::{HashMap, HashSet};

use dictrans_core::DirectiveKind;

use crate::classifier::Occurrence;

/// Identity of one batched lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    SystemDict {
        dict_code: String,
    },
    TableDict {
        table: String,
        code_column: String,
        name_column: String,
    },
    Expression {
        expression: String,
    },
}

impl GroupKey {
    pub fn of(kind: &DirectiveKind) -> Self {
        match kind {
            DirectiveKind::SystemDict { dict_code } => Self::SystemDict {
                dict_code: dict_code.clone(),
            },
            DirectiveKind::TableDict {
                table,
                code_column,
                name_column,
                ..
            } => Self::TableDict {
                table: table.clone(),
                code_column: code_column.clone(),
                name_column: name_column.clone(),
            },
            DirectiveKind::Expression { expression } => Self::Expression {
                expression: expression.clone(),
            },
        }
    }
}

/// Occurrences sharing one lookup, plus the distinct keys to query.
#[derive(Debug, Clone)]
pub struct ClassificationGroup {
    pub key: GroupKey,
    /// Distinct raw tokens in first-seen order. Multi values contribute each
    /// token. Empty for expression groups.
    pub keys: Vec<String>,
    /// Indices into the occurrence list.
    pub occurrences: Vec<usize>,
}

/// Build groups in first-seen order.
pub fn plan(occurrences: &[Occurrence]) -> Vec<ClassificationGroup> {
    let mut groups: Vec<ClassificationGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut seen: Vec<HashSet<String>> = Vec::new();

    for (i, occurrence) in occurrences.iter().enumerate() {
        let key = GroupKey::of(&occurrence.directive.kind);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(ClassificationGroup {
                key,
                keys: Vec::new(),
                occurrences: Vec::new(),
            });
            seen.push(HashSet::new());
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.occurrences.push(i);
        if matches!(group.key, GroupKey::Expression { .. }) {
            continue;
        }
        for token in tokens(occurrence) {
            if seen[slot].insert(token.to_string()) {
                group.keys.push(token.to_string());
            }
        }
    }
    groups
}

/// Non-empty tokens of an occurrence's raw value.
pub fn tokens(occurrence: &Occurrence) -> Vec<&str> {
    if occurrence.kind.is_multi() {
        occurrence
            .raw
            .split(occurrence.directive.delimiter.as_str())
            .filter(|t| !t.is_empty())
            .collect()
    } else {
        vec![occurrence.raw.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use dictrans_core::{TranslationDirective, TypeSchema};

    struct Dummy;

    fn occurrence(kind: DirectiveKind, raw: &str) -> Occurrence {
        let directive = TranslationDirective {
            source_field: "f".to_string(),
            target_field: "f".to_string(),
            delimiter: ",".to_string(),
            ignore_original: false,
            kind,
        };
        Occurrence {
            root: 0,
            path: Vec::new(),
            schema: Arc::new(TypeSchema::builder::<Dummy>().build()),
            kind: directive.classify(raw),
            directive: Arc::new(directive),
            raw: raw.to_string(),
        }
    }

    fn dict(code: &str) -> DirectiveKind {
        DirectiveKind::SystemDict {
            dict_code: code.to_string(),
        }
    }

    fn table(condition: Option<&str>) -> DirectiveKind {
        DirectiveKind::TableDict {
            table: "dept".to_string(),
            code_column: "id".to_string(),
            name_column: "name".to_string(),
            condition: condition.map(str::to_string),
        }
    }

    #[test]
    fn groups_by_identity_in_first_seen_order() {
        let occurrences = vec![
            occurrence(dict("b"), "1"),
            occurrence(dict("a"), "1"),
            occurrence(dict("b"), "2"),
            occurrence(dict("b"), "1"),
        ];
        let groups = plan(&occurrences);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, GroupKey::of(&dict("b")));
        assert_eq!(groups[0].keys, vec!["1", "2"]);
        assert_eq!(groups[0].occurrences, vec![0, 2, 3]);
        assert_eq!(groups[1].occurrences, vec![1]);
    }

    #[test]
    fn single_and_multi_share_a_group() {
        let occurrences = vec![occurrence(dict("r"), "A,B"), occurrence(dict("r"), "B")];
        let groups = plan(&occurrences);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keys, vec!["A", "B"]);
    }

    #[test]
    fn table_condition_is_not_part_of_the_key() {
        let occurrences = vec![
            occurrence(table(Some("x = 1")), "1"),
            occurrence(table(None), "2"),
        ];
        assert_eq!(plan(&occurrences).len(), 1);
    }

    #[test]
    fn expression_groups_carry_no_keys() {
        let kind = DirectiveKind::Expression {
            expression: "e".to_string(),
        };
        let groups = plan(&[occurrence(kind.clone(), "x"), occurrence(kind, "y")]);
        assert_eq!(groups.len(), 1);
        assert!(groups[0].keys.is_empty());
        assert_eq!(groups[0].occurrences.len(), 2);
    }

    #[test]
    fn empty_tokens_are_dropped() {
        let groups = plan(&[occurrence(dict("r"), "A,,B,")]);
        assert_eq!(groups[0].keys, vec!["A", "B"]);
    }
}
