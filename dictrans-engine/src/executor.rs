//! Translation executor: one backing-store call per group, then write-back.

use std::collections::HashMap;
use std::time::Instant;

use dictrans_cache::ReflectionCache;
use dictrans_core::constants::BATCH_KEY_JOINER;
use dictrans_core::models::{row_text, Direction, FieldWarning, TranslationReport, WarningKind};
use dictrans_core::traits::{IExpressionEvaluator, ITransApi, Nested, NestedMut, Translatable};
use dictrans_core::{DictTransError, DictTransResult};
use dictrans_observability::events;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classifier::{Occurrence, Step};
use crate::planner::{ClassificationGroup, GroupKey};

pub struct TranslationExecutor<'a> {
    api: &'a dyn ITransApi,
    evaluator: Option<&'a dyn IExpressionEvaluator>,
    reflection: &'a ReflectionCache,
    deadline: Option<Instant>,
}

impl<'a> TranslationExecutor<'a> {
    pub fn new(
        api: &'a dyn ITransApi,
        evaluator: Option<&'a dyn IExpressionEvaluator>,
        reflection: &'a ReflectionCache,
    ) -> Self {
        Self {
            api,
            evaluator,
            reflection,
            deadline: None,
        }
    }

    /// Abort before any group that would start after `deadline`.
    pub fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Run every group in order.
    ///
    /// A backing-store failure or a passed deadline aborts the remaining
    /// groups and is returned; write-backs from groups already processed are
    /// kept.
    pub fn execute<T: Translatable>(
        &self,
        roots: &mut [T],
        occurrences: &[Occurrence],
        groups: &[ClassificationGroup],
        report: &mut TranslationReport,
    ) -> DictTransResult<()> {
        for group in groups {
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    warn!(group = ?group.key, "deadline passed, remaining groups abandoned");
                    return Err(DictTransError::ProcessingAborted(
                        "translation exceeded its timeout".to_string(),
                    ));
                }
            }
            match &group.key {
                GroupKey::Expression { expression } => {
                    self.apply_expression(roots, occurrences, group, expression, report);
                }
                key => {
                    if group.keys.is_empty() {
                        continue;
                    }
                    let map = match self.lookup(key, &group.keys, report.direction) {
                        Ok(map) => map,
                        Err(err) => {
                            warn!(group = ?key, error = %err, "backing store call failed");
                            return Err(err);
                        }
                    };
                    report.backing_store_calls += 1;
                    debug!(group = ?key, keys = group.keys.len(), matched = map.len(), "group resolved");
                    self.apply_map(roots, occurrences, group, &map, report);
                }
            }
        }
        Ok(())
    }

    /// Build the `from -> to` map for one group in the requested direction.
    fn lookup(
        &self,
        key: &GroupKey,
        keys: &[String],
        direction: Direction,
    ) -> DictTransResult<HashMap<String, String>> {
        let joined = keys.join(BATCH_KEY_JOINER);
        let mut map = HashMap::new();

        match (key, direction) {
            (GroupKey::SystemDict { dict_code }, Direction::Code2Name) => {
                for entry in self.api.translate_dict_batch_code2name(dict_code, Some(&joined))? {
                    if entry.dict_code.is_empty() || entry.dict_code == *dict_code {
                        map.insert(entry.code, entry.label);
                    }
                }
            }
            (GroupKey::SystemDict { dict_code }, Direction::Name2Code) => {
                // Labels are not keys of the store, so fetch the whole dictionary.
                for entry in self.api.translate_dict_batch_code2name(dict_code, None)? {
                    if entry.dict_code.is_empty() || entry.dict_code == *dict_code {
                        map.insert(entry.label, entry.code);
                    }
                }
            }
            (
                GroupKey::TableDict {
                    table,
                    code_column,
                    name_column,
                },
                direction,
            ) => {
                let (from, to) = match direction {
                    Direction::Code2Name => (code_column, name_column),
                    Direction::Name2Code => (name_column, code_column),
                };
                for row in self.api.translate_table_batch_code2name(table, to, from, &joined)? {
                    if let (Some(k), Some(v)) = (row_text(&row, from), row_text(&row, to)) {
                        map.insert(k, v);
                    }
                }
            }
            (GroupKey::Expression { .. }, _) => {}
        }
        Ok(map)
    }

    fn apply_map<T: Translatable>(
        &self,
        roots: &mut [T],
        occurrences: &[Occurrence],
        group: &ClassificationGroup,
        map: &HashMap<String, String>,
        report: &mut TranslationReport,
    ) {
        for &i in &group.occurrences {
            let occurrence = &occurrences[i];
            let Some(translated) = translate_value(occurrence, map) else {
                continue;
            };
            self.write(roots, occurrence, Value::String(translated), report);
        }
    }

    fn apply_expression<T: Translatable>(
        &self,
        roots: &mut [T],
        occurrences: &[Occurrence],
        group: &ClassificationGroup,
        expression: &str,
        report: &mut TranslationReport,
    ) {
        if report.direction == Direction::Name2Code {
            return;
        }
        for &i in &group.occurrences {
            let occurrence = &occurrences[i];
            let Some(evaluator) = self.evaluator else {
                report.warnings.push(expression_warning(
                    occurrence,
                    "no expression evaluator configured".to_string(),
                ));
                continue;
            };
            let Some(owner) = roots
                .get(occurrence.root)
                .and_then(|root| resolve(root, &occurrence.path))
            else {
                continue;
            };
            match evaluator.evaluate(expression, owner) {
                Ok(Some(value)) => self.write(roots, occurrence, value, report),
                Ok(None) => {}
                Err(err) => report
                    .warnings
                    .push(expression_warning(occurrence, err.to_string())),
            }
        }
    }

    fn write<T: Translatable>(
        &self,
        roots: &mut [T],
        occurrence: &Occurrence,
        value: Value,
        report: &mut TranslationReport,
    ) {
        let schema = &occurrence.schema;
        let type_name = schema.type_name();
        // name2code restores the code in place; the label field is left alone.
        let target = match report.direction {
            Direction::Code2Name => &occurrence.directive.target_field,
            Direction::Name2Code => &occurrence.directive.source_field,
        };

        let result = self
            .reflection
            .field_index(type_name, target, || {
                schema.fields().iter().position(|f| f.name() == target.as_str())
            })
            .and_then(|index| schema.fields().get(index))
            .ok_or_else(|| format!("target field `{target}` not found"))
            .and_then(|field| {
                let root = roots
                    .get_mut(occurrence.root)
                    .ok_or_else(|| "root index out of range".to_string())?;
                let node = resolve_mut(root, &occurrence.path)
                    .ok_or_else(|| "object graph changed during translation".to_string())?;
                field.set(node, value)
            });

        match result {
            Ok(()) => report.fields_written += 1,
            Err(reason) => {
                events::write_back_failed(type_name, target, &reason);
                report.warnings.push(FieldWarning::new(
                    type_name,
                    target.as_str(),
                    WarningKind::WriteFailed,
                    reason,
                ));
            }
        }
    }
}

/// Translated text for one occurrence, or `None` when nothing matched.
///
/// Multi values are split on the directive's delimiter, each token mapped
/// independently, and rejoined; unmatched tokens pass through unchanged.
pub fn translate_value(occurrence: &Occurrence, map: &HashMap<String, String>) -> Option<String> {
    if !occurrence.kind.is_multi() {
        return map.get(&occurrence.raw).cloned();
    }
    let delimiter = occurrence.directive.delimiter.as_str();
    let mut matched = false;
    let parts: Vec<&str> = occurrence
        .raw
        .split(delimiter)
        .map(|token| match map.get(token) {
            Some(label) => {
                matched = true;
                label.as_str()
            }
            None => token,
        })
        .collect();
    matched.then(|| parts.join(delimiter))
}

/// Follow `path` from `root` through `nested`.
fn resolve<'n>(root: &'n dyn Translatable, path: &[Step]) -> Option<&'n dyn Translatable> {
    let mut node = root;
    for step in path {
        let mut children = node.nested();
        if step.child >= children.len() {
            return None;
        }
        node = match (children.swap_remove(step.child), step.element) {
            (Nested::Single(child), None) => child,
            (Nested::Collection(mut items), Some(i)) if i < items.len() => items.swap_remove(i),
            _ => return None,
        };
    }
    Some(node)
}

/// Follow `path` from `root` through `nested_mut`.
fn resolve_mut<'n>(root: &'n mut dyn Translatable, path: &[Step]) -> Option<&'n mut dyn Translatable> {
    let mut node = root;
    for step in path {
        let current = node;
        let mut children = current.nested_mut();
        if step.child >= children.len() {
            return None;
        }
        node = match (children.swap_remove(step.child), step.element) {
            (NestedMut::Single(child), None) => child,
            (NestedMut::Collection(mut items), Some(i)) if i < items.len() => items.swap_remove(i),
            _ => return None,
        };
    }
    Some(node)
}

fn expression_warning(occurrence: &Occurrence, message: String) -> FieldWarning {
    FieldWarning::new(
        occurrence.schema.type_name(),
        occurrence.directive.source_field.as_str(),
        WarningKind::ExpressionUnavailable,
        message,
    )
}
