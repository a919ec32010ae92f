//! Field classifier.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use dictrans_cache::{ReflectionCache, StructuralCache, TypeDirectives};
use dictrans_core::config::ProcessingConfig;
use dictrans_core::errors::DirectiveError;
use dictrans_core::models::{key_text, FieldWarning, WarningKind};
use dictrans_core::traits::{Nested, Translatable};
use dictrans_core::{ClassificationKind, TranslationDirective, TypeSchema};
use dictrans_observability::events;
use tracing::debug;

use crate::limits::{collection_action, ProcessingAction};

/// One hop from a node to a child: which `nested()` entry, and which
/// element when that entry is a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub child: usize,
    pub element: Option<usize>,
}

/// One annotated field on one reachable object, with its raw key.
#[derive(Debug, Clone)]
pub struct Occurrence {
    /// Index of the owning root in the caller's slice.
    pub root: usize,
    /// Route from the root to the object holding the field.
    pub path: Vec<Step>,
    pub schema: Arc<TypeSchema>,
    pub directive: Arc<TranslationDirective>,
    pub raw: String,
    pub kind: ClassificationKind,
}

/// Result of classifying one batch of roots.
#[derive(Debug, Default)]
pub struct Classification {
    pub occurrences: Vec<Occurrence>,
    pub warnings: Vec<FieldWarning>,
}

pub struct FieldClassifier<'a> {
    structural: &'a StructuralCache,
    reflection: &'a ReflectionCache,
    processing: &'a ProcessingConfig,
}

struct Pending<'n> {
    root: usize,
    path: Vec<Step>,
    node: &'n dyn Translatable,
    depth: usize,
}

impl<'a> FieldClassifier<'a> {
    pub fn new(
        structural: &'a StructuralCache,
        reflection: &'a ReflectionCache,
        processing: &'a ProcessingConfig,
    ) -> Self {
        Self {
            structural,
            reflection,
            processing,
        }
    }

    /// Collect every directive occurrence reachable from `roots`, breadth-first.
    pub fn classify<T: Translatable>(&self, roots: &[T]) -> Classification {
        let mut out = Classification::default();
        let mut reported: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<Pending<'_>> = roots
            .iter()
            .enumerate()
            .map(|(root, node)| Pending {
                root,
                path: Vec::new(),
                node: node as &dyn Translatable,
                depth: 0,
            })
            .collect();

        while let Some(pending) = queue.pop_front() {
            self.visit(&pending, &mut out, &mut reported);
            self.enqueue_children(pending, &mut queue, &mut out);
        }

        debug!(
            roots = roots.len(),
            occurrences = out.occurrences.len(),
            warnings = out.warnings.len(),
            "classification finished"
        );
        out
    }

    fn visit(&self, pending: &Pending<'_>, out: &mut Classification, reported: &mut HashSet<String>) {
        let node = pending.node;
        let type_name = node.type_name();

        let schema = match self.structural.get_or_build(type_name, || node.schema()) {
            Ok(schema) => schema,
            Err(err) => {
                if reported.insert(type_name.to_string()) {
                    events::directive_skipped(type_name, "*", &err.to_string());
                    out.warnings.push(FieldWarning::new(
                        type_name,
                        "*",
                        WarningKind::InvalidDirective,
                        err.to_string(),
                    ));
                }
                return;
            }
        };

        let directives = self.reflection.directives_for(type_name, || {
            extract_directives(&schema, &self.processing.default_delimiter)
        });
        if reported.insert(type_name.to_string()) {
            out.warnings.extend(directives.warnings.iter().cloned());
        }

        for (source_index, directive) in &directives.entries {
            let Some(field) = schema.fields().get(*source_index) else {
                continue;
            };
            let Some(raw) = field.get(node).as_ref().and_then(key_text) else {
                continue;
            };
            out.occurrences.push(Occurrence {
                root: pending.root,
                path: pending.path.clone(),
                schema: Arc::clone(&schema),
                directive: Arc::clone(directive),
                kind: directive.classify(&raw),
                raw,
            });
        }
    }

    fn enqueue_children<'n>(
        &self,
        pending: Pending<'n>,
        queue: &mut VecDeque<Pending<'n>>,
        out: &mut Classification,
    ) {
        let depth = pending.depth + 1;
        let type_name = pending.node.type_name();

        for (child, nested) in pending.node.nested().into_iter().enumerate() {
            if depth > self.processing.max_depth {
                events::processing_limit_hit(type_name, "max_depth", depth, self.processing.max_depth);
                out.warnings.push(FieldWarning::new(
                    type_name,
                    format!("nested[{child}]"),
                    WarningKind::ProcessingLimit,
                    format!("depth {depth} exceeds max_depth {}", self.processing.max_depth),
                ));
                continue;
            }

            match nested {
                Nested::Single(node) => {
                    let mut path = pending.path.clone();
                    path.push(Step {
                        child,
                        element: None,
                    });
                    queue.push_back(Pending {
                        root: pending.root,
                        path,
                        node,
                        depth,
                    });
                }
                Nested::Collection(items) => {
                    let max = self.processing.max_collection_size;
                    let keep = match collection_action(items.len(), max) {
                        ProcessingAction::Continue => items.len(),
                        ProcessingAction::Batch => {
                            events::processing_limit_hit(
                                type_name,
                                "max_collection_size",
                                items.len(),
                                max,
                            );
                            out.warnings.push(FieldWarning::new(
                                type_name,
                                format!("nested[{child}]"),
                                WarningKind::ProcessingLimit,
                                format!("collection of {} truncated to the first {max}", items.len()),
                            ));
                            max
                        }
                        _ => {
                            events::processing_limit_hit(
                                type_name,
                                "max_collection_size",
                                items.len(),
                                max,
                            );
                            out.warnings.push(FieldWarning::new(
                                type_name,
                                format!("nested[{child}]"),
                                WarningKind::ProcessingLimit,
                                format!(
                                    "collection of {} exceeds twice max_collection_size {max}",
                                    items.len()
                                ),
                            ));
                            continue;
                        }
                    };
                    for (element, node) in items.into_iter().take(keep).enumerate() {
                        let mut path = pending.path.clone();
                        path.push(Step {
                            child,
                            element: Some(element),
                        });
                        queue.push_back(Pending {
                            root: pending.root,
                            path,
                            node,
                            depth,
                        });
                    }
                }
            }
        }
    }
}

/// Turn a schema's annotations into validated directives.
///
/// Invalid annotations become warnings and the field is skipped. Only the
/// first annotation on a field is honored.
pub fn extract_directives(schema: &TypeSchema, default_delimiter: &str) -> TypeDirectives {
    let type_name = schema.type_name();
    let mut out = TypeDirectives::default();

    for (index, field) in schema.fields().iter().enumerate() {
        let Some(annotation) = field.annotations().first() else {
            continue;
        };
        if field.annotations().len() > 1 {
            out.warnings.push(FieldWarning::new(
                type_name,
                field.name(),
                WarningKind::InvalidDirective,
                format!(
                    "{} annotations on one field, only the first is used",
                    field.annotations().len()
                ),
            ));
        }

        let directive = annotation
            .extract(type_name, field.name(), default_delimiter)
            .and_then(|d| {
                if schema.has_field(&d.target_field) {
                    Ok(d)
                } else {
                    Err(DirectiveError::UnknownTarget {
                        type_name: type_name.to_string(),
                        field: field.name().to_string(),
                        target: d.target_field,
                    })
                }
            });

        match directive {
            Ok(directive) => out.entries.push((index, Arc::new(directive))),
            Err(err) => {
                events::directive_skipped(type_name, field.name(), &err.to_string());
                out.warnings.push(FieldWarning::new(
                    type_name,
                    field.name(),
                    WarningKind::InvalidDirective,
                    err.to_string(),
                ));
            }
        }
    }
    out
}
