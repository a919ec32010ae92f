//! Property tests for the batch planner.

use std::collections::HashSet;
use std::sync::Arc;

use dictrans_core::{DirectiveKind, TranslationDirective, TypeSchema};
use dictrans_engine::classifier::Occurrence;
use dictrans_engine::planner::{self, GroupKey};
use proptest::prelude::*;

struct Node;

fn occurrence(dict_code: &str, raw: &str) -> Occurrence {
    let directive = TranslationDirective {
        source_field: "f".to_string(),
        target_field: "f".to_string(),
        delimiter: ",".to_string(),
        ignore_original: false,
        kind: DirectiveKind::SystemDict {
            dict_code: dict_code.to_string(),
        },
    };
    Occurrence {
        root: 0,
        path: Vec::new(),
        schema: Arc::new(TypeSchema::builder::<Node>().build()),
        kind: directive.classify(raw),
        directive: Arc::new(directive),
        raw: raw.to_string(),
    }
}

fn occurrences() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-d]", "[A-F](,[A-F]){0,2}"), 0..300)
}

proptest! {
    #[test]
    fn one_group_per_dictionary(input in occurrences()) {
        let occs: Vec<_> = input.iter().map(|(d, r)| occurrence(d, r)).collect();
        let groups = planner::plan(&occs);

        let distinct: HashSet<&str> = input.iter().map(|(d, _)| d.as_str()).collect();
        prop_assert_eq!(groups.len(), distinct.len());

        let total: usize = groups.iter().map(|g| g.occurrences.len()).sum();
        prop_assert_eq!(total, occs.len());
    }

    #[test]
    fn group_keys_are_distinct_and_complete(input in occurrences()) {
        let occs: Vec<_> = input.iter().map(|(d, r)| occurrence(d, r)).collect();
        for group in planner::plan(&occs) {
            let unique: HashSet<&str> = group.keys.iter().map(String::as_str).collect();
            prop_assert_eq!(unique.len(), group.keys.len());

            let GroupKey::SystemDict { dict_code } = &group.key else {
                return Err(TestCaseError::fail("unexpected group kind"));
            };
            for &i in &group.occurrences {
                prop_assert_eq!(&occs[i].directive.kind, &DirectiveKind::SystemDict {
                    dict_code: dict_code.clone(),
                });
                for token in planner::tokens(&occs[i]) {
                    prop_assert!(unique.contains(&token));
                }
            }
        }
    }
}
