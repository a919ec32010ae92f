//! Property tests for batched translation.

use std::sync::Arc;

use dictrans_core::DictTransConfig;
use dictrans_engine::TransEngine;
use proptest::prelude::*;
use test_fixtures::{RecordingTransApi, Ticket, User};

fn role_label(token: &str) -> &str {
    match token {
        "A" => "Alpha",
        "B" => "Beta",
        "C" => "Gamma",
        other => other,
    }
}

fn user_strategy() -> impl Strategy<Value = User> {
    (
        prop::sample::select(vec!["1", "0"]),
        prop::sample::select(vec!["M", "F"]),
        prop::collection::vec(prop::sample::select(vec!["A", "B", "C"]), 1..4),
        prop::sample::select(vec!["10", "20", "30"]),
        prop::option::of(prop::sample::select(vec!["G", "S"])),
        prop::collection::vec(prop::sample::select(vec!["E", "P"]), 0..3),
    )
        .prop_map(|(status, sex, roles, dept, level, kinds)| {
            let mut user = User::new(1, status, sex, &roles.join(","), dept);
            if let Some(level) = level {
                user = user.with_profile(level);
            }
            for kind in kinds {
                user = user.with_contact(kind, "x");
            }
            user
        })
}

fn ticket_strategy() -> impl Strategy<Value = Ticket> {
    (
        prop::sample::select(vec!["P1", "P2", "P3", "P9"]),
        prop::sample::select(vec!["BUG", "REQ"]),
        prop::sample::select(vec!["OPEN", "DONE"]),
    )
        .prop_map(|(p, c, s)| Ticket::new(p, c, s))
}

proptest! {
    #[test]
    fn calls_never_exceed_distinct_dictionaries(tickets in prop::collection::vec(ticket_strategy(), 1..200)) {
        let api = Arc::new(RecordingTransApi::from_fixtures());
        let engine = TransEngine::new(api.clone(), &DictTransConfig::default());
        let mut tickets = tickets;

        let report = engine.code2name(&mut tickets).unwrap();

        prop_assert_eq!(api.call_count(), 3);
        prop_assert_eq!(report.backing_store_calls, 3);
        for call in api.calls() {
            prop_assert!(call.key_count() <= 4);
        }
    }

    #[test]
    fn multi_value_tokens_map_independently(
        tokens in prop::collection::vec(prop::sample::select(vec!["A", "B", "C", "Z"]), 1..6)
    ) {
        let api = Arc::new(RecordingTransApi::from_fixtures());
        let engine = TransEngine::new(api, &DictTransConfig::default());
        let raw = tokens.join(",");
        let mut user = User::new(1, "1", "M", &raw, "10");

        engine.code2name_one(&mut user).unwrap();

        let expected: Vec<&str> = tokens.iter().map(|t| role_label(t)).collect();
        if tokens.iter().all(|t| *t == "Z") {
            prop_assert_eq!(user.roles, raw);
        } else {
            prop_assert_eq!(user.roles, expected.join(","));
        }
    }

    #[test]
    fn name2code_then_code2name_equals_code2name(users in prop::collection::vec(user_strategy(), 1..20)) {
        let api = Arc::new(RecordingTransApi::from_fixtures());
        let engine = TransEngine::new(api, &DictTransConfig::default());

        let mut direct = users.clone();
        engine.code2name(&mut direct).unwrap();

        let mut round = users.clone();
        engine.name2code(&mut round).unwrap();
        prop_assert_eq!(&round, &users);
        engine.code2name(&mut round).unwrap();

        prop_assert_eq!(round, direct);
    }

    #[test]
    fn translated_users_are_stable_under_a_round_trip(users in prop::collection::vec(user_strategy(), 1..20)) {
        let api = Arc::new(RecordingTransApi::from_fixtures());
        let engine = TransEngine::new(api, &DictTransConfig::default());
        let mut translated = users;
        engine.code2name(&mut translated).unwrap();

        let mut round = translated.clone();
        engine.name2code(&mut round).unwrap();
        engine.code2name(&mut round).unwrap();

        prop_assert_eq!(round, translated);
    }
}
