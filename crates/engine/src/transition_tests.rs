// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn t(id: &str, name: &str, to: Option<&str>) -> Transition {
    Transition {
        id: id.to_string(),
        name: name.to_string(),
        to_status: to.map(str::to_string),
    }
}

fn acceptable(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn exact_destination_match_wins() {
    let transitions = vec![
        t("1", "Start Progress", Some("In Progress")),
        t("2", "Close Issue", Some("Done")),
    ];
    let found = find_transition(&transitions, &acceptable(&["Done", "Closed"])).unwrap();
    assert_eq!(found.id, "2");
}

#[test]
fn acceptable_order_is_a_preference_order() {
    let transitions = vec![
        t("1", "Ship It", Some("Closed")),
        t("2", "Close Issue", Some("Done")),
    ];
    // "Done" is listed first, so its transition wins even though the
    // "Closed" transition appears earlier.
    let found = find_transition(&transitions, &acceptable(&["Done", "Closed"])).unwrap();
    assert_eq!(found.id, "2");
}

#[test]
fn case_insensitive_destination_is_second_pass() {
    let transitions = vec![t("1", "Finish", Some("DONE"))];
    let found = find_transition(&transitions, &acceptable(&["Done"])).unwrap();
    assert_eq!(found.id, "1");
}

#[yare::parameterized(
    resolve_verb = { "Resolve Issue", &["Done"] },
    close_verb = { "Close Issue", &["Closed"] },
    complete_verb = { "Complete Work", &["Resolved"] },
)]
fn done_family_verbs_match_without_destination(name: &str, targets: &[&str]) {
    let transitions = vec![t("9", name, None)];
    let found = find_transition(&transitions, &acceptable(targets)).unwrap();
    assert_eq!(found.id, "9");
}

#[test]
fn progress_family_verbs_match() {
    let transitions = vec![t("1", "Stop Work", None), t("2", "Start Progress", None)];
    let found = find_transition(&transitions, &acceptable(&["In Progress"])).unwrap();
    assert_eq!(found.id, "2");
}

#[test]
fn substring_fallback_matches_transition_name() {
    // "Review" is no known verb family; the name matches the target by
    // substring.
    let transitions = vec![t("7", "Review", None)];
    let found = find_transition(&transitions, &acceptable(&["In Review"])).unwrap();
    assert_eq!(found.id, "7");
}

#[test]
fn no_match_returns_none() {
    let transitions = vec![t("1", "Escalate", Some("Escalated"))];
    assert!(find_transition(&transitions, &acceptable(&["Done"])).is_none());
}

#[test]
fn empty_transitions_return_none() {
    assert!(find_transition(&[], &acceptable(&["Done"])).is_none());
}

#[test]
fn match_is_deterministic() {
    let transitions = vec![
        t("1", "Resolve Issue", None),
        t("2", "Close Issue", None),
        t("3", "Done Deal", Some("Done")),
    ];
    let first = find_transition(&transitions, &acceptable(&["Done"])).unwrap();
    for _ in 0..5 {
        let again = find_transition(&transitions, &acceptable(&["Done"])).unwrap();
        assert_eq!(again.id, first.id);
    }
    // The exact-destination pass beats the verb passes
    assert_eq!(first.id, "3");
}

#[test]
fn describe_lists_all_transitions() {
    let transitions = vec![
        t("1", "Start Progress", Some("In Progress")),
        t("2", "Escalate", None),
    ];
    let described = describe_transitions(&transitions);
    assert_eq!(described, "1 (Start Progress -> In Progress), 2 (Escalate)");
}
