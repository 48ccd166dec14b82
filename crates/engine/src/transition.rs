// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status-transition matching.
//!
//! Remote workflows rarely allow writing a status directly; the engine
//! has to pick a transition whose destination matches one of the
//! acceptable remote statuses for the target local status.

use regex::Regex;
use std::sync::OnceLock;

use tether_core::Transition;

/// Verb patterns for the name-based fallback pass, keyed by the status
/// family the verb implies.
struct VerbFamily {
    /// Matches destination-status names that belong to the family.
    statuses: &'static [&'static str],
    /// Matches transition names that imply the family.
    verbs: fn() -> &'static Regex,
}

fn done_verbs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern
        Regex::new(r"(?i)\b(resolve|close|complete|done|finish)\b").unwrap()
    })
}

fn progress_verbs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern
        Regex::new(r"(?i)\b(start|begin|progress)\b").unwrap()
    })
}

fn open_verbs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        #[allow(clippy::unwrap_used)] // literal pattern
        Regex::new(r"(?i)\b(reopen|open|backlog|stop)\b").unwrap()
    })
}

const VERB_FAMILIES: [VerbFamily; 3] = [
    VerbFamily {
        statuses: &["done", "closed", "resolved", "complete", "completed"],
        verbs: done_verbs,
    },
    VerbFamily {
        statuses: &["in progress", "in review"],
        verbs: progress_verbs,
    },
    VerbFamily {
        statuses: &["to do", "open", "backlog", "todo"],
        verbs: open_verbs,
    },
];

/// Find the transition to invoke for a target status, given the
/// acceptable remote status names for it (first entry preferred).
///
/// Three passes, deterministic for a fixed input:
/// (a) exact match on the transition's destination status;
/// (b) case-insensitive match on the destination status;
/// (c) fallback on the transition's own *name*: configured verb
///     patterns for the target's status family, then a case-insensitive
///     substring match against the target names.
pub fn find_transition<'a>(
    transitions: &'a [Transition],
    acceptable: &[String],
) -> Option<&'a Transition> {
    // (a) exact destination match, in acceptable-status preference order
    for target in acceptable {
        if let Some(t) = transitions
            .iter()
            .find(|t| t.to_status.as_deref() == Some(target.as_str()))
        {
            return Some(t);
        }
    }

    // (b) case-insensitive destination match
    for target in acceptable {
        let lower = target.to_lowercase();
        if let Some(t) = transitions
            .iter()
            .find(|t| t.to_status.as_deref().map(str::to_lowercase) == Some(lower.clone()))
        {
            return Some(t);
        }
    }

    // (c) name-based fallback: verb families first
    for family in &VERB_FAMILIES {
        let family_applies = acceptable
            .iter()
            .any(|s| family.statuses.contains(&s.to_lowercase().as_str()));
        if !family_applies {
            continue;
        }
        if let Some(t) = transitions.iter().find(|t| (family.verbs)().is_match(&t.name)) {
            return Some(t);
        }
    }

    // (c, continued) substring of the target name
    for target in acceptable {
        let target_lower = target.to_lowercase();
        if let Some(t) = transitions.iter().find(|t| {
            let name_lower = t.name.to_lowercase();
            target_lower.contains(&name_lower) || name_lower.contains(&target_lower)
        }) {
            return Some(t);
        }
    }

    None
}

/// Render the list of available transitions for a warning message.
pub fn describe_transitions(transitions: &[Transition]) -> String {
    transitions
        .iter()
        .map(|t| match &t.to_status {
            Some(to) => format!("{} ({} -> {})", t.id, t.name, to),
            None => format!("{} ({})", t.id, t.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
