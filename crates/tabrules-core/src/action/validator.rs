// tabrules-core/src/action/validator.rs
// ============================================================================
// Module: Action Validator
// Description: Detects conflicting action pairs and sorts a `then` list
//              into execution priority order.
// Purpose: Validation never blocks a run — it reports conflicts as data and
//          still produces a sorted order for the dispatcher.
// Dependencies: crate::model, crate::error
// ============================================================================

//! ## Overview
//! Execution always proceeds in sorted order even when conflicts are
//! detected; a later conflicting action simply no-ops against an
//! already-closed tab. The sort is stable so that same-priority actions
//! keep their rule-document order.

use crate::error::ConflictError;
use crate::model::ActionRecord;

/// Returns the execution priority for an action name; lower sorts earlier.
/// Unknown actions sort last, after `close`, so their (later-reported)
/// "unknown action" failure doesn't preempt real mutations.
#[must_use]
pub fn priority(action: &str) -> u8 {
    match action {
        "pin" | "unpin" | "mute" | "unmute" => 1,
        "group" | "bookmark" | "move" => 2,
        "snooze" => 3,
        "suspend" | "discard" => 4,
        "close-duplicates" => 5,
        "close" => 6,
        _ => 7,
    }
}

const CONTRADICTORY_PAIRS: &[(&str, &str)] = &[
    ("pin", "unpin"),
    ("mute", "unmute"),
    ("close", "snooze"),
];

/// Sorts `actions` into execution order and returns any detected conflicts.
///
/// Sorting always succeeds; conflicts are advisory diagnostics the caller
/// attaches to the run result rather than a reason to block the run.
#[must_use]
pub fn sort_and_validate(actions: &[ActionRecord]) -> (Vec<ActionRecord>, Vec<ConflictError>) {
    let mut conflicts = Vec::new();

    for i in 0..actions.len() {
        for j in (i + 1)..actions.len() {
            let (a, b) = (actions[i].action.as_str(), actions[j].action.as_str());
            if is_contradictory(a, b) {
                conflicts.push(ConflictError::Contradictory {
                    first: a.to_string(),
                    second: b.to_string(),
                });
            }
        }
    }

    if let Some(close_index) = actions.iter().position(|a| a.action == "close") {
        for later in &actions[close_index + 1..] {
            if later.action != "close" {
                conflicts.push(ConflictError::AfterClose {
                    action: later.action.clone(),
                });
            }
        }
    }

    let mut sorted: Vec<ActionRecord> = actions.to_vec();
    sorted.sort_by_key(|a| priority(&a.action));

    (sorted, conflicts)
}

fn is_contradictory(a: &str, b: &str) -> bool {
    CONTRADICTORY_PAIRS
        .iter()
        .any(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
}

#[cfg(test)]
mod tests {
    use super::sort_and_validate;
    use crate::model::ActionRecord;

    fn action(name: &str) -> ActionRecord {
        ActionRecord {
            action: name.to_string(),
            params: serde_json::Map::new(),
        }
    }

    #[test]
    fn detects_pin_unpin_conflict() {
        let actions = vec![action("pin"), action("unpin")];
        let (_, conflicts) = sort_and_validate(&actions);
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn sorts_by_priority() {
        let actions = vec![action("close"), action("pin"), action("snooze")];
        let (sorted, _) = sort_and_validate(&actions);
        let names: Vec<_> = sorted.iter().map(|a| a.action.as_str()).collect();
        assert_eq!(names, vec!["pin", "snooze", "close"]);
    }

    #[test]
    fn flags_action_scheduled_after_close() {
        let actions = vec![action("close"), action("bookmark")];
        let (_, conflicts) = sort_and_validate(&actions);
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn no_conflicts_for_compatible_actions() {
        let actions = vec![action("pin"), action("group")];
        let (_, conflicts) = sort_and_validate(&actions);
        assert!(conflicts.is_empty());
    }
}
