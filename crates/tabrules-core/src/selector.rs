// tabrules-core/src/selector.rs
// ============================================================================
// Module: Selector
// Description: Applies a compiled predicate plus skip-pinned flag to an
//              enriched tab snapshot.
// Purpose: Produce the matched tab set an action validator/dispatcher run
//          against.
// Dependencies: crate::predicate, crate::model
// ============================================================================

//! ## Overview
//! The selector is a thin filter: resolve `skip_pinned`/`include_pinned`
//! first (cheap), then run the compiled predicate (potentially expensive,
//! especially with regex leaves) only against tabs that survive the flag
//! check.

use tabrules_logic::requirement::Requirement;

use crate::model::EnrichedTab;
use crate::model::Indices;
use crate::model::RuleFlags;
use crate::model::TimestampMs;
use crate::predicate::condition::Condition;
use crate::predicate::EvalContext;
use crate::predicate::TabPredicate;

/// Filters `tabs` to those matching `requirement`, honoring `flags`.
#[must_use]
pub fn select<'a>(
    tabs: &'a [EnrichedTab],
    indices: &Indices,
    now: TimestampMs,
    condition: &Condition,
    requirement: &Requirement<TabPredicate>,
    flags: RuleFlags,
) -> Vec<&'a EnrichedTab> {
    tabs.iter()
        .filter(|tab| passes_pin_flag(tab, flags))
        .filter(|tab| {
            let ctx = EvalContext {
                tab,
                indices,
                now,
            };
            crate::predicate::evaluate(requirement, condition, &ctx)
        })
        .collect()
}

fn passes_pin_flag(tab: &EnrichedTab, flags: RuleFlags) -> bool {
    if flags.include_pinned {
        return true;
    }
    if flags.skip_pinned {
        return !tab.tab.pinned;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::select;
    use crate::index::build_indices;
    use crate::model::GroupId;
    use crate::model::RuleFlags;
    use crate::model::Tab;
    use crate::model::TabId;
    use crate::model::WindowId;
    use crate::predicate::compile;
    use crate::predicate::condition::Condition;

    fn tab(id: i64, pinned: bool) -> Tab {
        Tab {
            id: TabId::new(id),
            window_id: WindowId::new(1),
            url: "https://ex.com/a".to_string(),
            title: String::new(),
            pinned,
            active: false,
            audible: false,
            muted: false,
            discarded: false,
            group_id: GroupId::default(),
            index: 0,
            last_accessed: None,
            created_at: 0,
        }
    }

    #[test]
    fn skip_pinned_default_excludes_pinned_tabs() {
        let tabs = vec![tab(1, true), tab(2, false)];
        let (enriched, indices) = build_indices(&tabs, &[], &Default::default(), 0);
        let condition: Condition =
            serde_json::from_value(serde_json::json!({"eq": ["tab.domain", "ex.com"]})).unwrap();
        let requirement = compile(&condition);
        let matched = select(&enriched, &indices, 0, &condition, &requirement, RuleFlags::default());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].tab.id, TabId::new(2));
    }

    #[test]
    fn include_pinned_overrides_skip_pinned() {
        let tabs = vec![tab(1, true)];
        let (enriched, indices) = build_indices(&tabs, &[], &Default::default(), 0);
        let condition: Condition =
            serde_json::from_value(serde_json::json!({"eq": ["tab.domain", "ex.com"]})).unwrap();
        let requirement = compile(&condition);
        let flags = RuleFlags {
            skip_pinned: true,
            include_pinned: true,
            test: false,
        };
        let matched = select(&enriched, &indices, 0, &condition, &requirement, flags);
        assert_eq!(matched.len(), 1);
    }
}
