// tabrules-core/src/action/close_duplicates.rs
// ============================================================================
// Module: Close-Duplicates Keeper Selection
// Description: Groups matched tabs by dupe key and selects which tab(s)
//              survive per group under a keep strategy.
// Purpose: Isolate the keeper-selection policy from the dispatcher's driver
//          plumbing.
// Dependencies: crate::model
// ============================================================================

//! ## Overview
//! Grouping happens over the *matched* tab set, not the whole snapshot —
//! a rule's condition already scoped which tabs are eligible.

use std::collections::HashMap;

use crate::model::EnrichedTab;
use crate::model::TabId;

/// The keeper-selection strategy for `close-duplicates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepStrategy {
    /// Retain the tab with the earliest `created_at` (ties broken by id).
    Oldest,
    /// Retain the tab with the latest `created_at` (ties broken by id).
    Newest,
    /// Retain the most recently accessed tab.
    Mru,
    /// Retain the least recently accessed tab.
    Lru,
    /// No-op: every tab in every group is kept.
    All,
    /// Close every duplicate, including what would otherwise be the
    /// keeper.
    None,
}

impl KeepStrategy {
    /// Parses the `keep` parameter string, defaulting to `Oldest` for an
    /// absent or unrecognized value.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("newest") => Self::Newest,
            Some("mru") => Self::Mru,
            Some("lru") => Self::Lru,
            Some("all") => Self::All,
            Some("none") => Self::None,
            _ => Self::Oldest,
        }
    }
}

/// Returns the ids of tabs to close, grouping `tabs` by `dupe_key` and
/// applying `strategy` within each group of size ≥ 2.
#[must_use]
pub fn select_keepers<'a>(tabs: &[&'a EnrichedTab], strategy: KeepStrategy) -> Vec<TabId> {
    if strategy == KeepStrategy::All {
        return Vec::new();
    }

    let mut groups: HashMap<&str, Vec<&&'a EnrichedTab>> = HashMap::new();
    for tab in tabs {
        groups.entry(tab.dupe_key.as_str()).or_default().push(tab);
    }

    let mut to_close = Vec::new();
    for group in groups.values() {
        if group.len() < 2 {
            continue;
        }
        if strategy == KeepStrategy::None {
            to_close.extend(group.iter().map(|t| t.tab.id));
            continue;
        }
        let Some(keeper) = pick_keeper(group, strategy) else {
            continue;
        };
        to_close.extend(group.iter().filter(|t| t.tab.id != keeper).map(|t| t.tab.id));
    }
    to_close
}

fn pick_keeper(group: &[&&EnrichedTab], strategy: KeepStrategy) -> Option<TabId> {
    let recency_key = |t: &&EnrichedTab| (t.tab.last_accessed.unwrap_or(t.tab.created_at), t.tab.id.raw());
    let created_key = |t: &&EnrichedTab| (t.tab.created_at, t.tab.id.raw());

    let keeper = match strategy {
        KeepStrategy::Oldest => group.iter().min_by_key(|t| created_key(t)),
        KeepStrategy::Newest => group.iter().max_by_key(|t| created_key(t)),
        KeepStrategy::Mru => group.iter().max_by_key(|t| recency_key(t)),
        KeepStrategy::Lru => group.iter().min_by_key(|t| recency_key(t)),
        KeepStrategy::All | KeepStrategy::None => None,
    };
    keeper.map(|t| t.tab.id)
}
