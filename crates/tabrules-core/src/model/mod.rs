// tabrules-core/src/model/mod.rs
// ============================================================================
// Module: Data Model
// Description: Tab, window, rule, and execution-context types shared across
//              every subsystem.
// Purpose: Define the plain-data shapes the engine reads and produces.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! All types here are plain, cheaply cloned data. Rules are owned by the
//! collaborator; the engine never mutates a [`Rule`] in place.

mod ids;

pub use ids::GroupId;
pub use ids::RuleId;
pub use ids::TabId;
pub use ids::WindowId;
pub use ids::UNGROUPED;

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::predicate::Condition;

/// Milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// A tab as read from the browser driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    /// Stable-within-session tab id.
    pub id: TabId,
    /// Owning window id.
    pub window_id: WindowId,
    /// Current URL.
    pub url: String,
    /// Current title.
    pub title: String,
    /// Whether the tab is pinned.
    pub pinned: bool,
    /// Whether the tab is the active tab in its window.
    pub active: bool,
    /// Whether the tab is currently producing audio.
    pub audible: bool,
    /// Whether the tab's audio is muted.
    pub muted: bool,
    /// Whether the tab has been discarded (suspended) by the browser.
    pub discarded: bool,
    /// Group id, or [`UNGROUPED`] if the tab belongs to no group.
    pub group_id: GroupId,
    /// Position within the window's tab strip.
    pub index: u32,
    /// Last time this tab was focused, if known to the driver.
    pub last_accessed: Option<TimestampMs>,
    /// When the engine first observed this tab.
    pub created_at: TimestampMs,
}

/// The engine-owned enrichment of a [`Tab`], computed fresh per rule run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTab {
    /// The underlying tab.
    pub tab: Tab,
    /// Lowercase hostname with a leading `www.` stripped.
    pub domain: String,
    /// Domain of the referring page, or empty if unknown.
    pub origin: String,
    /// Canonical dedup key, see [`crate::normalize::normalize`].
    pub dupe_key: String,
    /// Category tag from the domain-to-category map; `"unknown"` if absent.
    pub category: String,
    /// `now - created_at` (or `last_accessed` when more recent), in ms.
    pub age_ms: i64,
    /// Whether another tab in the snapshot shares this tab's `dupe_key`.
    pub is_dupe: bool,
}

/// A browser window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Window id.
    pub id: WindowId,
    /// Whether this window currently has OS focus.
    pub focused: bool,
    /// Whether this window is an incognito/private window.
    pub incognito: bool,
    /// Tab ids belonging to this window.
    pub tab_ids: Vec<TabId>,
}

/// One action record inside a rule's `then` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The action name (`close`, `pin`, `group`, …).
    pub action: String,
    /// Free-form parameters for the action, keyed the way the rule document
    /// expresses them (e.g. `keep`, `by`, `for`, `windowId`).
    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// A rule's trigger descriptor; exactly one kind per rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Trigger {
    /// Reacts to external events, coalesced within a debounce window.
    Immediate {
        /// Debounce override in milliseconds; falls back to engine default.
        #[serde(skip_serializing_if = "Option::is_none")]
        debounce_ms: Option<u64>,
    },
    /// Fires immediately on install and every `interval_ms` thereafter.
    Repeat {
        /// Interval between firings, in milliseconds.
        interval_ms: u64,
    },
    /// Fires once at an absolute timestamp; persisted across restarts.
    Once {
        /// Absolute fire time, ms since epoch.
        at_ms: TimestampMs,
    },
    /// Manual only; no timers are installed.
    OnAction,
}

/// Per-rule behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleFlags {
    /// Exclude pinned tabs from selection (default true).
    pub skip_pinned: bool,
    /// Explicitly include pinned tabs, overriding `skip_pinned`.
    pub include_pinned: bool,
    /// Marks this rule as a test rule (no behavioral effect on the engine;
    /// surfaced for collaborator tooling).
    pub test: bool,
}

impl Default for RuleFlags {
    fn default() -> Self {
        Self {
            skip_pinned: true,
            include_pinned: false,
            test: false,
        }
    }
}

/// A declarative tab-management rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable rule id.
    pub id: RuleId,
    /// Human-readable name.
    pub name: String,
    /// Whether the rule runs on its own trigger; `forceExecution` bypasses
    /// this gate.
    pub enabled: bool,
    /// Condition tree selecting matching tabs.
    pub when: Condition,
    /// Ordered action list to execute against matches.
    pub then: Vec<ActionRecord>,
    /// Trigger descriptor.
    pub trigger: Trigger,
    /// Behavior flags.
    #[serde(default)]
    pub flags: RuleFlags,
}

/// The options a caller passes to `run_rule`/`run_rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
    /// Run even if the rule is `enabled = false`.
    pub force_execution: bool,
    /// Compile and select, but issue no driver mutations.
    pub dry_run: bool,
}

/// Everything a rule run needs besides the rule itself: the tab/window
/// snapshot, derived indices, and the current time.
pub struct ExecutionContext<'a> {
    /// Enriched tab snapshot, immutable for the duration of the run.
    pub tabs: &'a [EnrichedTab],
    /// Window snapshot.
    pub windows: &'a [Window],
    /// Derived indices over `tabs`.
    pub indices: &'a Indices,
    /// Time the snapshot was taken, ms since epoch.
    pub now: TimestampMs,
    /// Options for this particular run.
    pub options: RunOptions,
    /// The window that requested this run, if the caller is window-scoped.
    pub caller_window_id: Option<WindowId>,
}

/// Multi-maps derived from a tab snapshot by the index builder.
#[derive(Debug, Clone, Default)]
pub struct Indices {
    /// Tabs grouped by `domain`.
    pub by_domain: HashMap<String, Vec<TabId>>,
    /// Tabs grouped by `origin`.
    pub by_origin: HashMap<String, Vec<TabId>>,
    /// Tabs grouped by `dupe_key`.
    pub by_dupe_key: HashMap<String, Vec<TabId>>,
    /// Tabs grouped by `category`.
    pub by_category: HashMap<String, Vec<TabId>>,
    /// Tab count per window id.
    pub tab_count_by_window: HashMap<WindowId, usize>,
}

/// The outcome of executing one action against one tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerActionResult {
    /// Tab the action targeted, if per-tab (batch actions may omit this).
    pub tab_id: Option<TabId>,
    /// The action name.
    pub action: String,
    /// Whether the action succeeded.
    pub success: bool,
    /// Failure message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Whether this result came from a dry run (no driver call was made).
    pub dry_run: bool,
    /// Free-form extra detail (e.g. `{"preview": true}` for dry runs).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub details: serde_json::Map<String, serde_json::Value>,
}

/// One rule-wide error entry, re-exported here for `RuleRunResult` callers
/// that don't want to depend on [`crate::error`] directly.
pub use crate::error::RunError;

/// The result of one rule run.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRunResult {
    /// Ids of the tabs the predicate selected.
    pub matches: Vec<TabId>,
    /// Per-action outcomes, in execution order.
    pub actions: Vec<PerActionResult>,
    /// `matches.len()`.
    pub total_matches: usize,
    /// `actions.len()`.
    pub total_actions: usize,
    /// Errors accumulated during validation and dispatch.
    pub errors: Vec<RunError>,
    /// Wall-clock duration of the run, in milliseconds.
    pub duration_ms: u64,
}

impl RuleRunResult {
    /// Builds a result from matches and actions, deriving the totals.
    #[must_use]
    pub fn new(
        matches: Vec<TabId>,
        actions: Vec<PerActionResult>,
        errors: Vec<RunError>,
        duration_ms: u64,
    ) -> Self {
        Self {
            total_matches: matches.len(),
            total_actions: actions.len(),
            matches,
            actions,
            errors,
            duration_ms,
        }
    }
}
