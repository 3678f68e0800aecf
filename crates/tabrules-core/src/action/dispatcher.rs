// tabrules-core/src/action/dispatcher.rs
// ============================================================================
// Module: Action Dispatcher
// Description: Executes a validated, sorted action list against a matched
//              tab set, issuing driver calls and a snooze KV write.
// Purpose: Translate rule-document action records into driver/store calls,
//          honoring dry-run and per-action/per-tab failure isolation.
// Dependencies: crate::interfaces, crate::model
// ============================================================================

//! ## Overview
//! Every driver call is wrapped: one action's failure becomes a
//! `PerActionResult{success:false}` and siblings still run — failures are
//! surfaced, never silently retried. Dry-run short-circuits before any
//! driver call and reports `{preview:true}`.

use std::collections::HashMap;

use serde_json::json;

use super::close_duplicates;
use super::close_duplicates::KeepStrategy;
use crate::error::DriverError;
use crate::error::RunError;
use crate::interfaces::BookmarkRequest;
use crate::interfaces::BrowserDriver;
use crate::interfaces::GroupUpdate;
use crate::interfaces::KvStore;
use crate::interfaces::MoveTarget;
use crate::interfaces::TabUpdate;
use crate::model::ActionRecord;
use crate::model::EnrichedTab;
use crate::model::PerActionResult;
use crate::model::TabId;
use crate::model::TimestampMs;
use crate::model::WindowId;

/// Dispatches `actions` (already sorted by [`super::validator::sort_and_validate`])
/// against `matched`, returning per-action results and any run-level
/// errors.
#[allow(clippy::too_many_arguments)]
pub fn dispatch(
    actions: &[ActionRecord],
    matched: &[&EnrichedTab],
    driver: &dyn BrowserDriver,
    kv: &dyn KvStore,
    now: TimestampMs,
    dry_run: bool,
) -> (Vec<PerActionResult>, Vec<RunError>) {
    let mut results = Vec::new();
    let mut errors = Vec::new();

    for action in actions {
        let outcome = match action.action.as_str() {
            "pin" => per_tab(matched, "pin", dry_run, |tab| {
                driver.update_tab(
                    tab.tab.id,
                    TabUpdate {
                        pinned: Some(true),
                        ..Default::default()
                    },
                )
            }),
            "unpin" => per_tab(matched, "unpin", dry_run, |tab| {
                driver.update_tab(
                    tab.tab.id,
                    TabUpdate {
                        pinned: Some(false),
                        ..Default::default()
                    },
                )
            }),
            "mute" => per_tab(matched, "mute", dry_run, |tab| {
                driver.update_tab(
                    tab.tab.id,
                    TabUpdate {
                        muted: Some(true),
                        ..Default::default()
                    },
                )
            }),
            "unmute" => per_tab(matched, "unmute", dry_run, |tab| {
                driver.update_tab(
                    tab.tab.id,
                    TabUpdate {
                        muted: Some(false),
                        ..Default::default()
                    },
                )
            }),
            "suspend" | "discard" => per_tab(matched, "suspend", dry_run, |tab| {
                if tab.tab.active || tab.tab.pinned || tab.tab.audible {
                    Ok(PerActionResult {
                        tab_id: Some(tab.tab.id),
                        action: "suspend".to_string(),
                        success: true,
                        error: None,
                        dry_run,
                        details: object(&[("skipped", json!(true))]),
                    })
                } else {
                    driver.discard_tab(tab.tab.id).map(|()| success(tab.tab.id, "suspend", dry_run))
                }
            }),
            "close" => close_tabs(matched, driver, dry_run),
            "close-duplicates" => close_duplicates_action(action, matched, driver, dry_run),
            "snooze" => snooze_tabs(action, matched, driver, kv, now, dry_run),
            "group" => group_tabs(action, matched, driver, dry_run),
            "bookmark" => bookmark_tabs(action, matched, driver, dry_run),
            "move" => move_tabs(action, matched, driver, dry_run),
            unknown => {
                errors.push(RunError::rule_wide(unknown, format!("Unknown action: {unknown}")));
                vec![PerActionResult {
                    tab_id: None,
                    action: unknown.to_string(),
                    success: false,
                    error: Some(format!("Unknown action: {unknown}")),
                    dry_run,
                    details: serde_json::Map::new(),
                }]
            }
        };

        for result in &outcome {
            if !result.success {
                errors.push(RunError {
                    tab_id: result.tab_id,
                    action: result.action.clone(),
                    message: result.error.clone().unwrap_or_default(),
                });
            }
        }
        results.extend(outcome);
    }

    (results, errors)
}

fn success(tab_id: TabId, action: &str, dry_run: bool) -> PerActionResult {
    PerActionResult {
        tab_id: Some(tab_id),
        action: action.to_string(),
        success: true,
        error: None,
        dry_run,
        details: serde_json::Map::new(),
    }
}

fn object(pairs: &[(&str, serde_json::Value)]) -> serde_json::Map<String, serde_json::Value> {
    pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect()
}

fn per_tab(
    matched: &[&EnrichedTab],
    action: &str,
    dry_run: bool,
    f: impl Fn(&EnrichedTab) -> Result<PerActionResult, DriverError>,
) -> Vec<PerActionResult> {
    matched
        .iter()
        .map(|tab| {
            if dry_run {
                return PerActionResult {
                    tab_id: Some(tab.tab.id),
                    action: action.to_string(),
                    success: true,
                    error: None,
                    dry_run: true,
                    details: object(&[("preview", json!(true))]),
                };
            }
            match f(tab) {
                Ok(result) => result,
                Err(error) => PerActionResult {
                    tab_id: Some(tab.tab.id),
                    action: action.to_string(),
                    success: false,
                    error: Some(error.to_string()),
                    dry_run: false,
                    details: serde_json::Map::new(),
                },
            }
        })
        .collect()
}

fn close_tabs(matched: &[&EnrichedTab], driver: &dyn BrowserDriver, dry_run: bool) -> Vec<PerActionResult> {
    if dry_run {
        return matched
            .iter()
            .map(|tab| PerActionResult {
                tab_id: Some(tab.tab.id),
                action: "close".to_string(),
                success: true,
                error: None,
                dry_run: true,
                details: object(&[("preview", json!(true))]),
            })
            .collect();
    }
    let ids: Vec<TabId> = matched.iter().map(|t| t.tab.id).collect();
    match driver.remove_tabs(&ids) {
        Ok(()) => ids.into_iter().map(|id| success(id, "close", false)).collect(),
        Err(error) => ids
            .into_iter()
            .map(|id| PerActionResult {
                tab_id: Some(id),
                action: "close".to_string(),
                success: false,
                error: Some(error.to_string()),
                dry_run: false,
                details: serde_json::Map::new(),
            })
            .collect(),
    }
}

fn close_duplicates_action(
    action: &ActionRecord,
    matched: &[&EnrichedTab],
    driver: &dyn BrowserDriver,
    dry_run: bool,
) -> Vec<PerActionResult> {
    let strategy = KeepStrategy::parse(action.params.get("keep").and_then(|v| v.as_str()));
    let to_close = close_duplicates::select_keepers(matched, strategy);
    if to_close.is_empty() {
        return Vec::new();
    }
    if dry_run {
        return to_close
            .into_iter()
            .map(|id| PerActionResult {
                tab_id: Some(id),
                action: "close-duplicates".to_string(),
                success: true,
                error: None,
                dry_run: true,
                details: object(&[("preview", json!(true))]),
            })
            .collect();
    }
    match driver.remove_tabs(&to_close) {
        Ok(()) => to_close
            .into_iter()
            .map(|id| success(id, "close-duplicates", false))
            .collect(),
        Err(error) => to_close
            .into_iter()
            .map(|id| PerActionResult {
                tab_id: Some(id),
                action: "close-duplicates".to_string(),
                success: false,
                error: Some(error.to_string()),
                dry_run: false,
                details: serde_json::Map::new(),
            })
            .collect(),
    }
}

/// Key under which pending snooze wake records are stored.
pub const SNOOZED_TABS_KEY: &str = "snoozedTabs";

fn snooze_tabs(
    action: &ActionRecord,
    matched: &[&EnrichedTab],
    driver: &dyn BrowserDriver,
    kv: &dyn KvStore,
    now: TimestampMs,
    dry_run: bool,
) -> Vec<PerActionResult> {
    let wake_at = resolve_wake_at(action, now);
    if dry_run {
        return matched
            .iter()
            .map(|tab| PerActionResult {
                tab_id: Some(tab.tab.id),
                action: "snooze".to_string(),
                success: true,
                error: None,
                dry_run: true,
                details: object(&[("preview", json!(true)), ("wakeAt", json!(wake_at))]),
            })
            .collect();
    }

    let mut pending = load_snoozed(kv);
    for tab in matched {
        pending.push(json!({
            "tabId": tab.tab.id,
            "url": tab.tab.url,
            "title": tab.tab.title,
            "windowId": tab.tab.window_id,
            "groupId": tab.tab.group_id,
            "wakeAt": wake_at,
            "reason": "snooze",
        }));
    }
    if let Err(error) = kv.set(SNOOZED_TABS_KEY, serde_json::Value::Array(pending)) {
        return matched
            .iter()
            .map(|tab| PerActionResult {
                tab_id: Some(tab.tab.id),
                action: "snooze".to_string(),
                success: false,
                error: Some(error.to_string()),
                dry_run: false,
                details: serde_json::Map::new(),
            })
            .collect();
    }

    let ids: Vec<TabId> = matched.iter().map(|t| t.tab.id).collect();
    match driver.remove_tabs(&ids) {
        Ok(()) => ids.into_iter().map(|id| success(id, "snooze", false)).collect(),
        Err(error) => ids
            .into_iter()
            .map(|id| PerActionResult {
                tab_id: Some(id),
                action: "snooze".to_string(),
                success: false,
                error: Some(error.to_string()),
                dry_run: false,
                details: serde_json::Map::new(),
            })
            .collect(),
    }
}

fn load_snoozed(kv: &dyn KvStore) -> Vec<serde_json::Value> {
    kv.get(SNOOZED_TABS_KEY)
        .ok()
        .flatten()
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}

/// Restores every wake record in `snoozedTabs` whose `wakeAt <= now`:
/// recreates the tab (in its original window if still alive, else a new
/// window), rejoins the original group if a tab carrying that group id
/// still exists, and drops the record. Due records that fail to restore
/// are left in the store so the next sweep retries them.
///
/// Returns the count of records successfully restored, plus any per-record
/// errors encountered along the way.
pub fn sweep_snoozed_tabs(driver: &dyn BrowserDriver, kv: &dyn KvStore, now: TimestampMs) -> (usize, Vec<RunError>) {
    let pending = load_snoozed(kv);
    if pending.is_empty() {
        return (0, Vec::new());
    }

    let (due, still_pending): (Vec<_>, Vec<_>) = pending
        .into_iter()
        .partition(|record| record.get("wakeAt").and_then(serde_json::Value::as_i64).unwrap_or(now) <= now);
    if due.is_empty() {
        return (0, Vec::new());
    }

    let mut restored = 0;
    let mut errors = Vec::new();
    let mut remaining = still_pending;

    for record in due {
        match restore_wake_record(driver, &record) {
            Ok(()) => restored += 1,
            Err(error) => {
                errors.push(RunError::rule_wide("snooze-sweep", error.to_string()));
                remaining.push(record);
            }
        }
    }

    if let Err(error) = kv.set(SNOOZED_TABS_KEY, serde_json::Value::Array(remaining)) {
        errors.push(RunError::rule_wide("snooze-sweep", error.to_string()));
    }

    (restored, errors)
}

/// Restores one due wake record: recreate the tab, rejoin its window and
/// group, but do not touch the store (the caller owns the rewrite).
fn restore_wake_record(driver: &dyn BrowserDriver, record: &serde_json::Value) -> Result<(), DriverError> {
    let url = record.get("url").and_then(serde_json::Value::as_str);
    let original_window = record
        .get("windowId")
        .and_then(serde_json::Value::as_i64)
        .map(WindowId::new);
    let original_group = record.get("groupId").and_then(serde_json::Value::as_i64).map(crate::model::GroupId::new);

    let window = driver.create_window(url)?;
    let Some(&new_tab_id) = window.tab_ids.first() else {
        return Ok(());
    };

    let windows = driver.query_windows().unwrap_or_default();
    if let Some(original_window) = original_window {
        if original_window != window.id && windows.iter().any(|w| w.id == original_window) {
            driver.move_tabs(
                &[new_tab_id],
                MoveTarget {
                    window_id: original_window,
                    index: None,
                },
            )?;
        }
    }

    if let Some(original_group) = original_group {
        if !original_group.is_ungrouped() {
            let tabs = driver.query_tabs().unwrap_or_default();
            let group_still_exists = tabs.iter().any(|tab| tab.id != new_tab_id && tab.group_id == original_group);
            if group_still_exists {
                driver.group_tabs(&[new_tab_id], Some(original_group))?;
            }
        }
    }

    Ok(())
}

fn resolve_wake_at(action: &ActionRecord, now: TimestampMs) -> TimestampMs {
    if let Some(until) = action.params.get("until").and_then(|v| v.as_i64()) {
        return until;
    }
    if let Some(duration) = action.params.get("for").and_then(|v| v.as_str()) {
        if let Some(ms) = crate::duration::parse_duration_ms(duration) {
            return now + ms;
        }
    }
    now
}

fn group_tabs(
    action: &ActionRecord,
    matched: &[&EnrichedTab],
    driver: &dyn BrowserDriver,
    dry_run: bool,
) -> Vec<PerActionResult> {
    let by_domain = action.params.get("by").and_then(|v| v.as_str()) == Some("domain");
    let create_if_missing = action.params.get("createIfMissing").and_then(|v| v.as_bool()).unwrap_or(true);
    let explicit_name = action.params.get("name").and_then(|v| v.as_str());

    let mut partitions: HashMap<(WindowId, String), Vec<TabId>> = HashMap::new();
    for tab in matched {
        let title = if by_domain {
            tab.domain.clone()
        } else {
            explicit_name.unwrap_or("Grouped").to_string()
        };
        partitions.entry((tab.tab.window_id, title)).or_default().push(tab.tab.id);
    }

    if dry_run {
        return partitions
            .into_values()
            .flatten()
            .map(|id| PerActionResult {
                tab_id: Some(id),
                action: "group".to_string(),
                success: true,
                error: None,
                dry_run: true,
                details: object(&[("preview", json!(true))]),
            })
            .collect();
    }

    let mut results = Vec::new();
    for ((window_id, title), ids) in partitions {
        let existing = driver.find_group_by_title(window_id, &title).unwrap_or(None);
        if existing.is_none() && !create_if_missing {
            for id in ids {
                results.push(PerActionResult {
                    tab_id: Some(id),
                    action: "group".to_string(),
                    success: false,
                    error: Some(format!("no existing group titled {title:?} in window {window_id} and createIfMissing is false")),
                    dry_run: false,
                    details: serde_json::Map::new(),
                });
            }
            continue;
        }
        match driver.group_tabs(&ids, existing) {
            Ok(group_id) => {
                let _ = driver.update_group(
                    group_id,
                    GroupUpdate {
                        title: Some(title.clone()),
                        color: Some(palette_color(&title)),
                        collapsed: None,
                    },
                );
                for id in ids {
                    results.push(success(id, "group", false));
                }
            }
            Err(error) => {
                for id in ids {
                    results.push(PerActionResult {
                        tab_id: Some(id),
                        action: "group".to_string(),
                        success: false,
                        error: Some(error.to_string()),
                        dry_run: false,
                        details: serde_json::Map::new(),
                    });
                }
            }
        }
    }
    results
}

/// Deterministically hashes a title to one of eight palette slots.
fn palette_color(title: &str) -> u8 {
    let mut hash: u32 = 2_166_136_261;
    for byte in title.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(16_777_619);
    }
    (hash % 8) as u8
}

fn bookmark_tabs(
    action: &ActionRecord,
    matched: &[&EnrichedTab],
    driver: &dyn BrowserDriver,
    dry_run: bool,
) -> Vec<PerActionResult> {
    let folder_title = action.params.get("folder").and_then(|v| v.as_str()).unwrap_or("Bookmarked");

    if dry_run {
        return matched
            .iter()
            .map(|tab| PerActionResult {
                tab_id: Some(tab.tab.id),
                action: "bookmark".to_string(),
                success: true,
                error: None,
                dry_run: true,
                details: object(&[("preview", json!(true))]),
            })
            .collect();
    }

    let folder = match driver.find_or_create_folder(folder_title, true) {
        Ok(Some(id)) => id,
        Ok(None) => {
            return matched
                .iter()
                .map(|tab| PerActionResult {
                    tab_id: Some(tab.tab.id),
                    action: "bookmark".to_string(),
                    success: false,
                    error: Some("bookmark folder unavailable".to_string()),
                    dry_run: false,
                    details: serde_json::Map::new(),
                })
                .collect();
        }
        Err(error) => {
            return matched
                .iter()
                .map(|tab| PerActionResult {
                    tab_id: Some(tab.tab.id),
                    action: "bookmark".to_string(),
                    success: false,
                    error: Some(error.to_string()),
                    dry_run: false,
                    details: serde_json::Map::new(),
                })
                .collect();
        }
    };

    matched
        .iter()
        .map(|tab| {
            let request = BookmarkRequest {
                parent_id: folder.clone(),
                title: tab.tab.title.clone(),
                url: Some(tab.tab.url.clone()),
            };
            match driver.create_bookmark(request) {
                Ok(()) => success(tab.tab.id, "bookmark", false),
                Err(error) => PerActionResult {
                    tab_id: Some(tab.tab.id),
                    action: "bookmark".to_string(),
                    success: false,
                    error: Some(error.to_string()),
                    dry_run: false,
                    details: serde_json::Map::new(),
                },
            }
        })
        .collect()
}

fn move_tabs(
    action: &ActionRecord,
    matched: &[&EnrichedTab],
    driver: &dyn BrowserDriver,
    dry_run: bool,
) -> Vec<PerActionResult> {
    let Some(window_id) = action.params.get("windowId").and_then(serde_json::Value::as_i64) else {
        return matched
            .iter()
            .map(|tab| PerActionResult {
                tab_id: Some(tab.tab.id),
                action: "move".to_string(),
                success: false,
                error: Some("move requires a windowId parameter".to_string()),
                dry_run: false,
                details: serde_json::Map::new(),
            })
            .collect();
    };
    let window_id = WindowId::new(window_id);
    let target = MoveTarget { window_id, index: None };
    let preserve_group = action.params.get("preserveGroup").and_then(serde_json::Value::as_bool).unwrap_or(false);

    if dry_run {
        return matched
            .iter()
            .map(|tab| PerActionResult {
                tab_id: Some(tab.tab.id),
                action: "move".to_string(),
                success: true,
                error: None,
                dry_run: true,
                details: object(&[("preview", json!(true))]),
            })
            .collect();
    }

    let ids: Vec<TabId> = matched.iter().map(|t| t.tab.id).collect();
    let outcome = match driver.move_tabs(&ids, target) {
        Ok(()) => ids.into_iter().map(|id| success(id, "move", false)).collect(),
        Err(error) => {
            return ids
                .into_iter()
                .map(|id| PerActionResult {
                    tab_id: Some(id),
                    action: "move".to_string(),
                    success: false,
                    error: Some(error.to_string()),
                    dry_run: false,
                    details: serde_json::Map::new(),
                })
                .collect();
        }
    };

    if preserve_group {
        rejoin_groups_by_title(driver, matched, window_id);
    }

    outcome
}

/// Rejoins each already-grouped tab in `matched` to a same-titled group in
/// `window_id`, the window they were just moved into, reusing an existing
/// group with that title or creating one (mirroring the `group` action's
/// domain-as-title convention, since that's the only title a group carries
/// in this model).
fn rejoin_groups_by_title(driver: &dyn BrowserDriver, matched: &[&EnrichedTab], window_id: WindowId) {
    let mut partitions: HashMap<String, Vec<TabId>> = HashMap::new();
    for tab in matched {
        if tab.tab.group_id.is_ungrouped() {
            continue;
        }
        partitions.entry(tab.domain.clone()).or_default().push(tab.tab.id);
    }

    for (title, ids) in partitions {
        let existing = driver.find_group_by_title(window_id, &title).unwrap_or(None);
        if let Ok(group_id) = driver.group_tabs(&ids, existing) {
            let _ = driver.update_group(
                group_id,
                GroupUpdate {
                    title: Some(title.clone()),
                    color: Some(palette_color(&title)),
                    collapsed: None,
                },
            );
        }
    }
}
