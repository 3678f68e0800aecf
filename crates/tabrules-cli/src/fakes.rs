// tabrules-cli/src/fakes.rs
// ============================================================================
// Module: In-Memory Fakes
// Description: A mutable in-memory `BrowserDriver` and `KvStore`, standing
//              in for a real browser extension host and its storage area.
// Purpose: Let `run`/`preview` exercise the full engine without a browser,
//          and give integration tests a deterministic collaborator pair.
// Dependencies: tabrules-core
// ============================================================================

//! ## Overview
//! [`FakeBrowserDriver`] keeps tabs, windows, and groups in
//! [`std::sync::Mutex`]-guarded vectors and applies every mutation the way a
//! real extension host would (closing removes from its window's tab list,
//! grouping reassigns `group_id`, and so on), so a rule run against it
//! behaves the same as it would against a live browser. [`FakeKvStore`] is a
//! plain `HashMap` behind a mutex; neither fake persists across a process
//! restart, unlike [`tabrules_store_sqlite::SqliteStore`].

use std::collections::HashMap;
use std::sync::Mutex;

use tabrules_core::error::DriverError;
use tabrules_core::error::StorageError;
use tabrules_core::interfaces::BookmarkRequest;
use tabrules_core::interfaces::BrowserDriver;
use tabrules_core::interfaces::GroupUpdate;
use tabrules_core::interfaces::KvStore;
use tabrules_core::interfaces::MoveTarget;
use tabrules_core::interfaces::TabUpdate;
use tabrules_core::model::GroupId;
use tabrules_core::model::Tab;
use tabrules_core::model::TabId;
use tabrules_core::model::Window;
use tabrules_core::model::WindowId;
use tabrules_core::model::UNGROUPED;

/// One tracked tab group: its window, title, and color.
#[derive(Debug, Clone)]
struct FakeGroup {
    /// This group's id.
    id: GroupId,
    /// Window the group belongs to.
    window_id: WindowId,
    /// Group title, used for title-based lookup.
    title: String,
    /// Palette color index.
    color: u8,
    /// Whether the group is collapsed in the tab strip.
    collapsed: bool,
}

/// One recorded bookmark or folder creation.
struct FakeBookmark {
    /// Id assigned to this entry; a folder's id is usable as a later
    /// bookmark's `parent_id`.
    id: String,
    /// The request that created it.
    request: BookmarkRequest,
}

/// Mutable state backing [`FakeBrowserDriver`].
struct FakeState {
    /// Every tracked tab.
    tabs: Vec<Tab>,
    /// Every tracked window.
    windows: Vec<Window>,
    /// Every tracked tab group.
    groups: Vec<FakeGroup>,
    /// Every recorded bookmark/folder creation, in creation order.
    bookmarks: Vec<FakeBookmark>,
    /// Next id to assign to a created tab.
    next_tab_id: i64,
    /// Next id to assign to a created window.
    next_window_id: i64,
    /// Next id to assign to a created group.
    next_group_id: i64,
}

/// An in-memory stand-in for a browser extension's `tabs`/`windows`/
/// `tabGroups`/`bookmarks` APIs.
///
/// Seed tabs and windows with [`FakeBrowserDriver::seed_window`] before
/// running rules against it; every [`BrowserDriver`] call mutates the same
/// shared state, so a run's driver calls are visible to the next query.
pub struct FakeBrowserDriver {
    /// All tracked tabs, windows, groups, and bookmarks.
    state: Mutex<FakeState>,
}

impl Default for FakeBrowserDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBrowserDriver {
    /// Builds an empty driver with no tabs or windows.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                tabs: Vec::new(),
                windows: Vec::new(),
                groups: Vec::new(),
                bookmarks: Vec::new(),
                next_tab_id: 1,
                next_window_id: 1,
                next_group_id: 1,
            }),
        }
    }

    /// Locks the shared state, recovering from a poisoned mutex rather
    /// than panicking (a prior panic inside one driver call must not wedge
    /// every call after it).
    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Creates a window and seeds it with the given tabs (each `(url,
    /// title)` pair becomes one unpinned, un-grouped tab). Returns the new
    /// window's id.
    pub fn seed_window(&self, tabs: &[(&str, &str)], created_at: i64) -> WindowId {
        let mut state = self.lock();
        let window_id = WindowId::new(state.next_window_id);
        state.next_window_id += 1;

        let mut tab_ids = Vec::with_capacity(tabs.len());
        for (index, (url, title)) in tabs.iter().enumerate() {
            let tab_id = TabId::new(state.next_tab_id);
            state.next_tab_id += 1;
            tab_ids.push(tab_id);
            state.tabs.push(Tab {
                id: tab_id,
                window_id,
                url: (*url).to_string(),
                title: (*title).to_string(),
                pinned: false,
                active: index == 0,
                audible: false,
                muted: false,
                discarded: false,
                group_id: UNGROUPED,
                index: index as u32,
                last_accessed: Some(created_at),
                created_at,
            });
        }

        state.windows.push(Window {
            id: window_id,
            focused: state.windows.is_empty(),
            incognito: false,
            tab_ids,
        });
        window_id
    }

    /// Returns every bookmark/folder request recorded so far, in creation
    /// order, as `(assigned id, request)` pairs.
    #[must_use]
    pub fn bookmarks(&self) -> Vec<(String, BookmarkRequest)> {
        self.lock().bookmarks.iter().map(|entry| (entry.id.clone(), entry.request.clone())).collect()
    }
}

impl BrowserDriver for FakeBrowserDriver {
    fn query_tabs(&self) -> Result<Vec<Tab>, DriverError> {
        Ok(self.lock().tabs.clone())
    }

    fn query_windows(&self) -> Result<Vec<Window>, DriverError> {
        Ok(self.lock().windows.clone())
    }

    fn remove_tabs(&self, ids: &[TabId]) -> Result<(), DriverError> {
        let mut state = self.lock();
        for &id in ids {
            state.tabs.retain(|tab| tab.id != id);
        }
        for window in &mut state.windows {
            window.tab_ids.retain(|tab_id| !ids.contains(tab_id));
        }
        Ok(())
    }

    fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<(), DriverError> {
        let mut state = self.lock();
        let tab = state.tabs.iter_mut().find(|tab| tab.id == id).ok_or(DriverError::TabNotFound(id))?;
        if let Some(pinned) = update.pinned {
            tab.pinned = pinned;
        }
        if let Some(muted) = update.muted {
            tab.muted = muted;
        }
        if let Some(active) = update.active {
            tab.active = active;
        }
        Ok(())
    }

    fn move_tabs(&self, ids: &[TabId], target: MoveTarget) -> Result<(), DriverError> {
        let mut state = self.lock();
        if !state.windows.iter().any(|window| window.id == target.window_id) {
            return Err(DriverError::CallFailed {
                tab_id: *ids.first().unwrap_or(&TabId::new(0)),
                message: format!("target window {} does not exist", target.window_id),
            });
        }
        for &id in ids {
            let Some(tab) = state.tabs.iter_mut().find(|tab| tab.id == id) else {
                return Err(DriverError::TabNotFound(id));
            };
            let previous_window = tab.window_id;
            tab.window_id = target.window_id;
            if let Some(index) = target.index {
                tab.index = index;
            }
            if previous_window != target.window_id {
                if let Some(window) = state.windows.iter_mut().find(|window| window.id == previous_window) {
                    window.tab_ids.retain(|tab_id| *tab_id != id);
                }
                if let Some(window) = state.windows.iter_mut().find(|window| window.id == target.window_id) {
                    if !window.tab_ids.contains(&id) {
                        window.tab_ids.push(id);
                    }
                }
            }
        }
        Ok(())
    }

    fn discard_tab(&self, id: TabId) -> Result<(), DriverError> {
        let mut state = self.lock();
        let tab = state.tabs.iter_mut().find(|tab| tab.id == id).ok_or(DriverError::TabNotFound(id))?;
        tab.discarded = true;
        Ok(())
    }

    fn group_tabs(&self, ids: &[TabId], existing_group: Option<GroupId>) -> Result<GroupId, DriverError> {
        let mut state = self.lock();
        let Some(&first_id) = ids.first() else {
            return Err(DriverError::CallFailed {
                tab_id: TabId::new(0),
                message: "group_tabs called with no tabs".to_string(),
            });
        };
        let window_id = state
            .tabs
            .iter()
            .find(|tab| tab.id == first_id)
            .map(|tab| tab.window_id)
            .ok_or(DriverError::TabNotFound(first_id))?;

        let group_id = if let Some(existing) = existing_group {
            existing
        } else {
            let id = GroupId::new(state.next_group_id);
            state.next_group_id += 1;
            state.groups.push(FakeGroup {
                id,
                window_id,
                title: String::new(),
                color: 0,
                collapsed: false,
            });
            id
        };

        for &id in ids {
            let Some(tab) = state.tabs.iter_mut().find(|tab| tab.id == id) else {
                return Err(DriverError::TabNotFound(id));
            };
            tab.group_id = group_id;
        }
        Ok(group_id)
    }

    fn update_group(&self, id: GroupId, update: GroupUpdate) -> Result<(), DriverError> {
        let mut state = self.lock();
        let Some(group) = state.groups.iter_mut().find(|group| group.id == id) else {
            return Err(DriverError::CallFailed {
                tab_id: TabId::new(0),
                message: format!("group {id} does not exist"),
            });
        };
        if let Some(title) = update.title {
            group.title = title;
        }
        if let Some(color) = update.color {
            group.color = color;
        }
        if let Some(collapsed) = update.collapsed {
            group.collapsed = collapsed;
        }
        Ok(())
    }

    fn find_group_by_title(&self, window_id: WindowId, title: &str) -> Result<Option<GroupId>, DriverError> {
        let state = self.lock();
        Ok(state
            .groups
            .iter()
            .find(|group| group.window_id == window_id && group.title == title)
            .map(|group| group.id))
    }

    fn create_bookmark(&self, request: BookmarkRequest) -> Result<(), DriverError> {
        let mut state = self.lock();
        let id = format!("bookmark-{}", state.bookmarks.len() + 1);
        state.bookmarks.push(FakeBookmark { id, request });
        Ok(())
    }

    fn find_or_create_folder(&self, title: &str, create_if_missing: bool) -> Result<Option<String>, DriverError> {
        let mut state = self.lock();
        if let Some(entry) = state.bookmarks.iter().find(|entry| entry.request.url.is_none() && entry.request.title == title) {
            return Ok(Some(entry.id.clone()));
        }
        if !create_if_missing {
            return Ok(None);
        }
        let folder_id = format!("folder-{}", state.bookmarks.len() + 1);
        state.bookmarks.push(FakeBookmark {
            id: folder_id.clone(),
            request: BookmarkRequest {
                parent_id: "other".to_string(),
                title: title.to_string(),
                url: None,
            },
        });
        Ok(Some(folder_id))
    }

    fn create_window(&self, url: Option<&str>) -> Result<Window, DriverError> {
        let mut state = self.lock();
        let window_id = WindowId::new(state.next_window_id);
        state.next_window_id += 1;
        let tab_id = TabId::new(state.next_tab_id);
        state.next_tab_id += 1;

        state.tabs.push(Tab {
            id: tab_id,
            window_id,
            url: url.unwrap_or("about:blank").to_string(),
            title: String::new(),
            pinned: false,
            active: true,
            audible: false,
            muted: false,
            discarded: false,
            group_id: UNGROUPED,
            index: 0,
            last_accessed: None,
            created_at: 0,
        });
        let window = Window {
            id: window_id,
            focused: true,
            incognito: false,
            tab_ids: vec![tab_id],
        };
        state.windows.push(window.clone());
        Ok(window)
    }
}

/// An in-memory [`KvStore`], backed by a mutex-guarded `HashMap`. Does not
/// persist across a process restart.
#[derive(Default)]
pub struct FakeKvStore {
    /// Stored key-value pairs.
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl FakeKvStore {
    /// Builds an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for FakeKvStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner).get(key).cloned())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FakeBrowserDriver;
    use super::FakeKvStore;
    use tabrules_core::interfaces::BrowserDriver;
    use tabrules_core::interfaces::KvStore;
    use tabrules_core::interfaces::MoveTarget;

    #[test]
    fn seed_window_creates_tabs_with_increasing_ids() {
        let driver = FakeBrowserDriver::new();
        driver.seed_window(&[("https://a.example", "A"), ("https://b.example", "B")], 1_000);
        let tabs = driver.query_tabs().expect("query");
        assert_eq!(tabs.len(), 2);
        assert!(tabs[0].active);
        assert!(!tabs[1].active);
    }

    #[test]
    fn move_tabs_updates_window_membership() {
        let driver = FakeBrowserDriver::new();
        let first = driver.seed_window(&[("https://a.example", "A")], 1_000);
        let second = driver.seed_window(&[("https://b.example", "B")], 1_000);
        let tab_id = driver.query_tabs().expect("query")[0].id;

        driver
            .move_tabs(&[tab_id], MoveTarget { window_id: second, index: None })
            .expect("move");

        let windows = driver.query_windows().expect("query");
        let origin = windows.iter().find(|window| window.id == first).expect("origin window");
        let destination = windows.iter().find(|window| window.id == second).expect("destination window");
        assert!(!origin.tab_ids.contains(&tab_id));
        assert!(destination.tab_ids.contains(&tab_id));
    }

    #[test]
    fn kv_store_round_trips_a_value() {
        let kv = FakeKvStore::new();
        kv.set("scheduledTriggers", serde_json::json!([])).expect("set");
        assert_eq!(kv.get("scheduledTriggers").expect("get"), Some(serde_json::json!([])));
        kv.remove("scheduledTriggers").expect("remove");
        assert_eq!(kv.get("scheduledTriggers").expect("get"), None);
    }
}
