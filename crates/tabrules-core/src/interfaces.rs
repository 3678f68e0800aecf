// tabrules-core/src/interfaces.rs
// ============================================================================
// Module: External Interfaces
// Description: Backend-agnostic traits the engine depends on: browser
//              driver, key-value store, rule store.
// Purpose: Keep the engine's core free of any concrete browser or storage
//          dependency; a host process supplies implementations.
// Dependencies: crate::model, crate::error
// ============================================================================

//! ## Overview
//! These traits are deliberately synchronous and fallible: backend-agnostic,
//! constructed so implementations fail closed on missing or invalid data
//! rather than panic. `tabrules-cli` ships in-memory fakes for
//! demonstration and integration tests.

use crate::error::DriverError;
use crate::error::StorageError;
use crate::model::GroupId;
use crate::model::Rule;
use crate::model::RuleId;
use crate::model::Tab;
use crate::model::TabId;
use crate::model::Window;
use crate::model::WindowId;

/// A tab mutation the driver is asked to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabUpdate {
    /// New pinned state, if changing.
    pub pinned: Option<bool>,
    /// New muted state, if changing.
    pub muted: Option<bool>,
    /// New active state, if changing.
    pub active: Option<bool>,
}

/// Parameters for moving tabs to a (possibly new) window/position.
#[derive(Debug, Clone, Copy)]
pub struct MoveTarget {
    /// Destination window.
    pub window_id: WindowId,
    /// Destination index within that window, if specified.
    pub index: Option<u32>,
}

/// Parameters for creating or updating a tab group.
#[derive(Debug, Clone)]
pub struct GroupUpdate {
    /// New title, if changing.
    pub title: Option<String>,
    /// New color, if changing (palette index).
    pub color: Option<u8>,
    /// New collapsed state, if changing.
    pub collapsed: Option<bool>,
}

/// A bookmark creation request.
#[derive(Debug, Clone)]
pub struct BookmarkRequest {
    /// Parent folder id.
    pub parent_id: String,
    /// Bookmark title.
    pub title: String,
    /// Bookmark URL, if this is a leaf bookmark rather than a folder.
    pub url: Option<String>,
}

/// Required collaborator: queries and mutates browser tabs, windows,
/// groups, and bookmarks.
pub trait BrowserDriver {
    /// Returns all tabs currently known to the browser.
    fn query_tabs(&self) -> Result<Vec<Tab>, DriverError>;

    /// Returns all windows currently known to the browser.
    fn query_windows(&self) -> Result<Vec<Window>, DriverError>;

    /// Closes the given tabs.
    fn remove_tabs(&self, ids: &[TabId]) -> Result<(), DriverError>;

    /// Applies a partial update to one tab.
    fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<(), DriverError>;

    /// Moves the given tabs to a target window/position.
    fn move_tabs(&self, ids: &[TabId], target: MoveTarget) -> Result<(), DriverError>;

    /// Discards (suspends) one tab.
    fn discard_tab(&self, id: TabId) -> Result<(), DriverError>;

    /// Groups the given tabs, optionally joining an existing group.
    fn group_tabs(&self, ids: &[TabId], existing_group: Option<GroupId>) -> Result<GroupId, DriverError>;

    /// Updates an existing group's metadata.
    fn update_group(&self, id: GroupId, update: GroupUpdate) -> Result<(), DriverError>;

    /// Finds a group by title within a window, if one exists.
    fn find_group_by_title(&self, window_id: WindowId, title: &str) -> Result<Option<GroupId>, DriverError>;

    /// Creates a bookmark (or folder, when `url` is `None`).
    fn create_bookmark(&self, request: BookmarkRequest) -> Result<(), DriverError>;

    /// Finds a bookmark folder by title under the root "Other" folder,
    /// creating it if `create_if_missing` is set and it doesn't exist.
    fn find_or_create_folder(&self, title: &str, create_if_missing: bool) -> Result<Option<String>, DriverError>;

    /// Creates a new window, optionally navigated to `url`.
    fn create_window(&self, url: Option<&str>) -> Result<Window, DriverError>;
}

/// Required collaborator: a persistent key-value store for scheduled
/// triggers and snoozed-tab wake records.
pub trait KvStore {
    /// Reads a raw JSON value by key.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// Writes a raw JSON value by key.
    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError>;

    /// Removes a key.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Required collaborator: owns rule storage; the engine never persists
/// rules itself.
pub trait RuleStore {
    /// Returns all rules currently defined.
    fn list_rules(&self) -> Result<Vec<Rule>, StorageError>;

    /// Returns one rule by id, if it exists.
    fn get_rule(&self, id: &RuleId) -> Result<Option<Rule>, StorageError>;
}
