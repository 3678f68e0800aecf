// tabrules-core/src/model/ids.rs
// ============================================================================
// Module: Tab Rules Identifiers
// Description: Opaque identifiers for rules, tabs, windows, and groups.
// Purpose: Provide strongly typed, serializable IDs with stable string/int forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are wrapped so that a `TabId` can never be passed where a
//! `WindowId` is expected. Rule/trigger identifiers are collaborator-owned
//! strings; tab/window/group identifiers mirror the browser driver's
//! own integer ids.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Stable, collaborator-assigned rule identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    /// Creates a new rule identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for RuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RuleId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Browser-assigned tab identifier, stable within a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(i64);

impl TabId {
    /// Creates a new tab identifier from the driver's raw integer id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer id.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Browser-assigned window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(i64);

impl WindowId {
    /// Creates a new window identifier from the driver's raw integer id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer id.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Browser-assigned tab group identifier. The sentinel `-1` means ungrouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(i64);

/// Sentinel value meaning "this tab is not in any group".
pub const UNGROUPED: GroupId = GroupId(-1);

impl GroupId {
    /// Creates a new group identifier from the driver's raw integer id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer id.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Returns whether this id is the ungrouped sentinel.
    #[must_use]
    pub const fn is_ungrouped(self) -> bool {
        self.0 == UNGROUPED.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Default for GroupId {
    fn default() -> Self {
        UNGROUPED
    }
}
