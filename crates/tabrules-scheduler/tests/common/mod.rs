// tabrules-scheduler/tests/common/mod.rs
// ============================================================================
// Module: Scheduler Test Fakes
// Description: Thread-safe in-memory driver/KV/rule-store doubles for
//              scheduler integration tests.
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;
use tabrules_core::error::DriverError;
use tabrules_core::error::StorageError;
use tabrules_core::interfaces::BookmarkRequest;
use tabrules_core::interfaces::BrowserDriver;
use tabrules_core::interfaces::GroupUpdate;
use tabrules_core::interfaces::KvStore;
use tabrules_core::interfaces::MoveTarget;
use tabrules_core::interfaces::RuleStore;
use tabrules_core::interfaces::TabUpdate;
use tabrules_core::model::GroupId;
use tabrules_core::model::Rule;
use tabrules_core::model::RuleId;
use tabrules_core::model::Tab;
use tabrules_core::model::TabId;
use tabrules_core::model::Window;
use tabrules_core::model::WindowId;

/// A [`BrowserDriver`] double that counts `query_tabs` calls, one per rule
/// run the scheduler actually starts.
pub struct CountingDriver {
    /// Number of times `query_tabs` has been called.
    calls: Arc<Mutex<u32>>,
}

impl CountingDriver {
    /// Builds a driver with zero calls, with an empty tab/window snapshot.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Returns the current call count.
    pub fn call_count(&self) -> u32 {
        *self.calls.lock().expect("lock")
    }
}

impl BrowserDriver for CountingDriver {
    fn query_tabs(&self) -> Result<Vec<Tab>, DriverError> {
        *self.calls.lock().expect("lock") += 1;
        Ok(Vec::new())
    }

    fn query_windows(&self) -> Result<Vec<Window>, DriverError> {
        Ok(Vec::new())
    }

    fn remove_tabs(&self, _ids: &[TabId]) -> Result<(), DriverError> {
        Ok(())
    }

    fn update_tab(&self, _id: TabId, _update: TabUpdate) -> Result<(), DriverError> {
        Ok(())
    }

    fn move_tabs(&self, _ids: &[TabId], _target: MoveTarget) -> Result<(), DriverError> {
        Ok(())
    }

    fn discard_tab(&self, _id: TabId) -> Result<(), DriverError> {
        Ok(())
    }

    fn group_tabs(&self, _ids: &[TabId], _existing_group: Option<GroupId>) -> Result<GroupId, DriverError> {
        Ok(GroupId::new(1))
    }

    fn update_group(&self, _id: GroupId, _update: GroupUpdate) -> Result<(), DriverError> {
        Ok(())
    }

    fn find_group_by_title(&self, _window_id: WindowId, _title: &str) -> Result<Option<GroupId>, DriverError> {
        Ok(None)
    }

    fn create_bookmark(&self, _request: BookmarkRequest) -> Result<(), DriverError> {
        Ok(())
    }

    fn find_or_create_folder(&self, _title: &str, _create_if_missing: bool) -> Result<Option<String>, DriverError> {
        Ok(None)
    }

    fn create_window(&self, _url: Option<&str>) -> Result<Window, DriverError> {
        Ok(Window {
            id: WindowId::new(1),
            focused: true,
            incognito: false,
            tab_ids: Vec::new(),
        })
    }
}

/// A thread-safe in-memory [`KvStore`] double.
pub struct MemoryKv {
    /// Backing map, guarded for cross-thread access.
    data: Mutex<std::collections::HashMap<String, Value>>,
}

impl MemoryKv {
    /// Builds an empty store.
    pub fn new() -> Self {
        Self {
            data: Mutex::new(std::collections::HashMap::new()),
        }
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.data.lock().expect("lock").get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.data.lock().expect("lock").insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.data.lock().expect("lock").remove(key);
        Ok(())
    }
}

/// A static, thread-safe [`RuleStore`] double over a fixed rule list.
pub struct FixedRuleStore {
    /// The rules this store serves.
    rules: Vec<Rule>,
}

impl FixedRuleStore {
    /// Builds a store over `rules`.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl RuleStore for FixedRuleStore {
    fn list_rules(&self) -> Result<Vec<Rule>, StorageError> {
        Ok(self.rules.clone())
    }

    fn get_rule(&self, id: &RuleId) -> Result<Option<Rule>, StorageError> {
        Ok(self.rules.iter().find(|rule| &rule.id == id).cloned())
    }
}

/// Builds a minimal enabled rule with the given id; its trigger and action
/// list are irrelevant to scheduler tests, which drive firings explicitly
/// rather than reading `rule.trigger`.
pub fn noop_rule(id: &str) -> Rule {
    Rule {
        id: RuleId::from(id),
        name: id.to_string(),
        enabled: true,
        when: serde_json::from_value(serde_json::json!({})).expect("parses"),
        then: Vec::new(),
        trigger: tabrules_core::model::Trigger::OnAction,
        flags: tabrules_core::model::RuleFlags::default(),
    }
}

/// Yields to the executor repeatedly so spawned fire-and-forget tasks (which
/// run their driver call on a `spawn_blocking` thread) get a chance to
/// complete after a paused-clock `advance`.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
