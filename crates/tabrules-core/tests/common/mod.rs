// tabrules-core/tests/common/mod.rs
// ============================================================================
// Module: Integration Test Fakes
// Description: In-memory BrowserDriver/KvStore/RuleStore doubles for
//              exercising full rule runs.
// ============================================================================

use std::cell::RefCell;
use std::collections::HashMap;

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

#[derive(Default)]
pub struct FakeDriver {
    pub tabs: RefCell<Vec<Tab>>,
    pub windows: Vec<Window>,
    pub removed: RefCell<Vec<TabId>>,
}

impl FakeDriver {
    pub fn new(tabs: Vec<Tab>) -> Self {
        Self {
            tabs: RefCell::new(tabs),
            windows: Vec::new(),
            removed: RefCell::new(Vec::new()),
        }
    }
}

impl BrowserDriver for FakeDriver {
    fn query_tabs(&self) -> Result<Vec<Tab>, tabrules_core::error::DriverError> {
        Ok(self.tabs.borrow().clone())
    }

    fn query_windows(&self) -> Result<Vec<Window>, tabrules_core::error::DriverError> {
        Ok(self.windows.clone())
    }

    fn remove_tabs(&self, ids: &[TabId]) -> Result<(), tabrules_core::error::DriverError> {
        self.tabs.borrow_mut().retain(|t| !ids.contains(&t.id));
        self.removed.borrow_mut().extend_from_slice(ids);
        Ok(())
    }

    fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<(), tabrules_core::error::DriverError> {
        let mut tabs = self.tabs.borrow_mut();
        let Some(tab) = tabs.iter_mut().find(|t| t.id == id) else {
            return Err(tabrules_core::error::DriverError::TabNotFound(id));
        };
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

    fn move_tabs(&self, ids: &[TabId], target: MoveTarget) -> Result<(), tabrules_core::error::DriverError> {
        let mut tabs = self.tabs.borrow_mut();
        for tab in tabs.iter_mut().filter(|t| ids.contains(&t.id)) {
            tab.window_id = target.window_id;
        }
        Ok(())
    }

    fn discard_tab(&self, id: TabId) -> Result<(), tabrules_core::error::DriverError> {
        let mut tabs = self.tabs.borrow_mut();
        let Some(tab) = tabs.iter_mut().find(|t| t.id == id) else {
            return Err(tabrules_core::error::DriverError::TabNotFound(id));
        };
        tab.discarded = true;
        Ok(())
    }

    fn group_tabs(&self, ids: &[TabId], existing_group: Option<GroupId>) -> Result<GroupId, tabrules_core::error::DriverError> {
        let group_id = existing_group.unwrap_or(GroupId::new(99));
        let mut tabs = self.tabs.borrow_mut();
        for tab in tabs.iter_mut().filter(|t| ids.contains(&t.id)) {
            tab.group_id = group_id;
        }
        Ok(group_id)
    }

    fn update_group(&self, _id: GroupId, _update: GroupUpdate) -> Result<(), tabrules_core::error::DriverError> {
        Ok(())
    }

    fn find_group_by_title(&self, _window_id: WindowId, _title: &str) -> Result<Option<GroupId>, tabrules_core::error::DriverError> {
        Ok(None)
    }

    fn create_bookmark(&self, _request: BookmarkRequest) -> Result<(), tabrules_core::error::DriverError> {
        Ok(())
    }

    fn find_or_create_folder(&self, _title: &str, _create_if_missing: bool) -> Result<Option<String>, tabrules_core::error::DriverError> {
        Ok(Some("folder-1".to_string()))
    }

    fn create_window(&self, _url: Option<&str>) -> Result<Window, tabrules_core::error::DriverError> {
        Ok(Window {
            id: WindowId::new(1),
            focused: true,
            incognito: false,
            tab_ids: Vec::new(),
        })
    }
}

#[derive(Default)]
pub struct FakeKv {
    data: RefCell<HashMap<String, serde_json::Value>>,
}

impl KvStore for FakeKv {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, tabrules_core::error::StorageError> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), tabrules_core::error::StorageError> {
        self.data.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), tabrules_core::error::StorageError> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }
}

pub struct FakeRuleStore {
    rules: Vec<Rule>,
}

impl FakeRuleStore {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl RuleStore for FakeRuleStore {
    fn list_rules(&self) -> Result<Vec<Rule>, tabrules_core::error::StorageError> {
        Ok(self.rules.clone())
    }

    fn get_rule(&self, id: &RuleId) -> Result<Option<Rule>, tabrules_core::error::StorageError> {
        Ok(self.rules.iter().find(|r| &r.id == id).cloned())
    }
}

pub fn tab(id: i64, url: &str, created_at: i64) -> Tab {
    Tab {
        id: TabId::new(id),
        window_id: WindowId::new(1),
        url: url.to_string(),
        title: String::new(),
        pinned: false,
        active: false,
        audible: false,
        muted: false,
        discarded: false,
        group_id: GroupId::default(),
        index: 0,
        last_accessed: None,
        created_at,
    }
}
