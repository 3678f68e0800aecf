// tabrules-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Key-Value Store
// Description: Durable SqliteStore backed by SQLite WAL, implementing both
//              `KvStore` (the engine's generic collaborator contract) and
//              `TriggerStore` (the scheduler's persisted one-shot triggers).
// Purpose: Give a host process a single durable backing store for
//          `scheduledTriggers` and `snoozedTabs` without hand-rolling its
//          own file format.
// Dependencies: rusqlite, serde_json, tabrules-core, tabrules-scheduler
// ============================================================================

//! ## Overview
//! Every row is one JSON-valued key: the same `scheduledTriggers` and
//! `snoozedTabs` arrays the in-memory [`tabrules_core::interfaces::KvStore`]
//! implementations hold, just durable across a process restart. A single
//! mutex-guarded connection serializes all access; the engine's install
//! rate for persisted triggers and snooze records is low enough that this is
//! the simplest correct option, not a bottleneck worth a writer/reader pool
//! split.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use tabrules_core::error::StorageError;
use tabrules_core::interfaces::KvStore;
use tabrules_core::model::RuleId;
use tabrules_scheduler::PersistedTrigger;
use tabrules_scheduler::SchedulerError;
use tabrules_scheduler::TriggerStore;
use tabrules_scheduler::trigger_store::SCHEDULED_TRIGGERS_KEY;

use crate::error::SqliteStoreError;

/// Maximum total store path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4_096;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Default busy timeout applied to the connection.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// Configuration for the `SQLite` key-value store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Durable `SQLite`-backed key-value store.
///
/// # Invariants
/// - Connection access is serialized through a mutex.
#[derive(Clone)]
pub struct SqliteStore {
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (creating if necessary) a `SQLite`-backed key-value store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the path is unsafe, the parent
    /// directory cannot be created, or the database cannot be opened or
    /// initialized.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Reads a raw JSON value by key.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the connection is poisoned, the query
    /// fails, or the stored text is not valid JSON.
    pub fn get_raw(&self, key: &str) -> Result<Option<serde_json::Value>, SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))?;
        let text: Option<String> = guard
            .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .map_err(|error| SqliteStoreError::Db(error.to_string()))?;
        let Some(text) = text else {
            return Ok(None);
        };
        serde_json::from_str(&text).map(Some).map_err(|error| SqliteStoreError::Invalid(error.to_string()))
    }

    /// Writes a raw JSON value by key, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the connection is poisoned or the
    /// write fails.
    pub fn set_raw(&self, key: &str, value: &serde_json::Value) -> Result<(), SqliteStoreError> {
        let text = serde_json::to_string(value).map_err(|error| SqliteStoreError::Invalid(error.to_string()))?;
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))?;
        guard
            .execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, text],
            )
            .map_err(|error| SqliteStoreError::Db(error.to_string()))?;
        Ok(())
    }

    /// Removes a key, if present.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the connection is poisoned or the
    /// delete fails.
    pub fn remove_raw(&self, key: &str) -> Result<(), SqliteStoreError> {
        let guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))?;
        guard
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .map_err(|error| SqliteStoreError::Db(error.to_string()))?;
        Ok(())
    }

    /// Loads the full persisted-trigger array, defaulting to empty.
    fn load_triggers(&self) -> Result<Vec<PersistedTrigger>, SqliteStoreError> {
        let Some(value) = self.get_raw(SCHEDULED_TRIGGERS_KEY)? else {
            return Ok(Vec::new());
        };
        serde_json::from_value(value).map_err(|error| SqliteStoreError::Invalid(error.to_string()))
    }

    /// Writes the full persisted-trigger array.
    fn write_triggers(&self, triggers: &[PersistedTrigger]) -> Result<(), SqliteStoreError> {
        let value = serde_json::to_value(triggers).map_err(|error| SqliteStoreError::Invalid(error.to_string()))?;
        self.set_raw(SCHEDULED_TRIGGERS_KEY, &value)
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        self.get_raw(key).map_err(|error| StorageError::ReadFailed {
            key: key.to_string(),
            message: error.to_string(),
        })
    }

    fn set(&self, key: &str, value: serde_json::Value) -> Result<(), StorageError> {
        self.set_raw(key, &value).map_err(|error| StorageError::WriteFailed {
            key: key.to_string(),
            message: error.to_string(),
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.remove_raw(key).map_err(|error| StorageError::WriteFailed {
            key: key.to_string(),
            message: error.to_string(),
        })
    }
}

impl TriggerStore for SqliteStore {
    fn load(&self) -> Result<Vec<PersistedTrigger>, SchedulerError> {
        self.load_triggers().map_err(|error| SchedulerError::StoreRead(error.to_string()))
    }

    fn save(&self, trigger: &PersistedTrigger) -> Result<(), SchedulerError> {
        let mut all = self.load_triggers().map_err(|error| SchedulerError::StoreRead(error.to_string()))?;
        all.retain(|existing| existing.rule_id != trigger.rule_id);
        all.push(trigger.clone());
        self.write_triggers(&all).map_err(|error| SchedulerError::StoreWrite(error.to_string()))
    }

    fn remove(&self, rule_id: &RuleId) -> Result<(), SchedulerError> {
        let mut all = self.load_triggers().map_err(|error| SchedulerError::StoreRead(error.to_string()))?;
        all.retain(|existing| &existing.rule_id != rule_id);
        self.write_triggers(&all).map_err(|error| SchedulerError::StoreWrite(error.to_string()))
    }
}

/// Creates the store's parent directory if it does not already exist.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|error| SqliteStoreError::Io(error.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid("store path contains an overlong component".to_string()));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid("store path must be a file, not a directory".to_string()));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable-by-default pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|error| SqliteStoreError::Db(error.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|error| SqliteStoreError::Db(error.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|error| SqliteStoreError::Db(error.to_string()))?;
    Ok(connection)
}

/// Creates the key-value table if it does not already exist.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .map_err(|error| SqliteStoreError::Db(error.to_string()))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn config_in(dir: &TempDir) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: dir.path().join("store.sqlite3"),
            busy_timeout_ms: 1_000,
            journal_mode: SqliteStoreMode::Wal,
        }
    }

    #[test]
    fn round_trips_a_raw_value() {
        let dir = TempDir::new().expect("tempdir");
        let store = SqliteStore::open(&config_in(&dir)).expect("open");
        store.set_raw("snoozedTabs", &serde_json::json!([{"tabId": 1}])).expect("set");
        let loaded = store.get_raw("snoozedTabs").expect("get");
        assert_eq!(loaded, Some(serde_json::json!([{"tabId": 1}])));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let dir = TempDir::new().expect("tempdir");
        let store = SqliteStore::open(&config_in(&dir)).expect("open");
        assert_eq!(store.get_raw("nope").expect("get"), None);
    }

    #[test]
    fn remove_drops_the_key() {
        let dir = TempDir::new().expect("tempdir");
        let store = SqliteStore::open(&config_in(&dir)).expect("open");
        store.set_raw("k", &serde_json::json!(1)).expect("set");
        store.remove_raw("k").expect("remove");
        assert_eq!(store.get_raw("k").expect("get"), None);
    }

    #[test]
    fn trigger_store_round_trips_and_replaces_same_rule() {
        let dir = TempDir::new().expect("tempdir");
        let store = SqliteStore::open(&config_in(&dir)).expect("open");
        store.save(&PersistedTrigger::once(RuleId::from("r1"), 1_000)).expect("save");
        store.save(&PersistedTrigger::once(RuleId::from("r1"), 2_000)).expect("save");
        store.save(&PersistedTrigger::once(RuleId::from("r2"), 3_000)).expect("save");
        let mut loaded = store.load().expect("load");
        loaded.sort_by(|a, b| a.rule_id.as_str().cmp(b.rule_id.as_str()));
        assert_eq!(
            loaded,
            vec![PersistedTrigger::once(RuleId::from("r1"), 2_000), PersistedTrigger::once(RuleId::from("r2"), 3_000)]
        );
    }

    #[test]
    fn trigger_store_survives_reopen() {
        let dir = TempDir::new().expect("tempdir");
        let config = config_in(&dir);
        {
            let store = SqliteStore::open(&config).expect("open");
            store.save(&PersistedTrigger::once(RuleId::from("r1"), 5_000)).expect("save");
        }
        let reopened = SqliteStore::open(&config).expect("reopen");
        assert_eq!(reopened.load().expect("load"), vec![PersistedTrigger::once(RuleId::from("r1"), 5_000)]);
    }

    #[test]
    fn remove_rule_drops_only_that_rule() {
        let dir = TempDir::new().expect("tempdir");
        let store = SqliteStore::open(&config_in(&dir)).expect("open");
        store.save(&PersistedTrigger::once(RuleId::from("r1"), 1_000)).expect("save");
        store.save(&PersistedTrigger::once(RuleId::from("r2"), 2_000)).expect("save");
        TriggerStore::remove(&store, &RuleId::from("r1")).expect("remove");
        assert_eq!(store.load().expect("load"), vec![PersistedTrigger::once(RuleId::from("r2"), 2_000)]);
    }

    #[test]
    fn rejects_a_directory_as_store_path() {
        let dir = TempDir::new().expect("tempdir");
        let config = SqliteStoreConfig {
            path: dir.path().to_path_buf(),
            busy_timeout_ms: 1_000,
            journal_mode: SqliteStoreMode::Wal,
        };
        let error = SqliteStore::open(&config).expect_err("directory path must be rejected");
        assert!(matches!(error, SqliteStoreError::Invalid(_)));
    }
}
