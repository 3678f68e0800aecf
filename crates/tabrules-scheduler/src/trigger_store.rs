// tabrules-scheduler/src/trigger_store.rs
// ============================================================================
// Module: Trigger Persistence
// Description: Durable record for `once` triggers, backed by the engine's
//              `KvStore` under the `scheduledTriggers` key.
// Purpose: Survive process restart with no trigger lost and none
//          double-fired.
// Dependencies: tabrules_core::interfaces::KvStore, serde_json
// ============================================================================

//! ## Overview
//! [`KvTriggerStore`] reads and rewrites the whole `scheduledTriggers` array
//! on every mutation; install rates for one-shot triggers are low enough
//! that a read-modify-write is the simplest correct option, rather than
//! maintaining an in-memory index of its own.

use serde::Deserialize;
use serde::Serialize;
use tabrules_core::interfaces::KvStore;
use tabrules_core::model::RuleId;
use tabrules_core::model::TimestampMs;

use crate::error::SchedulerError;

/// The KV key the engine reserves for persisted one-shot triggers.
pub const SCHEDULED_TRIGGERS_KEY: &str = "scheduledTriggers";

/// One persisted one-shot trigger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTrigger {
    /// The rule this trigger belongs to.
    #[serde(rename = "ruleId")]
    pub rule_id: RuleId,
    /// Absolute fire time, ms since epoch.
    pub time: TimestampMs,
    /// Always `"once"`; kept as a field for forward compatibility with
    /// other persisted trigger kinds.
    #[serde(rename = "type")]
    pub kind: String,
}

impl PersistedTrigger {
    /// Builds a `once`-kind persisted trigger for `rule_id` firing at
    /// `time`.
    #[must_use]
    pub fn once(rule_id: RuleId, time: TimestampMs) -> Self {
        Self {
            rule_id,
            time,
            kind: "once".to_string(),
        }
    }
}

/// Durable storage for one-shot trigger records.
pub trait TriggerStore: Send + Sync {
    /// Returns every persisted one-shot trigger.
    fn load(&self) -> Result<Vec<PersistedTrigger>, SchedulerError>;

    /// Persists a one-shot trigger for `rule_id`, replacing any existing
    /// one for the same rule.
    fn save(&self, trigger: &PersistedTrigger) -> Result<(), SchedulerError>;

    /// Removes the persisted one-shot trigger for `rule_id`, if any.
    fn remove(&self, rule_id: &RuleId) -> Result<(), SchedulerError>;
}

/// [`TriggerStore`] backed by a collaborator-supplied [`KvStore`].
pub struct KvTriggerStore<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> KvTriggerStore<'a> {
    /// Wraps `kv` as a [`TriggerStore`].
    #[must_use]
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    fn read_all(&self) -> Result<Vec<PersistedTrigger>, SchedulerError> {
        let value = self
            .kv
            .get(SCHEDULED_TRIGGERS_KEY)
            .map_err(|error| SchedulerError::StoreRead(error.to_string()))?;
        let Some(value) = value else {
            return Ok(Vec::new());
        };
        serde_json::from_value(value).map_err(|error| SchedulerError::Malformed(error.to_string()))
    }

    fn write_all(&self, triggers: &[PersistedTrigger]) -> Result<(), SchedulerError> {
        let value = serde_json::to_value(triggers).map_err(|error| SchedulerError::Malformed(error.to_string()))?;
        self.kv
            .set(SCHEDULED_TRIGGERS_KEY, value)
            .map_err(|error| SchedulerError::StoreWrite(error.to_string()))
    }
}

impl TriggerStore for KvTriggerStore<'_> {
    fn load(&self) -> Result<Vec<PersistedTrigger>, SchedulerError> {
        self.read_all()
    }

    fn save(&self, trigger: &PersistedTrigger) -> Result<(), SchedulerError> {
        let mut all = self.read_all()?;
        all.retain(|existing| existing.rule_id != trigger.rule_id);
        all.push(trigger.clone());
        self.write_all(&all)
    }

    fn remove(&self, rule_id: &RuleId) -> Result<(), SchedulerError> {
        let mut all = self.read_all()?;
        all.retain(|existing| &existing.rule_id != rule_id);
        self.write_all(&all)
    }
}
