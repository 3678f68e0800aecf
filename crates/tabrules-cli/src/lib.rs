// tabrules-cli/src/lib.rs
// ============================================================================
// Crate: tabrules-cli
// Description: Library surface for the `tabrules` binary: command handlers
//              over `tabrules-core`, plus in-memory fakes for demonstration
//              and tests.
// Purpose: Keep `main.rs` a thin `clap` dispatcher; command logic lives
//          here so integration tests call it directly.
// Dependencies: tabrules-core, tabrules-config
// ============================================================================

//! ## Overview
//! This crate is the host process for the engine: it supplies a
//! [`fakes::FakeBrowserDriver`]/[`fakes::FakeKvStore`] pair and calls
//! [`tabrules_core::orchestrator::run_rule`] /
//! [`tabrules_core::orchestrator::preview_rule`]. It never configures a
//! `tracing` subscriber itself — only [`main`](../bin/tabrules) does that.

pub mod fakes;
pub mod rule_store;

use std::path::Path;

use tabrules_config::EngineConfig;
use tabrules_core::interfaces::BrowserDriver;
use tabrules_core::interfaces::KvStore;
use tabrules_core::interfaces::RuleStore;
use tabrules_core::model::RuleId;
use tabrules_core::model::RunOptions;
use tabrules_core::orchestrator;
use tabrules_core::EngineError;
use tabrules_core::RuleRunResult;

use crate::rule_store::JsonRuleStore;

/// Returns the current wall-clock time in milliseconds since the epoch.
#[allow(
    clippy::cast_possible_truncation,
    reason = "millisecond epoch time fits in i64 until year 292278994"
)]
#[must_use]
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Loads the engine config from `path` (or the engine default when `None`),
/// reporting a human-readable message on failure.
///
/// # Errors
/// Returns the config error's display message.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    EngineConfig::load(path).map_err(|error| error.to_string())
}

/// Loads rules from a JSON file at `rules_path`.
///
/// # Errors
/// Returns the store error's display message.
pub fn load_rule_store(rules_path: &Path) -> Result<JsonRuleStore, String> {
    rule_store::validate_rules_path(rules_path)?;
    JsonRuleStore::load(rules_path).map_err(|error| error.to_string())
}

/// Runs one rule for real (driver mutations take effect).
///
/// # Errors
/// Returns `Err` only when the run could not start at all; see
/// [`tabrules_core::orchestrator::run_rule`].
pub fn run_one(
    rule_id: &str,
    rules: &dyn RuleStore,
    driver: &dyn BrowserDriver,
    kv: &dyn KvStore,
    config: &EngineConfig,
) -> Result<RuleRunResult, EngineError> {
    orchestrator::run_rule(
        &RuleId::from(rule_id),
        rules,
        driver,
        kv,
        &config.categories,
        now_ms(),
        RunOptions::default(),
    )
}

/// Previews one rule (no driver mutations; forces execution regardless of
/// `enabled`/trigger).
///
/// # Errors
/// Returns `Err` only when the run could not start at all.
pub fn preview_one(
    rule_id: &str,
    rules: &dyn RuleStore,
    driver: &dyn BrowserDriver,
    kv: &dyn KvStore,
    config: &EngineConfig,
) -> Result<RuleRunResult, EngineError> {
    orchestrator::preview_rule(&RuleId::from(rule_id), rules, driver, kv, &config.categories, now_ms())
}

/// Lists every rule's id, name, and enabled state, in store order.
///
/// # Errors
/// Returns the store error's display message.
pub fn list_rules(rules: &dyn RuleStore) -> Result<Vec<(String, String, bool)>, String> {
    rules
        .list_rules()
        .map_err(|error| error.to_string())
        .map(|rules| rules.into_iter().map(|rule| (rule.id.to_string(), rule.name, rule.enabled)).collect())
}

#[cfg(test)]
mod tests {
    use super::fakes::FakeBrowserDriver;
    use super::fakes::FakeKvStore;
    use super::rule_store::JsonRuleStore;
    use super::*;
    use tabrules_core::model::ActionRecord;
    use tabrules_core::model::Rule;
    use tabrules_core::model::RuleFlags;
    use tabrules_core::model::Trigger;
    use tabrules_core::predicate::condition::Condition;

    fn sample_rule(id: &str) -> Rule {
        Rule {
            id: RuleId::from(id),
            name: "Pin everything".to_string(),
            enabled: true,
            when: Condition::MatchAll,
            then: vec![ActionRecord {
                action: "pin".to_string(),
                params: serde_json::Map::new(),
            }],
            trigger: Trigger::OnAction,
            flags: RuleFlags::default(),
        }
    }

    #[test]
    fn run_one_pins_every_matched_tab() {
        let driver = FakeBrowserDriver::new();
        driver.seed_window(&[("https://a.example", "A"), ("https://b.example", "B")], 1_000);
        let kv = FakeKvStore::new();
        let rules = JsonRuleStore::from_rules(vec![sample_rule("pin-all")]);
        let config = EngineConfig::default();

        let result = run_one("pin-all", &rules, &driver, &kv, &config).expect("run");
        assert_eq!(result.total_matches, 2);
        assert!(result.actions.iter().all(|action| action.success));

        let tabs = driver.query_tabs().expect("query");
        assert!(tabs.iter().all(|tab| tab.pinned));
    }

    #[test]
    fn preview_one_never_mutates_the_driver() {
        let driver = FakeBrowserDriver::new();
        driver.seed_window(&[("https://a.example", "A")], 1_000);
        let kv = FakeKvStore::new();
        let mut rule = sample_rule("pin-preview");
        rule.enabled = false;
        let rules = JsonRuleStore::from_rules(vec![rule]);
        let config = EngineConfig::default();

        let result = preview_one("pin-preview", &rules, &driver, &kv, &config).expect("preview");
        assert_eq!(result.total_matches, 1);
        assert!(result.actions.iter().all(|action| action.dry_run));

        let tabs = driver.query_tabs().expect("query");
        assert!(!tabs[0].pinned);
    }

    #[test]
    fn list_rules_reports_id_name_and_enabled_state() {
        let rules = JsonRuleStore::from_rules(vec![sample_rule("r1")]);
        let listed = list_rules(&rules).expect("list");
        assert_eq!(listed, vec![("r1".to_string(), "Pin everything".to_string(), true)]);
    }
}
