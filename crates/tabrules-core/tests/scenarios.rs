// tabrules-core/tests/scenarios.rs
// ============================================================================
// Integration tests: end-to-end rule runs against a fake driver, covering
// representative matching, dedup, and action-dispatch scenarios.
// ============================================================================

mod common;

use common::tab;
use common::FakeDriver;
use common::FakeKv;
use common::FakeRuleStore;
use tabrules_core::model::ActionRecord;
use tabrules_core::model::Rule;
use tabrules_core::model::RuleFlags;
use tabrules_core::model::RuleId;
use tabrules_core::model::RunOptions;
use tabrules_core::model::Trigger;

fn close_duplicates_rule(keep: &str) -> Rule {
    let mut params = serde_json::Map::new();
    params.insert("keep".to_string(), serde_json::Value::String(keep.to_string()));
    Rule {
        id: RuleId::new("dedupe"),
        name: "Dedupe".to_string(),
        enabled: true,
        when: serde_json::from_value(serde_json::json!({})).unwrap(),
        then: vec![ActionRecord {
            action: "close-duplicates".to_string(),
            params,
        }],
        trigger: Trigger::OnAction,
        flags: RuleFlags::default(),
    }
}

#[test]
fn scenario_a_distinct_youtube_videos_are_preserved() {
    let tabs = vec![
        tab(1, "https://www.youtube.com/watch?v=abc123", 100),
        tab(2, "https://www.youtube.com/watch?v=xyz789", 200),
    ];
    let driver = FakeDriver::new(tabs);
    let kv = FakeKv::default();
    let store = FakeRuleStore::new(vec![close_duplicates_rule("oldest")]);

    let result = tabrules_core::run_rule(
        &RuleId::new("dedupe"),
        &store,
        &driver,
        &kv,
        &Default::default(),
        1_000,
        RunOptions::default(),
    )
    .expect("run succeeds");

    assert_eq!(result.total_matches, 2);
    assert_eq!(result.total_actions, 0);
    assert!(driver.removed.borrow().is_empty());
}

#[test]
fn scenario_b_tracking_params_collapse_to_one_survivor() {
    let tabs = vec![
        tab(1, "https://ex.com/a", 100),
        tab(2, "https://ex.com/a?utm_source=t&fbclid=x", 200),
        tab(3, "https://ex.com/a?utm_campaign=s", 300),
    ];
    let driver = FakeDriver::new(tabs);
    let kv = FakeKv::default();
    let store = FakeRuleStore::new(vec![close_duplicates_rule("oldest")]);

    let result = tabrules_core::run_rule(
        &RuleId::new("dedupe"),
        &store,
        &driver,
        &kv,
        &Default::default(),
        1_000,
        RunOptions::default(),
    )
    .expect("run succeeds");

    assert_eq!(result.total_matches, 3);
    assert_eq!(result.total_actions, 2);
    let remaining: Vec<i64> = driver.tabs.borrow().iter().map(|t| t.id.raw()).collect();
    assert_eq!(remaining, vec![1]);
}

#[test]
fn scenario_c_distinct_search_queries_are_preserved() {
    let tabs = vec![
        tab(1, "https://www.google.com/search?q=cats", 100),
        tab(2, "https://www.google.com/search?q=dogs", 200),
    ];
    let driver = FakeDriver::new(tabs);
    let kv = FakeKv::default();
    let store = FakeRuleStore::new(vec![close_duplicates_rule("oldest")]);

    let result = tabrules_core::run_rule(
        &RuleId::new("dedupe"),
        &store,
        &driver,
        &kv,
        &Default::default(),
        1_000,
        RunOptions::default(),
    )
    .expect("run succeeds");

    assert_eq!(result.total_actions, 0);
    assert!(driver.removed.borrow().is_empty());
}

#[test]
fn dry_run_issues_zero_driver_mutations() {
    let tabs = vec![
        tab(1, "https://ex.com/a", 100),
        tab(2, "https://ex.com/a?utm_source=t", 200),
    ];
    let driver = FakeDriver::new(tabs);
    let kv = FakeKv::default();
    let store = FakeRuleStore::new(vec![close_duplicates_rule("oldest")]);

    let result = tabrules_core::run_rule(
        &RuleId::new("dedupe"),
        &store,
        &driver,
        &kv,
        &Default::default(),
        1_000,
        RunOptions {
            force_execution: false,
            dry_run: true,
        },
    )
    .expect("run succeeds");

    assert!(driver.removed.borrow().is_empty());
    assert!(result.actions.iter().all(|a| a.dry_run));
}

#[test]
fn force_execution_runs_a_disabled_rule() {
    let mut rule = close_duplicates_rule("oldest");
    rule.enabled = false;
    let tabs = vec![tab(1, "https://ex.com/a", 100), tab(2, "https://ex.com/a?utm_source=t", 200)];
    let driver = FakeDriver::new(tabs);
    let kv = FakeKv::default();
    let store = FakeRuleStore::new(vec![rule]);

    let disabled_result = tabrules_core::run_rule(
        &RuleId::new("dedupe"),
        &store,
        &driver,
        &kv,
        &Default::default(),
        1_000,
        RunOptions::default(),
    )
    .expect("run succeeds");
    assert_eq!(disabled_result.total_matches, 0);

    let forced_result = tabrules_core::run_rule(
        &RuleId::new("dedupe"),
        &store,
        &driver,
        &kv,
        &Default::default(),
        1_000,
        RunOptions {
            force_execution: true,
            dry_run: false,
        },
    )
    .expect("run succeeds");
    assert_eq!(forced_result.total_matches, 2);
    assert_eq!(forced_result.total_actions, 1);
}

#[test]
fn unknown_rule_id_is_an_engine_error() {
    let driver = FakeDriver::new(Vec::new());
    let kv = FakeKv::default();
    let store = FakeRuleStore::new(Vec::new());

    let result = tabrules_core::run_rule(
        &RuleId::new("missing"),
        &store,
        &driver,
        &kv,
        &Default::default(),
        0,
        RunOptions::default(),
    );
    assert!(result.is_err());
}
