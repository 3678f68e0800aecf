// tabrules-cli/tests/cli_run.rs
// ============================================================================
// Module: CLI Integration Tests
// Description: Exercises the library surface end-to-end: load a rules file
//              from disk, run/preview against the in-memory fakes.
// ============================================================================

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions and helpers are permitted.")]

use std::io::Write;

use tabrules_cli::fakes::FakeBrowserDriver;
use tabrules_cli::fakes::FakeKvStore;
use tabrules_cli::rule_store::JsonRuleStore;
use tabrules_config::EngineConfig;

const RULES_JSON: &str = r#"[
    {
        "id": "close-old-news",
        "name": "Close stale news tabs",
        "enabled": true,
        "when": { "gt": ["tab.age", "30m"] },
        "then": [ { "action": "close" } ],
        "trigger": { "kind": "on_action" }
    }
]"#;

fn write_rules_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(RULES_JSON.as_bytes()).expect("write rules");
    file
}

#[test]
fn run_closes_matching_tabs_loaded_from_a_json_file() {
    let rules_file = write_rules_file();
    let rules = JsonRuleStore::load(rules_file.path()).expect("load rules");

    let driver = FakeBrowserDriver::new();
    driver.seed_window(&[("https://news.example.com/a", "Old")], 0);
    let kv = FakeKvStore::new();
    let config = EngineConfig::default();

    let result = tabrules_cli::run_one("close-old-news", &rules, &driver, &kv, &config).expect("run");
    assert_eq!(result.total_matches, 1);
    assert!(result.actions[0].success);

    let remaining = tabrules_core::interfaces::BrowserDriver::query_tabs(&driver).expect("query");
    assert!(remaining.is_empty());
}

#[test]
fn preview_reports_matches_without_closing_anything() {
    let rules_file = write_rules_file();
    let rules = JsonRuleStore::load(rules_file.path()).expect("load rules");

    let driver = FakeBrowserDriver::new();
    driver.seed_window(&[("https://news.example.com/a", "Old")], 0);
    let kv = FakeKvStore::new();
    let config = EngineConfig::default();

    let result = tabrules_cli::preview_one("close-old-news", &rules, &driver, &kv, &config).expect("preview");
    assert_eq!(result.total_matches, 1);
    assert!(result.actions[0].dry_run);

    let remaining = tabrules_core::interfaces::BrowserDriver::query_tabs(&driver).expect("query");
    assert_eq!(remaining.len(), 1);
}

#[test]
fn list_rules_surfaces_the_loaded_rule() {
    let rules_file = write_rules_file();
    let rules = JsonRuleStore::load(rules_file.path()).expect("load rules");

    let listed = tabrules_cli::list_rules(&rules).expect("list");
    assert_eq!(listed, vec![("close-old-news".to_string(), "Close stale news tabs".to_string(), true)]);
}
