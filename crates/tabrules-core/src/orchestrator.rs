// tabrules-core/src/orchestrator.rs
// ============================================================================
// Module: Orchestrator
// Description: Glues index building, predicate compilation, selection,
//              validation, and dispatch into one rule run.
// Purpose: The single entry point a scheduler or CLI calls to execute a
//          rule against a fresh snapshot.
// Dependencies: crate::{index,predicate,selector,action,interfaces,model,error}
// ============================================================================

//! ## Overview
//! The orchestrator is generic over the driver/store traits rather than
//! tied to one backend, and `run_rule` returns `Err` only for setup
//! failures that prevent a run from starting at all (unknown rule, rule
//! store failure) — everything that goes wrong *during* a run becomes data
//! in [`crate::model::RuleRunResult`].

use std::collections::HashMap;

use tracing::info_span;

use crate::action;
use crate::error::EngineError;
use crate::error::RunError;
use crate::error::StorageError;
use crate::index::build_indices;
use crate::interfaces::BrowserDriver;
use crate::interfaces::KvStore;
use crate::interfaces::RuleStore;
use crate::model::RuleId;
use crate::model::RuleRunResult;
use crate::model::RunOptions;
use crate::model::TimestampMs;
use crate::predicate;

/// Runs one rule against a freshly queried snapshot.
///
/// Returns `Err` only when the run could not even start (unknown rule id,
/// or the rule/driver store itself failed); everything that fails once the
/// run is underway is captured in the returned [`RuleRunResult`].
pub fn run_rule(
    rule_id: &RuleId,
    rules: &dyn RuleStore,
    driver: &dyn BrowserDriver,
    kv: &dyn KvStore,
    categories: &HashMap<String, String>,
    now: TimestampMs,
    options: RunOptions,
) -> Result<RuleRunResult, EngineError> {
    let rule = rules
        .get_rule(rule_id)
        .map_err(EngineError::Store)?
        .ok_or_else(|| EngineError::UnknownRule(rule_id.to_string()))?;

    let span = info_span!("rule_run", rule_id = %rule.id);
    let _guard = span.enter();

    if !rule.enabled && !options.force_execution {
        tracing::debug!("rule disabled and not force-executed; skipping");
        return Ok(RuleRunResult::new(Vec::new(), Vec::new(), Vec::new(), 0));
    }

    let start = now;
    let tabs = driver.query_tabs().map_err(|error| {
        tracing::warn!(%error, "failed to query tabs");
        EngineError::Store(StorageError::ReadFailed {
            key: "tabs".to_string(),
            message: error.to_string(),
        })
    })?;
    let windows = driver.query_windows().unwrap_or_default();

    let (enriched, indices) = build_indices(&tabs, &windows, categories, now);
    let requirement = predicate::compile(&rule.when);

    let matched = crate::selector::select(&enriched, &indices, now, &rule.when, &requirement, rule.flags);

    let (sorted_actions, conflicts) = action::sort_and_validate(&rule.then);
    let mut errors: Vec<RunError> = conflicts
        .iter()
        .map(|c| RunError::rule_wide("validate", c.to_string()))
        .collect();

    let (action_results, dispatch_errors) =
        action::dispatch(&sorted_actions, &matched, driver, kv, now, options.dry_run);
    errors.extend(dispatch_errors);

    let matches = matched.iter().map(|tab| tab.tab.id).collect();
    let duration_ms = (now - start).max(0) as u64;

    tracing::debug!(matches = matched.len(), actions = action_results.len(), "rule run complete");

    Ok(RuleRunResult::new(matches, action_results, errors, duration_ms))
}

/// Runs several rules sequentially, in the supplied order, aggregating
/// their results. There is no parallelism across rules in one batch: each
/// rule's actions must land before the next rule's selector runs.
pub fn run_rules(
    rule_ids: &[RuleId],
    rules: &dyn RuleStore,
    driver: &dyn BrowserDriver,
    kv: &dyn KvStore,
    categories: &HashMap<String, String>,
    now: TimestampMs,
    options: RunOptions,
) -> Vec<(RuleId, Result<RuleRunResult, EngineError>)> {
    rule_ids
        .iter()
        .map(|id| (id.clone(), run_rule(id, rules, driver, kv, categories, now, options)))
        .collect()
}

/// Computes a preview (matches + proposed actions) without ever enabling
/// driver mutations.
pub fn preview_rule(
    rule_id: &RuleId,
    rules: &dyn RuleStore,
    driver: &dyn BrowserDriver,
    kv: &dyn KvStore,
    categories: &HashMap<String, String>,
    now: TimestampMs,
) -> Result<RuleRunResult, EngineError> {
    run_rule(
        rule_id,
        rules,
        driver,
        kv,
        categories,
        now,
        RunOptions {
            force_execution: true,
            dry_run: true,
        },
    )
}

