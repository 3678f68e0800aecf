// tabrules-scheduler/src/scheduler.rs
// ============================================================================
// Module: Trigger Scheduler
// Description: Single-threaded cooperative dispatcher for immediate/repeat/
//              once triggers, driving `tabrules_core::orchestrator::run_rule`.
// Purpose: Own the timer table; the host never calls `run_rule` directly
//          once a rule has a non-`on_action` trigger installed.
// Dependencies: tabrules-core, tokio::{sync,time,task}
// ============================================================================

//! ## Overview
//! A registry of per-rule timer handles keyed by [`RuleId`], one
//! `tokio::spawn`'d task per installed trigger. Firings are
//! fire-and-forget from the scheduler's perspective: the scheduler spawns a
//! task that calls `run_rule` and records the result, then moves on. No two
//! concurrent runs of the same rule: a firing that lands while that rule is
//! already running is dropped (coalesced into the in-progress run).
//!
//! The scheduler holds its collaborators as `Arc<dyn Trait + Send + Sync>`:
//! driver/store/kv calls happen inside spawned tasks, so the trait objects
//! must cross task boundaries.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use tabrules_core::interfaces::BrowserDriver;
use tabrules_core::interfaces::KvStore;
use tabrules_core::interfaces::RuleStore;
use tabrules_core::model::RuleId;
use tabrules_core::model::RunOptions;
use tabrules_core::model::TimestampMs;
use tabrules_core::model::Trigger;
use tabrules_core::orchestrator;
use tabrules_core::EngineError;
use tabrules_core::RuleRunResult;
use tokio::task::JoinHandle;

use crate::trigger_store::PersistedTrigger;
use crate::trigger_store::TriggerStore;

/// The outcome of the most recent run of a rule, kept for inspection by the
/// host (tests and `tabrules-cli` read this rather than awaiting a firing).
pub type RunLog = Arc<Mutex<HashMap<RuleId, Result<RuleRunResult, EngineError>>>>;

/// Returns the current wall-clock time in milliseconds since the epoch.
///
/// Isolated behind a function (rather than inlined `SystemTime::now()` calls)
/// so every absolute-time comparison in this module goes through one place.
#[allow(
    clippy::cast_possible_truncation,
    reason = "millisecond epoch time fits in i64 until year 292278994"
)]
fn now_ms() -> TimestampMs {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as TimestampMs
}

/// Default debounce window for `immediate` triggers that don't override it.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2_000;

/// The live timer handles installed for one rule; at most one of each kind.
struct RuleTimers {
    /// The in-flight debounce timer for an `immediate` trigger, if any.
    debounce: Option<JoinHandle<()>>,
    /// The repeating-interval task for a `repeat` trigger, if any.
    repeat: Option<JoinHandle<()>>,
    /// The pending-fire task for a `once` trigger, if any.
    once: Option<JoinHandle<()>>,
}

impl RuleTimers {
    /// Returns a timer set with no installed timers.
    const fn empty() -> Self {
        Self {
            debounce: None,
            repeat: None,
            once: None,
        }
    }

    /// Aborts and clears every installed timer.
    fn abort_all(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
        if let Some(handle) = self.repeat.take() {
            handle.abort();
        }
        if let Some(handle) = self.once.take() {
            handle.abort();
        }
    }
}

/// Shared collaborators a fired trigger needs to run its rule.
struct Collaborators {
    /// Browser driver queried and mutated by each run.
    driver: Arc<dyn BrowserDriver + Send + Sync>,
    /// Key-value store for snooze records (and, indirectly, triggers).
    kv: Arc<dyn KvStore + Send + Sync>,
    /// Rule definitions, owned by the collaborator.
    rules: Arc<dyn RuleStore + Send + Sync>,
    /// Persistence for `once` triggers.
    trigger_store: Arc<dyn TriggerStore>,
    /// Domain-to-category map passed through to every run's index builder.
    categories: HashMap<String, String>,
}

/// Single-threaded cooperative trigger scheduler.
///
/// Cloning is cheap: every field is an `Arc`, so a clone shares the same
/// timer table and run log as the original.
#[derive(Clone)]
pub struct Scheduler {
    /// Driver/store/kv handles shared by every firing.
    collaborators: Arc<Collaborators>,
    /// Installed timer handles, keyed by rule id.
    timers: Arc<Mutex<HashMap<RuleId, RuleTimers>>>,
    /// Rule ids with a run currently in flight; used to coalesce firings.
    running: Arc<Mutex<std::collections::HashSet<RuleId>>>,
    /// Most recent run result per rule id.
    run_log: RunLog,
    /// The periodic snoozed-tab restoration sweep, if started.
    snooze_sweep: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Scheduler {
    /// Builds a scheduler over the given collaborators. `categories` is the
    /// engine's domain-to-category map, passed through to every run.
    #[must_use]
    pub fn new(
        driver: Arc<dyn BrowserDriver + Send + Sync>,
        kv: Arc<dyn KvStore + Send + Sync>,
        rules: Arc<dyn RuleStore + Send + Sync>,
        trigger_store: Arc<dyn TriggerStore>,
        categories: HashMap<String, String>,
    ) -> Self {
        Self {
            collaborators: Arc::new(Collaborators {
                driver,
                kv,
                rules,
                trigger_store,
                categories,
            }),
            timers: Arc::new(Mutex::new(HashMap::new())),
            running: Arc::new(Mutex::new(std::collections::HashSet::new())),
            run_log: Arc::new(Mutex::new(HashMap::new())),
            snooze_sweep: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the most recent run result recorded for `rule_id`, if any.
    #[must_use]
    pub fn last_result(&self, rule_id: &RuleId) -> Option<Result<RuleRunResult, EngineError>> {
        self.run_log.lock().unwrap_or_else(std::sync::PoisonError::into_inner).get(rule_id).cloned()
    }

    /// Loads persisted `once` triggers and installs timers for each,
    /// per §4.5's restart contract: triggers with `time <= now` are
    /// scheduled for immediate ("next tick") firing; later ones get a
    /// timer for `time - now`. Must be called once at process start before
    /// any other install method.
    pub async fn init(&self) {
        let persisted = match self.collaborators.trigger_store.load() {
            Ok(triggers) => triggers,
            Err(error) => {
                tracing::warn!(%error, "failed to load persisted triggers; starting with none");
                Vec::new()
            }
        };
        let now = now_ms();
        for trigger in persisted {
            self.install_once_timer(trigger.rule_id, trigger.time, now);
        }
    }

    /// Coalesces calls to `scheduleImmediate`: resets the debounce timer for
    /// `rule_id` to fire `debounce_ms` (or the engine default) from now.
    pub fn schedule_immediate(&self, rule_id: RuleId, debounce_ms: Option<u64>) {
        let delay = std::time::Duration::from_millis(debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS));
        let scheduler = self.clone();
        let fire_id = rule_id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scheduler.fire(&fire_id).await;
        });
        self.replace_timer(rule_id, |timers| timers.debounce.replace(handle));
    }

    /// Installs a repeating trigger: fires immediately, then every
    /// `interval_ms` until cancelled.
    pub fn install_repeat(&self, rule_id: RuleId, interval_ms: u64) {
        let interval = std::time::Duration::from_millis(interval_ms.max(1));
        let scheduler = self.clone();
        let fire_id = rule_id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // `interval` ticks once immediately, matching "fires immediately
            // on install and every interval thereafter".
            loop {
                ticker.tick().await;
                scheduler.fire(&fire_id).await;
            }
        });
        self.replace_timer(rule_id, |timers| timers.repeat.replace(handle));
    }

    /// Schedules a one-shot firing at `at_ms`, persisting the trigger so it
    /// survives a process restart.
    pub fn schedule_once(&self, rule_id: RuleId, at_ms: TimestampMs) {
        if let Err(error) = self.collaborators.trigger_store.save(&PersistedTrigger::once(rule_id.clone(), at_ms)) {
            tracing::warn!(%error, rule_id = %rule_id, "failed to persist once trigger; it will not survive a restart");
        }
        let now = now_ms();
        self.install_once_timer(rule_id, at_ms, now);
    }

    /// Installs the pending-fire task for a `once` trigger due at `at_ms`,
    /// computing the delay from `now`. A trigger already due fires on the
    /// next tick (zero delay) rather than being skipped.
    fn install_once_timer(&self, rule_id: RuleId, at_ms: TimestampMs, now: TimestampMs) {
        let delay_ms = (at_ms - now).max(0);
        #[allow(
            clippy::cast_sign_loss,
            reason = "delay_ms is clamped non-negative immediately above"
        )]
        let delay = std::time::Duration::from_millis(delay_ms as u64);
        let scheduler = self.clone();
        let fire_id = rule_id.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            scheduler.fire(&fire_id).await;
            if let Err(error) = scheduler.collaborators.trigger_store.remove(&fire_id) {
                tracing::warn!(%error, rule_id = %fire_id, "failed to remove fired once trigger from persistence");
            }
        });
        self.replace_timer(rule_id, |timers| timers.once.replace(handle));
    }

    /// Replaces one timer slot (debounce/repeat/once) for `rule_id`,
    /// creating its timer-set entry if this is the rule's first timer.
    /// Aborts whatever handle `install` displaces so a rescheduled rule
    /// never leaves its previous timer task running in the background.
    fn replace_timer(&self, rule_id: RuleId, install: impl FnOnce(&mut RuleTimers) -> Option<JoinHandle<()>>) {
        let mut timers = self.timers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let entry = timers.entry(rule_id).or_insert_with(RuleTimers::empty);
        if let Some(previous) = install(entry) {
            previous.abort();
        }
    }

    /// Installs the trigger declared on `trigger` for `rule_id`. `on_action`
    /// installs no timer.
    pub fn install(&self, rule_id: RuleId, trigger: &Trigger) {
        match trigger {
            Trigger::Immediate { debounce_ms } => self.schedule_immediate(rule_id, *debounce_ms),
            Trigger::Repeat { interval_ms } => self.install_repeat(rule_id, *interval_ms),
            Trigger::Once { at_ms } => self.schedule_once(rule_id, *at_ms),
            Trigger::OnAction => {}
        }
    }

    /// Cancels every timer for `rule_id` and purges any pending persisted
    /// one-shot for it. Idempotent.
    pub fn remove_rule(&self, rule_id: &RuleId) {
        if let Some(mut timers) = self.timers.lock().unwrap_or_else(std::sync::PoisonError::into_inner).remove(rule_id) {
            timers.abort_all();
        }
        if let Err(error) = self.collaborators.trigger_store.remove(rule_id) {
            tracing::warn!(%error, rule_id = %rule_id, "failed to purge persisted once trigger on rule removal");
        }
    }

    /// Cancels every timer for every rule and stops the snooze sweep.
    /// Idempotent.
    pub fn stop_all(&self) {
        let mut timers = self.timers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for (_, mut rule_timers) in timers.drain() {
            rule_timers.abort_all();
        }
        drop(timers);
        self.stop_snooze_sweep();
    }

    /// Starts the periodic snoozed-tab restoration sweep: every
    /// `interval_ms`, restores every wake record whose `wakeAt <= now` and
    /// removes it from the store. Calling this twice replaces the previous
    /// sweep task.
    pub fn start_snooze_sweep(&self, interval_ms: u64) {
        let interval = std::time::Duration::from_millis(interval_ms.max(1));
        let collaborators = Arc::clone(&self.collaborators);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let driver = Arc::clone(&collaborators.driver);
                let kv = Arc::clone(&collaborators.kv);
                let (restored, errors) = tokio::task::spawn_blocking(move || {
                    tabrules_core::action::sweep_snoozed_tabs(driver.as_ref(), kv.as_ref(), now_ms())
                })
                .await
                .unwrap_or_else(|join_error| {
                    tracing::warn!(%join_error, "snooze sweep task panicked");
                    (0, Vec::new())
                });
                for error in &errors {
                    let message = &error.message;
                    tracing::warn!(%message, "snooze sweep failed to restore a wake record");
                }
                if restored > 0 {
                    tracing::debug!(restored, "snooze sweep restored due wake records");
                }
            }
        });
        let mut sweep = self.snooze_sweep.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = sweep.replace(handle) {
            previous.abort();
        }
    }

    /// Stops the periodic snooze sweep, if running. Idempotent.
    pub fn stop_snooze_sweep(&self) {
        if let Some(handle) = self.snooze_sweep.lock().unwrap_or_else(std::sync::PoisonError::into_inner).take() {
            handle.abort();
        }
    }

    /// Forces a rule run regardless of installed triggers, bypassing the
    /// `enabled` gate and any debounce window. Returns once the run
    /// completes (unlike timer-driven firings, which are fire-and-forget).
    pub async fn run_forced(&self, rule_id: &RuleId, dry_run: bool) -> Result<RuleRunResult, EngineError> {
        let collaborators = Arc::clone(&self.collaborators);
        let rule_id = rule_id.clone();
        let options = RunOptions {
            force_execution: true,
            dry_run,
        };
        tokio::task::spawn_blocking(move || {
            orchestrator::run_rule(
                &rule_id,
                collaborators.rules.as_ref(),
                collaborators.driver.as_ref(),
                collaborators.kv.as_ref(),
                &collaborators.categories,
                now_ms(),
                options,
            )
        })
        .await
        .unwrap_or_else(|join_error| {
            Err(EngineError::UnknownRule(format!("scheduler task panicked: {join_error}")))
        })
    }

    /// Runs `rule_id` against a fresh snapshot, or coalesces into an
    /// in-progress run of the same rule. Records the outcome in the run log.
    async fn fire(&self, rule_id: &RuleId) {
        {
            let mut running = self.running.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            if running.contains(rule_id) {
                tracing::debug!(rule_id = %rule_id, "trigger coalesced into in-progress run");
                return;
            }
            running.insert(rule_id.clone());
        }

        let collaborators = Arc::clone(&self.collaborators);
        let run_id = rule_id.clone();
        let result = tokio::task::spawn_blocking(move || {
            orchestrator::run_rule(
                &run_id,
                collaborators.rules.as_ref(),
                collaborators.driver.as_ref(),
                collaborators.kv.as_ref(),
                &collaborators.categories,
                now_ms(),
                RunOptions::default(),
            )
        })
        .await
        .unwrap_or_else(|join_error| Err(EngineError::UnknownRule(format!("scheduler task panicked: {join_error}"))));

        if let Err(ref error) = result {
            tracing::warn!(rule_id = %rule_id, %error, "rule run failed to start");
        }

        self.run_log.lock().unwrap_or_else(std::sync::PoisonError::into_inner).insert(rule_id.clone(), result);
        self.running.lock().unwrap_or_else(std::sync::PoisonError::into_inner).remove(rule_id);
    }
}
