// tabrules-scheduler/src/lib.rs
// ============================================================================
// Crate: tabrules-scheduler
// Description: Single-threaded cooperative trigger scheduler (immediate,
//              repeat, once) driving `tabrules_core::orchestrator::run_rule`.
// Purpose: Own rule timers and persisted one-shot triggers so a host
//          process never has to hand-roll its own timer table.
// Dependencies: tabrules-core, tokio
// ============================================================================

//! ## Overview
//! A rule's [`tabrules_core::model::Trigger`] describes *when* it should
//! run; this crate is what actually makes that happen. [`Scheduler::install`]
//! reads the trigger kind and installs the matching timer; firings are
//! fire-and-forget (the scheduler does not await a rule run's completion),
//! with the result recorded for later inspection via
//! [`Scheduler::last_result`]. [`Scheduler::start_snooze_sweep`] installs
//! the separate periodic task that restores due `snoozedTabs` wake records;
//! it runs independently of any rule's trigger.

pub mod error;
pub mod scheduler;
pub mod trigger_store;

pub use error::SchedulerError;
pub use scheduler::Scheduler;
pub use trigger_store::KvTriggerStore;
pub use trigger_store::PersistedTrigger;
pub use trigger_store::TriggerStore;
