// tabrules-store-sqlite/src/lib.rs
// ============================================================================
// Crate: tabrules-store-sqlite
// Description: SQLite-backed `KvStore`/`TriggerStore` for one-shot scheduler
//              triggers and snoozed-tab wake records.
// Purpose: Give a host process a durable collaborator implementation
//          without hand-rolling file persistence.
// Dependencies: rusqlite, tabrules-core, tabrules-scheduler
// ============================================================================

//! ## Overview
//! [`SqliteStore`] is the one durable collaborator a host process needs to
//! wire in: it implements both [`tabrules_core::interfaces::KvStore`] (the
//! engine's generic store contract) and
//! [`tabrules_scheduler::TriggerStore`] (the scheduler's persisted one-shot
//! triggers) over the same `SQLite` file, so `scheduledTriggers` and
//! `snoozedTabs` survive a process restart together.

pub mod error;
pub mod store;

pub use error::SqliteStoreError;
pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreMode;
