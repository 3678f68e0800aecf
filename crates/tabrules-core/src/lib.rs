// tabrules-core/src/lib.rs
// ============================================================================
// Crate: tabrules-core
// Description: Domain model, URL normalizer, index builder, predicate
//              compiler, selector, action validator/dispatcher, and
//              orchestrator for the tab-management rules engine.
// Purpose: The engine library a host process (scheduler, CLI, extension
//          background page) embeds; it never talks to a real browser.
// Dependencies: tabrules-logic, regex, serde, serde_json, thiserror, tracing,
//               url
// ============================================================================

//! ## Overview
//! `tabrules-core` is pure domain logic plus a handful of traits
//! (`BrowserDriver`, `KvStore`, `RuleStore`, see [`interfaces`]) that a host
//! process implements. The crate performs no I/O of its own beyond calling
//! those traits, and the compilation/selection/validation stages never
//! suspend — only the traits' driver/storage calls can.
//!
//! Data flows leaves-first: [`normalize`] → [`index`] → [`predicate`] →
//! [`selector`] → [`action`], glued together by [`orchestrator::run_rule`].

pub mod action;
pub mod duration;
pub mod error;
pub mod index;
pub mod interfaces;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod predicate;
pub mod selector;

pub use action::sweep_snoozed_tabs;
pub use error::EngineError;
pub use model::Rule;
pub use model::RuleRunResult;
pub use orchestrator::preview_rule;
pub use orchestrator::run_rule;
pub use orchestrator::run_rules;
