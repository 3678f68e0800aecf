// tabrules-config/src/lib.rs
// ============================================================================
// Crate: tabrules-config
// Description: Engine configuration (scheduler defaults, predicate
//              guardrails, category map) loaded and validated from TOML.
// Purpose: Own the knobs the engine itself owns; rules remain the
//          collaborator's data.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! [`EngineConfig::load`] fails closed before any rule ever runs: a
//! malformed or out-of-range config document is an error at startup, not a
//! surprise mid-run. `load(None)` returns [`EngineConfig::default`].

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

mod error;

pub use error::ConfigError;

/// Maximum accepted config file size, in bytes.
const MAX_CONFIG_BYTES: u64 = 1_048_576;
/// Maximum accepted config path length, in bytes.
const MAX_PATH_LEN: usize = 4_096;
/// Maximum accepted length of one path component.
const MAX_PATH_COMPONENT_LEN: usize = 255;

/// Scheduler-owned defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Default debounce window for `immediate` triggers, in milliseconds.
    pub default_debounce_ms: u64,
    /// How often the snooze sweep checks for due wake records, in
    /// milliseconds.
    pub snooze_sweep_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_debounce_ms: 2_000,
            snooze_sweep_interval_ms: 60_000,
        }
    }
}

/// Predicate-compiler guardrails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredicateConfig {
    /// Maximum time a single predicate evaluation may take, in
    /// milliseconds, before it is treated as a compile-time reject.
    pub regex_timeout_ms: u64,
}

impl Default for PredicateConfig {
    fn default() -> Self {
        Self { regex_timeout_ms: 50 }
    }
}

/// The full engine configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scheduler defaults.
    pub scheduler: SchedulerConfig,
    /// Predicate compiler guardrails.
    pub predicate: PredicateConfig,
    /// Domain-to-category map used for index enrichment.
    pub categories: HashMap<String, String>,
}

impl EngineConfig {
    /// Loads configuration from `path`, or returns [`EngineConfig::default`]
    /// when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let path_str = path.to_string_lossy();
        if path_str.len() > MAX_PATH_LEN {
            return Err(ConfigError::PathTooLong { max: MAX_PATH_LEN });
        }
        for component in path.components() {
            let rendered = component.as_os_str().to_string_lossy();
            if rendered.len() > MAX_PATH_COMPONENT_LEN {
                return Err(ConfigError::PathComponentTooLong {
                    max: MAX_PATH_COMPONENT_LEN,
                });
            }
        }

        let metadata = fs::metadata(path).map_err(|source| ConfigError::Io {
            path: path_str.to_string(),
            source: source.to_string(),
        })?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::FileTooLarge { max: MAX_CONFIG_BYTES });
        }

        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path_str.to_string(),
            source: source.to_string(),
        })?;
        let text = String::from_utf8(bytes).map_err(|_| ConfigError::NotUtf8)?;

        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse(source.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates range/sanity constraints that `serde`'s structural parse
    /// can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.default_debounce_ms == 0 {
            return Err(ConfigError::Invalid("scheduler.default_debounce_ms must be > 0".to_string()));
        }
        if self.scheduler.snooze_sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.snooze_sweep_interval_ms must be > 0".to_string(),
            ));
        }
        if self.predicate.regex_timeout_ms == 0 {
            return Err(ConfigError::Invalid("predicate.regex_timeout_ms must be > 0".to_string()));
        }
        Ok(())
    }
}
