// tabrules-config/src/error.rs
// ============================================================================
// Module: Config Errors
// Description: Structured failures for config loading and validation.
// ============================================================================

use thiserror::Error;

/// Failures that can occur while loading or validating [`crate::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config path exceeded the maximum accepted length.
    #[error("config path exceeds max length ({max} bytes)")]
    PathTooLong {
        /// The enforced maximum.
        max: usize,
    },

    /// One path component exceeded the maximum accepted length.
    #[error("config path component too long (max {max} bytes)")]
    PathComponentTooLong {
        /// The enforced maximum.
        max: usize,
    },

    /// The config file exceeded the maximum accepted size.
    #[error("config file exceeds size limit ({max} bytes)")]
    FileTooLarge {
        /// The enforced maximum.
        max: u64,
    },

    /// The config file was not valid UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,

    /// Reading the config file failed.
    #[error("failed to read config at {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: String,
        /// The underlying I/O failure message.
        source: String,
    },

    /// The file parsed as TOML but not into an [`crate::EngineConfig`].
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A structurally valid config failed a range/sanity check.
    #[error("invalid config: {0}")]
    Invalid(String),
}
