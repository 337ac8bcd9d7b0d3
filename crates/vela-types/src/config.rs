//! Unifier configuration.
//!
//! Tuning knobs read from the `[unifier]` table of the host compiler's
//! `vela.toml`. This crate does no filesystem I/O; the host passes the
//! TOML text in.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recursion depth limit applied when the host does not configure one.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid TOML syntax: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Unifier tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct UnifierConfig {
    /// Maximum structural recursion depth before unification reports a
    /// depth error instead of overflowing the stack
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl UnifierConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: UnifierConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_depth".to_string(),
                reason: "depth limit must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// The depth limit in force, falling back to [`DEFAULT_MAX_DEPTH`]
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: &UnifierConfig) {
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
    }
}
