//! Configuration errors
//!
//! This module defines the single error taxonomy surfaced by the registry,
//! its value proxies, loaders and the file watcher.

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Keys were applied to a namespace that no proxy has ever referenced
    #[error("Unexpected value in {namespace} configuration: {keys:?}")]
    UnknownKeys {
        /// Namespace the data was applied to
        namespace: String,
        /// Offending keys, sorted
        keys: Vec<String>,
    },

    /// Keys were defined by more than one source
    #[error("Duplicate keys in config: {0:?}")]
    DuplicateKeys(Vec<String>),

    /// A required key has neither a value nor a default
    #[error("{namespace} missing value for {key}")]
    MissingValue {
        /// Namespace that was searched
        namespace: String,
        /// Key that was requested
        key: String,
    },

    /// A value was present but failed validation for the named key
    #[error("Invalid value for '{0}': {1}")]
    InvalidValue(String, String),

    /// A validator rejected a value
    #[error("Validation error: {0}")]
    Validation(String),

    /// Loader input could not be parsed
    #[error("Error parsing configuration: {0}")]
    Parse(String),

    /// Watched or loaded file could not be read
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("Configuration error: {0}")]
    Other(String),
}

impl ConfigError {
    /// Attach the key being resolved to a bare validation failure.
    pub(crate) fn for_key(self, key: &str) -> Self {
        match self {
            ConfigError::Validation(msg) => ConfigError::InvalidValue(key.to_string(), msg),
            other => other,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
