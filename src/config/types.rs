//! Configuration types
//!
//! Shared aliases for raw values, key/value maps and the callable types
//! accepted by proxies, watchers and callback chains.

use std::sync::Arc;

use crate::config::error::Result;

/// A raw configuration value as produced by a loader
pub use serde_json::Value;

/// Ordered mapping from key to raw value
pub type ConfigData = serde_json::Map<String, Value>;

/// Converts a raw value into a typed one, or rejects it
pub type Validator<T> = Arc<dyn Fn(&Value) -> Result<T> + Send + Sync>;

/// Reloads a namespace's data from its source
pub type LoaderFn = Box<dyn Fn() -> Result<()> + Send + Sync>;

/// Invoked after a reload
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Build a [`ConfigData`] from `(key, value)` pairs.
pub fn config_data<I, K, V>(pairs: I) -> ConfigData
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
