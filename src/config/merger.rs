//! Map utilities used when merging configuration data
//!
//! These functions are pure apart from logging. They are used by
//! [`ConfigNamespace`](crate::config::ConfigNamespace) to detect unknown
//! and duplicate keys before new data is merged in.

use std::collections::{BTreeSet, HashSet};
use log::info;

use crate::config::error::{ConfigError, Result};
use crate::config::types::{ConfigData, Value};

/// Return the entries of `data` whose key is not in `keys`, in map order.
pub fn remove_by_keys<I, S>(data: &ConfigData, keys: I) -> Vec<(String, Value)>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let keys: HashSet<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
    data.iter()
        .filter(|(k, _)| !keys.contains(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Keys present in both maps, sorted.
pub fn duplicate_keys(new_data: &ConfigData, base_data: &ConfigData) -> Vec<String> {
    let duplicates: BTreeSet<&String> = new_data
        .keys()
        .filter(|k| base_data.contains_key(k.as_str()))
        .collect();
    duplicates.into_iter().cloned().collect()
}

/// Compare two maps for keys defined in both.
///
/// With `error_on_duplicate` any overlap is a [`ConfigError::DuplicateKeys`];
/// otherwise the overlap is logged once and reported as `Ok(true)`.
pub fn has_duplicate_keys(
    new_data: &ConfigData,
    base_data: &ConfigData,
    error_on_duplicate: bool,
) -> Result<bool> {
    let duplicates = duplicate_keys(new_data, base_data);
    if duplicates.is_empty() {
        return Ok(false);
    }

    if error_on_duplicate {
        return Err(ConfigError::DuplicateKeys(duplicates));
    }
    info!("Duplicate keys in config: {:?}", duplicates);
    Ok(true)
}
