//! Process-wide namespace registry
//!
//! Namespaces are created on first access and never removed. The registry
//! starts with only the `DEFAULT` namespace. [`reset`] exists for test
//! isolation and is never called by production code.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use once_cell::sync::Lazy;
use log::debug;

use crate::common::sync::{read, write};
use crate::config::defaults::DEFAULT;
use crate::config::error::Result;
use crate::config::help::config_help;
use crate::config::namespace::ConfigNamespace;

static NAMESPACES: Lazy<RwLock<BTreeMap<String, Arc<ConfigNamespace>>>> = Lazy::new(|| {
    let mut namespaces = BTreeMap::new();
    namespaces.insert(DEFAULT.to_string(), Arc::new(ConfigNamespace::new(DEFAULT)));
    RwLock::new(namespaces)
});

/// Return the namespace called `name`, creating it if it does not exist
pub fn get_namespace(name: &str) -> Arc<ConfigNamespace> {
    if let Some(namespace) = read(&NAMESPACES).get(name) {
        return Arc::clone(namespace);
    }

    let mut namespaces = write(&NAMESPACES);
    let namespace = namespaces.entry(name.to_string()).or_insert_with(|| {
        debug!("Creating configuration namespace {}", name);
        Arc::new(ConfigNamespace::new(name))
    });
    Arc::clone(namespace)
}

/// Names of every registered namespace, sorted
pub fn namespace_names() -> Vec<String> {
    read(&NAMESPACES).keys().cloned().collect()
}

/// The namespaces targeted by a `(name, all_names)` pair
fn get_namespaces_from_names(name: &str, all_names: bool) -> Vec<Arc<ConfigNamespace>> {
    if all_names {
        read(&NAMESPACES).values().cloned().collect()
    } else {
        vec![get_namespace(name)]
    }
}

/// Invalidate cached proxy values.
///
/// Only the namespace `name` is affected unless `all_names` is set, in
/// which case every registered namespace is.
pub fn reload(name: &str, all_names: bool) {
    for namespace in get_namespaces_from_names(name, all_names) {
        namespace.invalidate_proxies();
    }
}

/// Check that every live proxy in the targeted namespaces resolves.
///
/// The first missing or invalid value is returned as an error.
pub fn validate(name: &str, all_names: bool) -> Result<()> {
    for namespace in get_namespaces_from_names(name, all_names) {
        for proxy in namespace.get_value_proxies() {
            proxy.validate()?;
        }
    }
    Ok(())
}

/// Empty every namespace and the help registry. Test isolation only.
#[doc(hidden)]
pub fn reset() {
    for namespace in read(&NAMESPACES).values() {
        namespace.reset();
    }
    config_help().clear();
}
