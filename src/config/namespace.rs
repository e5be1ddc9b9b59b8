//! Configuration namespaces
//!
//! A [`ConfigNamespace`] holds the live key/value map for one logical group
//! of configuration, plus weak handles to every value proxy bound to it.
//! Namespaces are created through [`get_namespace`](crate::config::get_namespace)
//! and live for the rest of the process.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};
use log::{debug, info};

use crate::common::sync::{lock, read, write};
use crate::config::error::{ConfigError, Result};
use crate::config::merger::{has_duplicate_keys, remove_by_keys};
use crate::config::traits::ProxyHandle;
use crate::config::types::{ConfigData, Value};

/// A named container of flattened configuration values
pub struct ConfigNamespace {
    name: String,
    values: RwLock<Arc<ConfigData>>,
    proxies: Mutex<Vec<Weak<dyn ProxyHandle>>>,
    known_keys: RwLock<BTreeSet<String>>,
    /// Values applied while a reload is staged, not yet visible to readers
    staged: Mutex<Option<ConfigData>>,
}

impl ConfigNamespace {
    /// Create an empty namespace
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: RwLock::new(Arc::new(ConfigData::new())),
            proxies: Mutex::new(Vec::new()),
            known_keys: RwLock::new(BTreeSet::new()),
            staged: Mutex::new(None),
        }
    }

    /// Name of this namespace
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Track a proxy without extending its lifetime.
    ///
    /// The proxy's key is recorded as known and stays known after the proxy
    /// is dropped. Handles of dropped proxies are pruned here as well.
    pub fn register_proxy<P>(&self, proxy: &Arc<P>)
    where
        P: ProxyHandle + 'static,
    {
        write(&self.known_keys).insert(proxy.config_key().to_string());
        let weak: Weak<dyn ProxyHandle> = Arc::downgrade(proxy) as Weak<dyn ProxyHandle>;
        let mut proxies = lock(&self.proxies);
        proxies.retain(|handle| handle.strong_count() > 0);
        proxies.push(weak);
    }

    /// Proxies that are still referenced somewhere. Dead handles are dropped.
    pub fn get_value_proxies(&self) -> Vec<Arc<dyn ProxyHandle>> {
        let mut proxies = lock(&self.proxies);
        let mut alive = Vec::with_capacity(proxies.len());
        proxies.retain(|weak| match weak.upgrade() {
            Some(proxy) => {
                alive.push(proxy);
                true
            }
            None => false,
        });
        alive
    }

    /// Validate `data` and merge it into this namespace.
    ///
    /// Both checks run before anything is written; the merged map then
    /// replaces the current one in a single step and every live proxy is
    /// invalidated. While a reload is staged, data is merged into the
    /// staged map instead and readers keep seeing the current values.
    pub fn apply_config_data(
        &self,
        data: &ConfigData,
        error_on_unknown: bool,
        error_on_duplicate: bool,
    ) -> Result<()> {
        self.validate_keys(data, error_on_unknown)?;

        if let Some(staged) = lock(&self.staged).as_mut() {
            has_duplicate_keys(data, staged, error_on_duplicate)?;
            for (key, value) in data {
                staged.insert(key.clone(), value.clone());
            }
            debug!("Staged {} value(s) for namespace {}", data.len(), self.name);
            return Ok(());
        }

        {
            let mut values = write(&self.values);
            has_duplicate_keys(data, &values, error_on_duplicate)?;

            let mut merged = ConfigData::clone(&values);
            for (key, value) in data {
                merged.insert(key.clone(), value.clone());
            }
            *values = Arc::new(merged);
        }

        debug!("Applied {} value(s) to namespace {}", data.len(), self.name);
        self.invalidate_proxies();
        Ok(())
    }

    /// Merge values without checks and without invalidating proxies.
    ///
    /// Cached proxy values stay in place until the next reload.
    pub fn update_values(&self, data: &ConfigData) {
        let mut values = write(&self.values);
        let mut merged = ConfigData::clone(&values);
        for (key, value) in data {
            merged.insert(key.clone(), value.clone());
        }
        *values = Arc::new(merged);
    }

    /// Set a single value without invalidating proxies
    pub fn set_value(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut values = write(&self.values);
        Arc::make_mut(&mut values).insert(key.into(), value.into());
    }

    /// Copy of all values stored in this namespace
    pub fn get_config_values(&self) -> ConfigData {
        ConfigData::clone(&read(&self.values))
    }

    /// Shared handle to the current map
    pub fn snapshot(&self) -> Arc<ConfigData> {
        Arc::clone(&read(&self.values))
    }

    /// Look up a raw value
    pub fn get(&self, key: &str) -> Option<Value> {
        read(&self.values).get(key).cloned()
    }

    /// Whether a value is stored for `key`
    pub fn contains(&self, key: &str) -> bool {
        read(&self.values).contains_key(key)
    }

    /// Every key ever referenced by a registered proxy
    pub fn get_known_keys(&self) -> BTreeSet<String> {
        read(&self.known_keys).clone()
    }

    /// Check `data` for keys no proxy has referenced.
    ///
    /// Unknown keys are an error when `error_on_unknown`, otherwise they are
    /// logged in a single message.
    pub fn validate_keys(&self, data: &ConfigData, error_on_unknown: bool) -> Result<()> {
        let known = self.get_known_keys();
        let unknown: Vec<String> = remove_by_keys(data, &known)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }

        let err = ConfigError::UnknownKeys {
            namespace: self.name.clone(),
            keys: unknown,
        };
        if error_on_unknown {
            return Err(err);
        }
        info!("{}", err);
        Ok(())
    }

    /// Invalidate the cache of every live proxy
    pub fn invalidate_proxies(&self) {
        let proxies = self.get_value_proxies();
        debug!("Invalidating {} proxies in namespace {}", proxies.len(), self.name);
        for proxy in proxies {
            proxy.reset();
        }
    }

    /// Remove all values. Proxies stay registered and are invalidated.
    pub fn clear(&self) {
        *write(&self.values) = Arc::new(ConfigData::new());
        self.invalidate_proxies();
    }

    /// Replace every value in one step and invalidate live proxies
    pub fn replace_values(&self, values: Arc<ConfigData>) {
        *write(&self.values) = values;
        self.invalidate_proxies();
    }

    /// Start collecting a replacement for this namespace's values.
    ///
    /// Until the returned [`Staging`] is committed, applied data goes to an
    /// empty staged map and readers see the current values. Dropping it
    /// without committing discards the staged data.
    pub fn stage(&self) -> Staging<'_> {
        *lock(&self.staged) = Some(ConfigData::new());
        Staging {
            namespace: self,
            committed: false,
        }
    }

    /// Forget values, proxies and known keys
    pub(crate) fn reset(&self) {
        *write(&self.values) = Arc::new(ConfigData::new());
        lock(&self.proxies).clear();
        write(&self.known_keys).clear();
        lock(&self.staged).take();
    }
}

/// A reload of one namespace in progress
pub struct Staging<'a> {
    namespace: &'a ConfigNamespace,
    committed: bool,
}

impl Staging<'_> {
    /// Swap the staged values in as the namespace's values
    pub fn commit(mut self) {
        self.committed = true;
        let staged = lock(&self.namespace.staged).take();
        if let Some(values) = staged {
            self.namespace.replace_values(Arc::new(values));
        }
    }
}

impl Drop for Staging<'_> {
    fn drop(&mut self) {
        if !self.committed {
            debug!("Discarding staged values for namespace {}", self.namespace.name);
            lock(&self.namespace.staged).take();
        }
    }
}

impl fmt::Display for ConfigNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigNamespace({})", self.name)
    }
}

impl fmt::Debug for ConfigNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigNamespace")
            .field("name", &self.name)
            .field("values", &read(&self.values))
            .finish_non_exhaustive()
    }
}
