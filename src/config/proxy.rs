//! Lazy value proxies
//!
//! A [`ValueProxy`] is a cheap, cloneable handle to one key of one namespace.
//! Nothing is read when the proxy is created. The first call to
//! [`ValueProxy::value`] runs the validator against the namespace's current
//! value and caches the result until the namespace invalidates its proxies.
//!
//! Comparison and formatting on a proxy operate on the *resolved* value,
//! never on handle identity:
//!
//! ```
//! use liveconf::config::{self, ConfigData, get_namespace};
//!
//! let ns = get_namespace("proxy_doc");
//! let port = config::NamespaceGetters::new("proxy_doc").get_int("port", None);
//! ns.apply_config_data(&ConfigData::from_iter([("port".to_string(), 8080.into())]), false, false)?;
//!
//! assert_eq!(port.value()?, 8080);
//! assert!(port == 8080i64);
//! # Ok::<(), liveconf::config::ConfigError>(())
//! ```

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::common::sync::{read, write};
use crate::config::error::{ConfigError, Result};
use crate::config::help::config_help;
use crate::config::namespace::ConfigNamespace;
use crate::config::traits::ProxyHandle;
use crate::config::types::Validator;

struct ProxyInner<T> {
    namespace: Arc<ConfigNamespace>,
    key: String,
    validator: Validator<T>,
    default: Option<T>,
    /// Bumped on every invalidation
    epoch: AtomicU64,
    /// Last resolved value, tagged with the epoch it was resolved in
    cache: RwLock<Option<(u64, T)>>,
}

impl<T> ProxyInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn resolve(&self) -> Result<T> {
        match self.namespace.get(&self.key) {
            Some(raw) => (self.validator)(&raw).map_err(|e| e.for_key(&self.key)),
            None => self.default.clone().ok_or_else(|| ConfigError::MissingValue {
                namespace: self.namespace.name().to_string(),
                key: self.key.clone(),
            }),
        }
    }

    fn value(&self) -> Result<T> {
        let epoch = self.epoch.load(Ordering::Acquire);
        if let Some((cached_epoch, value)) = read(&self.cache).as_ref() {
            if *cached_epoch == epoch {
                return Ok(value.clone());
            }
        }

        // An invalidation racing with this resolve leaves a stale epoch in
        // the cache, so the next access resolves again.
        let value = self.resolve()?;
        *write(&self.cache) = Some((epoch, value.clone()));
        Ok(value)
    }

    fn is_cached(&self) -> bool {
        let epoch = self.epoch.load(Ordering::Acquire);
        matches!(read(&self.cache).as_ref(), Some((cached, _)) if *cached == epoch)
    }
}

impl<T> ProxyHandle for ProxyInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn config_key(&self) -> &str {
        &self.key
    }

    fn reset(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    fn validate(&self) -> Result<()> {
        self.value().map(|_| ())
    }
}

/// Lazy, cached handle to one configuration key
pub struct ValueProxy<T> {
    inner: Arc<ProxyInner<T>>,
}

impl<T> ValueProxy<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a proxy and register it with `namespace`.
    ///
    /// With `default` set, a missing key resolves to the default instead of
    /// failing with [`ConfigError::MissingValue`].
    pub fn new(
        namespace: Arc<ConfigNamespace>,
        key: impl Into<String>,
        validator: Validator<T>,
        default: Option<T>,
    ) -> Self {
        let inner = Arc::new(ProxyInner {
            namespace,
            key: key.into(),
            validator,
            default,
            epoch: AtomicU64::new(0),
            cache: RwLock::new(None),
        });
        inner.namespace.register_proxy(&inner);
        Self { inner }
    }

    /// Resolve the value, using the cache when it is still valid
    pub fn value(&self) -> Result<T> {
        self.inner.value()
    }

    /// Resolve the value and pass it to `f`
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.value().map(|value| f(&value))
    }

    /// Drop the cached value
    pub fn reset(&self) {
        self.inner.reset();
    }

    /// Whether the next access is served from the cache
    pub fn is_cached(&self) -> bool {
        self.inner.is_cached()
    }

    /// Key this proxy resolves
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Name of the namespace this proxy reads from
    pub fn namespace(&self) -> &str {
        self.inner.namespace.name()
    }

    /// Default used when the key is missing
    pub fn default_value(&self) -> Option<&T> {
        self.inner.default.as_ref()
    }

    /// Attach a help message to this key's description
    pub fn with_help(self, help: impl Into<String>) -> Self {
        config_help().set_help(self.namespace(), self.key(), help);
        self
    }
}

impl<T> Clone for ValueProxy<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ValueProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueProxy")
            .field("namespace", &self.inner.namespace.name())
            .field("key", &self.inner.key)
            .finish()
    }
}

impl<T> fmt::Display for ValueProxy<T>
where
    T: fmt::Display + Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Ok(value) => fmt::Display::fmt(&value, f),
            Err(err) => write!(f, "<unresolved {}: {}>", self.key(), err),
        }
    }
}

impl<T> PartialEq<T> for ValueProxy<T>
where
    T: PartialEq + Clone + Send + Sync + 'static,
{
    fn eq(&self, other: &T) -> bool {
        self.value().map(|value| value == *other).unwrap_or(false)
    }
}

impl<T> PartialEq for ValueProxy<T>
where
    T: PartialEq + Clone + Send + Sync + 'static,
{
    fn eq(&self, other: &Self) -> bool {
        match (self.value(), other.value()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl<T> PartialOrd<T> for ValueProxy<T>
where
    T: PartialOrd + Clone + Send + Sync + 'static,
{
    fn partial_cmp(&self, other: &T) -> Option<CmpOrdering> {
        self.value().ok()?.partial_cmp(other)
    }
}

impl PartialEq<&str> for ValueProxy<String> {
    fn eq(&self, other: &&str) -> bool {
        self.with(|value| value == other).unwrap_or(false)
    }
}
