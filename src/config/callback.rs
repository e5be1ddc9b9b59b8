//! Reload callback chains
//!
//! A [`ReloadCallbackChain`] runs user callbacks after configuration files
//! have been loaded, then invalidates the proxies of its namespace (or of
//! every namespace).

use std::fmt;
use std::sync::RwLock;
use log::debug;

use crate::common::sync::{read, write};
use crate::config::defaults::DEFAULT;
use crate::config::registry::reload;
use crate::config::traits::Reloader;
use crate::config::types::Callback;

/// Ordered, named callbacks followed by a namespace reload
pub struct ReloadCallbackChain {
    namespace: String,
    all_names: bool,
    callbacks: RwLock<Vec<(String, Callback)>>,
}

impl ReloadCallbackChain {
    /// Chain reloading only `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            all_names: false,
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// Chain reloading every namespace
    pub fn all() -> Self {
        Self::new(DEFAULT).with_all_names(true)
    }

    /// Reload every namespace instead of only this chain's own
    pub fn with_all_names(mut self, all_names: bool) -> Self {
        self.all_names = all_names;
        self
    }

    /// Start with the given callbacks, in order
    pub fn with_callbacks<I, S>(self, callbacks: I) -> Self
    where
        I: IntoIterator<Item = (S, Callback)>,
        S: Into<String>,
    {
        for (name, callback) in callbacks {
            self.add(name, callback);
        }
        self
    }

    /// Namespace reloaded after the callbacks run
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether every namespace is reloaded
    pub fn all_names(&self) -> bool {
        self.all_names
    }

    /// Add a callback. Reusing a name replaces that callback in place.
    pub fn add(&self, name: impl Into<String>, callback: Callback) {
        let name = name.into();
        let mut callbacks = write(&self.callbacks);
        match callbacks.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = callback,
            None => callbacks.push((name, callback)),
        }
    }

    /// Remove a callback by name, returning it if it was present
    pub fn remove(&self, name: &str) -> Option<Callback> {
        let mut callbacks = write(&self.callbacks);
        let index = callbacks.iter().position(|(existing, _)| existing == name)?;
        Some(callbacks.remove(index).1)
    }

    /// Callback names in call order
    pub fn callback_names(&self) -> Vec<String> {
        read(&self.callbacks)
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Run every callback in insertion order, then reload
    pub fn call(&self) {
        // Callbacks may add or remove callbacks, so run them from a copy
        let callbacks: Vec<(String, Callback)> = read(&self.callbacks).clone();
        for (name, callback) in &callbacks {
            debug!("Running reload callback {}", name);
            callback();
        }
        reload(&self.namespace, self.all_names);
    }
}

impl Reloader for ReloadCallbackChain {
    fn reload(&self) {
        self.call()
    }
}

impl fmt::Debug for ReloadCallbackChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadCallbackChain")
            .field("namespace", &self.namespace)
            .field("all_names", &self.all_names)
            .field("callbacks", &self.callback_names())
            .finish()
    }
}
