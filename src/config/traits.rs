//! Configuration traits
//!
//! This module defines the seams between namespaces, their proxies and the
//! reload machinery.

use crate::config::error::Result;

/// Type-erased view of a value proxy, as tracked by its namespace
pub trait ProxyHandle: Send + Sync {
    /// Key this proxy resolves
    fn config_key(&self) -> &str;

    /// Invalidate the cached value so the next access re-resolves
    fn reset(&self);

    /// Resolve the value now, surfacing any missing or invalid value
    fn validate(&self) -> Result<()>;
}

/// Something to run after a watcher has reloaded its files
pub trait Reloader: Send + Sync {
    /// Perform the post-load reload step
    fn reload(&self);
}

impl<F> Reloader for F
where
    F: Fn() + Send + Sync,
{
    fn reload(&self) {
        self()
    }
}
