//! liveconf: live, namespaced configuration with lazy typed values
//!
//! Configuration is stored in named namespaces inside a process-wide
//! registry. Code that needs a setting holds a [`ValueProxy`] that resolves
//! and validates the value on first use and caches it until the namespace
//! is reloaded. Files can be watched and reloaded in place, with callbacks
//! run after each reload.
//!
//! # Main Features
//!
//! - Typed, lazily resolved value proxies with defaults
//! - Strict or lenient handling of unknown and duplicate keys
//! - Reloading a single namespace or all of them
//! - File watching with throttled modification checks
//! - Background polling on a tokio runtime
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use liveconf::config::{json_loader, ConfigFacade, FacadePoller, NamespaceGetters};
//!
//! #[tokio::main]
//! async fn main() -> liveconf::Result<()> {
//!     let facade = ConfigFacade::load("service.json", "service", json_loader, Duration::from_secs(1))?;
//!     let port = NamespaceGetters::new("service").get_int("port", Some(8080));
//!     println!("listening on {}", port.value()?);
//!
//!     let poller = FacadePoller::spawn(facade, Duration::from_secs(2));
//!     poller.check_now(false).await?;
//!     poller.shutdown().await?;
//!     Ok(())
//! }
//! ```

// Public modules
pub mod common;
pub mod config;

// Re-export commonly used structures and functions for convenience
pub use config::{
    get_namespace, reload, validate, view_help, ConfigError, ConfigFacade, ConfigNamespace,
    Result, ValueProxy, DEFAULT,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
