//! Configuration module
//!
//! Values live in named [`ConfigNamespace`]s held by a process-wide
//! registry. Application code reads them through lazily resolved
//! [`ValueProxy`] handles obtained from the getters. Loaders merge data
//! into a namespace, and a [`ConfigFacade`] keeps a namespace in sync with
//! files on disk.
//!
//! ```
//! use liveconf::config::{self, LoaderOptions};
//! use serde_json::json;
//!
//! let max_cycles = config::NamespaceGetters::new("overview").get_int("max_cycles", None);
//! config::load_dict(
//!     json!({"max_cycles": 7}),
//!     &LoaderOptions::new().with_namespace("overview"),
//! )?;
//! assert_eq!(max_cycles.value()?, 7);
//! # Ok::<(), config::ConfigError>(())
//! ```

// Submodules
pub mod actor;
pub mod callback;
pub mod defaults;
pub mod error;
pub mod facade;
pub mod getters;
pub mod help;
pub mod loader;
pub mod merger;
pub mod namespace;
pub mod proxy;
pub mod readers;
pub mod registry;
pub mod traits;
pub mod types;
pub mod validator;
pub mod watcher;

// Re-export types and traits
pub use self::actor::{FacadePoller, PollerMessage};
pub use self::callback::ReloadCallbackChain;
pub use self::defaults::DEFAULT;
pub use self::error::{ConfigError, Result};
pub use self::facade::{build_loader_callable, ConfigFacade};
pub use self::getters::{
    build_getter, get, get_bool, get_date, get_float, get_int, get_list, get_list_of_int,
    get_list_of_string, get_log_level, get_optional_int, get_optional_string, get_string,
    get_time, Getter, NamespaceGetters,
};
pub use self::help::{config_help, view_help, ConfigHelp, KeyDescription};
pub use self::loader::{
    flatten_dict, json_loader, load_config_data, load_dict, load_json_file, LoaderOptions,
};
pub use self::merger::{has_duplicate_keys, remove_by_keys};
pub use self::namespace::ConfigNamespace;
pub use self::proxy::ValueProxy;
pub use self::registry::{get_namespace, namespace_names, reload, reset, validate};
pub use self::traits::{ProxyHandle, Reloader};
pub use self::types::{config_data, Callback, ConfigData, LoaderFn, Validator, Value};
pub use self::watcher::{get_filename_list, ConfigurationWatcher, IntoFilenames};
