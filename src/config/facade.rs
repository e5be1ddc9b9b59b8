//! File-backed configuration as one unit
//!
//! [`ConfigFacade`] pairs a [`ConfigurationWatcher`] with the
//! [`ReloadCallbackChain`] it reloads through. Loading through a facade
//! replaces the namespace's contents with what the files contain.
//!
//! ```no_run
//! use std::time::Duration;
//! use liveconf::config::{json_loader, ConfigFacade, NamespaceGetters};
//!
//! let mut facade = ConfigFacade::load("app.json", "app", json_loader, Duration::from_secs(3))?;
//! let workers = NamespaceGetters::new("app").get_int("workers", Some(4));
//!
//! facade.add_callback("log_workers", move || log::info!("workers = {}", workers));
//! facade.reload_if_changed(false)?;
//! # Ok::<(), liveconf::config::ConfigError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use log::{info, warn};

use crate::common::fs::absolute_path;
use crate::config::callback::ReloadCallbackChain;
use crate::config::error::Result;
use crate::config::registry::get_namespace;
use crate::config::traits::Reloader;
use crate::config::types::LoaderFn;
use crate::config::watcher::{ConfigurationWatcher, IntoFilenames};

/// Build a loader that replaces the contents of `namespace` with `filenames`.
///
/// `load_func` runs once per file, in the order given, against a staged
/// empty map. Readers keep seeing the previous values until every file has
/// loaded, then the staged map is swapped in as a whole. If any call fails,
/// the staged map is discarded and the error is returned.
pub fn build_loader_callable<F>(load_func: F, filenames: Vec<PathBuf>, namespace: &str) -> LoaderFn
where
    F: Fn(&Path, &str) -> Result<()> + Send + Sync + 'static,
{
    let namespace = namespace.to_string();
    Box::new(move || {
        let config_namespace = get_namespace(&namespace);
        let staging = config_namespace.stage();

        for path in &filenames {
            if let Err(e) = load_func(path, &namespace) {
                warn!(
                    "Failed to load {} into {}, keeping previous values: {}",
                    path.display(),
                    namespace,
                    e
                );
                return Err(e);
            }
        }
        staging.commit();
        Ok(())
    })
}

/// A watcher and its callback chain
#[derive(Debug)]
pub struct ConfigFacade {
    watcher: ConfigurationWatcher,
    callback_chain: Arc<ReloadCallbackChain>,
}

impl ConfigFacade {
    /// Assemble a facade from parts
    pub fn new(watcher: ConfigurationWatcher, callback_chain: Arc<ReloadCallbackChain>) -> Self {
        Self {
            watcher,
            callback_chain,
        }
    }

    /// Watch `filenames`, load them into `namespace` now and return the facade.
    ///
    /// `loader_func` is called with each file and the namespace name. Files
    /// are made absolute and loaded in the order given, each once.
    pub fn load<F>(
        filenames: impl IntoFilenames,
        namespace: &str,
        loader_func: F,
        min_interval: Duration,
    ) -> Result<Self>
    where
        F: Fn(&Path, &str) -> Result<()> + Send + Sync + 'static,
    {
        let mut load_order: Vec<PathBuf> = Vec::new();
        for path in filenames.into_filenames() {
            let path = absolute_path(&path)?;
            if !load_order.contains(&path) {
                load_order.push(path);
            }
        }
        let callback_chain = Arc::new(ReloadCallbackChain::new(namespace));
        let reloader: Arc<dyn Reloader> = callback_chain.clone();

        let watcher = ConfigurationWatcher::new(
            build_loader_callable(loader_func, load_order.clone(), namespace),
            load_order,
            min_interval,
            Some(reloader),
        )?;
        watcher.load_config()?;
        info!(
            "Loaded {} configuration file(s) into {}",
            watcher.filenames().len(),
            namespace
        );

        Ok(Self::new(watcher, callback_chain))
    }

    /// Register a callback to run after each reload
    pub fn add_callback<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callback_chain.add(name, Arc::new(callback));
    }

    /// Reload when the watched files changed, or unconditionally with `force`
    pub fn reload_if_changed(&mut self, force: bool) -> Result<()> {
        self.watcher.reload_if_changed(force)
    }

    /// The underlying watcher
    pub fn watcher(&self) -> &ConfigurationWatcher {
        &self.watcher
    }

    /// The callback chain run after each reload
    pub fn callback_chain(&self) -> &Arc<ReloadCallbackChain> {
        &self.callback_chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use serde_json::json;
    use serial_test::serial;
    use tempfile::tempdir;
    use crate::config::error::ConfigError;
    use crate::config::getters::NamespaceGetters;
    use crate::config::loader::{json_loader, load_json_file, LoaderOptions};
    use crate::config::registry::reset;

    #[test]
    #[serial]
    fn test_loader_callable_replaces_values() {
        reset();
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.json");
        let second = dir.path().join("second.json");
        fs::write(&first, r#"{"a": 1, "b": 1}"#).unwrap();
        fs::write(&second, r#"{"c": 3}"#).unwrap();

        let ns = get_namespace("facade_tests");
        ns.set_value("stale", true);

        let loader = build_loader_callable(json_loader, vec![first, second], "facade_tests");
        loader().unwrap();

        assert_eq!(ns.get("stale"), None);
        assert_eq!(ns.get("a"), Some(json!(1)));
        assert_eq!(ns.get("c"), Some(json!(3)));
    }

    #[test]
    #[serial]
    fn test_loader_callable_keeps_values_on_failure() {
        reset();
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.json");
        let broken = dir.path().join("broken.json");
        fs::write(&good, r#"{"a": 2}"#).unwrap();
        fs::write(&broken, "{").unwrap();

        let ns = get_namespace("facade_tests");
        ns.set_value("a", 1);

        let loader = build_loader_callable(json_loader, vec![good, broken], "facade_tests");
        assert!(matches!(loader(), Err(ConfigError::Parse(_))));
        assert_eq!(ns.get("a"), Some(json!(1)));
    }

    #[test]
    #[serial]
    fn test_load_and_callbacks() {
        reset();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"one": "A"}"#).unwrap();

        let mut facade =
            ConfigFacade::load(&path, "facade_tests", json_loader, Duration::ZERO).unwrap();
        assert_eq!(get_namespace("facade_tests").get("one"), Some(json!("A")));

        facade.add_callback("noop", || {});
        assert_eq!(facade.callback_chain().callback_names(), vec!["noop"]);
        assert_eq!(facade.callback_chain().namespace(), "facade_tests");

        facade.reload_if_changed(true).unwrap();
        assert_eq!(get_namespace("facade_tests").get("one"), Some(json!("A")));
    }

    #[test]
    #[serial]
    fn test_load_missing_file() {
        reset();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let result = ConfigFacade::load(&missing, "facade_tests", json_loader, Duration::ZERO);
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    #[serial]
    fn test_readers_keep_values_during_reload() {
        reset();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut data = serde_json::Map::new();
        for i in 0..2000 {
            data.insert(format!("filler.{}", i), json!(i));
        }
        data.insert("workers".to_string(), json!(4));
        fs::write(&path, serde_json::Value::Object(data).to_string()).unwrap();

        let mut facade =
            ConfigFacade::load(&path, "facade_tests", json_loader, Duration::ZERO).unwrap();
        let workers = NamespaceGetters::new("facade_tests").get_int("workers", None);

        let stop = Arc::new(AtomicBool::new(false));
        let failures = Arc::new(AtomicUsize::new(0));
        let reader = {
            let stop = Arc::clone(&stop);
            let failures = Arc::clone(&failures);
            let workers = workers.clone();
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    if workers.value().ok() != Some(4) {
                        failures.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        };

        for _ in 0..50 {
            facade.reload_if_changed(true).unwrap();
        }
        stop.store(true, Ordering::SeqCst);
        reader.join().unwrap();

        assert_eq!(failures.load(Ordering::SeqCst), 0);
        assert_eq!(workers.value().unwrap(), 4);
    }

    #[test]
    #[serial]
    fn test_load_repeated_file_once() {
        reset();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"one": "A"}"#).unwrap();

        let strict_loader = |path: &Path, namespace: &str| {
            let options = LoaderOptions::new()
                .with_namespace(namespace)
                .error_on_duplicate(true);
            load_json_file(path, &options).map(|_| ())
        };
        let facade = ConfigFacade::load(
            vec![path.clone(), path.clone()],
            "facade_tests",
            strict_loader,
            Duration::ZERO,
        )
        .unwrap();

        assert_eq!(facade.watcher().filenames(), &[path]);
        assert_eq!(get_namespace("facade_tests").get("one"), Some(json!("A")));
    }

    #[test]
    #[serial]
    fn test_load_keeps_merge_order() {
        reset();
        let dir = tempdir().unwrap();
        let base = dir.path().join("b_base.json");
        let overrides = dir.path().join("a_overrides.json");
        fs::write(&base, r#"{"level": "base", "only_base": 1}"#).unwrap();
        fs::write(&overrides, r#"{"level": "override"}"#).unwrap();

        ConfigFacade::load(
            vec![base.clone(), overrides.clone(), base],
            "facade_tests",
            json_loader,
            Duration::ZERO,
        )
        .unwrap();

        let ns = get_namespace("facade_tests");
        assert_eq!(ns.get("level"), Some(json!("override")));
        assert_eq!(ns.get("only_base"), Some(json!(1)));
    }
}
