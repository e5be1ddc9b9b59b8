//! Configuration loaders
//!
//! Loaders turn a source (an in-memory map or a JSON file) into flattened
//! key/value data and apply it to a namespace. [`json_loader`] has the
//! `(path, namespace)` shape expected by
//! [`ConfigFacade::load`](crate::config::ConfigFacade::load).

use std::fs;
use std::path::Path;
use log::debug;

use crate::config::defaults::{DEFAULT, KEY_SEPARATOR};
use crate::config::error::{ConfigError, Result};
use crate::config::registry::get_namespace;
use crate::config::types::{ConfigData, Value};

/// Options controlling how loaded data is applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Namespace receiving the data
    pub namespace: String,
    /// Flatten nested maps into dotted keys
    pub flatten: bool,
    /// Reject keys no proxy has referenced
    pub error_on_unknown: bool,
    /// Reject keys already present in the namespace
    pub error_on_duplicate: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT.to_string(),
            flatten: true,
            error_on_unknown: false,
            error_on_duplicate: false,
        }
    }
}

impl LoaderOptions {
    /// Options targeting `DEFAULT` with flattening on and both checks off
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Keep nested maps as single values
    pub fn without_flatten(mut self) -> Self {
        self.flatten = false;
        self
    }

    /// Set unknown-key strictness
    pub fn error_on_unknown(mut self, strict: bool) -> Self {
        self.error_on_unknown = strict;
        self
    }

    /// Set duplicate-key strictness
    pub fn error_on_duplicate(mut self, strict: bool) -> Self {
        self.error_on_duplicate = strict;
        self
    }
}

/// Flatten nested maps into dotted keys. Lists and scalars are leaves.
pub fn flatten_dict(data: &ConfigData) -> ConfigData {
    let mut flat = ConfigData::new();
    flatten_into(&mut flat, None, data);
    flat
}

fn flatten_into(flat: &mut ConfigData, prefix: Option<&str>, data: &ConfigData) {
    for (key, value) in data {
        let full_key = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, KEY_SEPARATOR, key),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(flat, Some(&full_key), nested),
            leaf => {
                flat.insert(full_key, leaf.clone());
            }
        }
    }
}

/// Apply a map to the namespace named in `options`, returning what was applied
pub fn load_config_data(data: ConfigData, options: &LoaderOptions) -> Result<ConfigData> {
    let data = if options.flatten { flatten_dict(&data) } else { data };
    get_namespace(&options.namespace).apply_config_data(
        &data,
        options.error_on_unknown,
        options.error_on_duplicate,
    )?;
    Ok(data)
}

/// Apply an in-memory object
pub fn load_dict(data: Value, options: &LoaderOptions) -> Result<ConfigData> {
    match data {
        Value::Object(map) => load_config_data(map, options),
        other => Err(ConfigError::Parse(format!(
            "configuration must be a map, got {}",
            other
        ))),
    }
}

/// Parse a JSON file and apply its top-level object
pub fn load_json_file<P: AsRef<Path>>(path: P, options: &LoaderOptions) -> Result<ConfigData> {
    let path = path.as_ref();
    debug!("Loading configuration from {} into {}", path.display(), options.namespace);

    let contents = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)
        .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))?;
    load_dict(value, options)
}

/// Load a JSON file into `namespace` with default options
pub fn json_loader(path: &Path, namespace: &str) -> Result<()> {
    load_json_file(path, &LoaderOptions::new().with_namespace(namespace)).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use tempfile::tempdir;
    use crate::config::registry::reset;
    use crate::config::types::config_data;

    #[test]
    fn test_flatten_dict() {
        let data = json!({
            "one": {"two": {"three": 3}, "list": [1, 2]},
            "top": "level"
        });
        let Value::Object(map) = data else { unreachable!() };

        let flat = flatten_dict(&map);
        let expected = config_data([
            ("one.two.three", json!(3)),
            ("one.list", json!([1, 2])),
            ("top", json!("level")),
        ]);
        assert_eq!(flat, expected);
    }

    #[test]
    #[serial]
    fn test_load_dict() {
        reset();
        let options = LoaderOptions::new().with_namespace("loader_tests");
        load_dict(json!({"db": {"host": "localhost"}}), &options).unwrap();

        let ns = get_namespace("loader_tests");
        assert_eq!(ns.get("db.host"), Some(json!("localhost")));
    }

    #[test]
    #[serial]
    fn test_load_dict_without_flatten() {
        reset();
        let options = LoaderOptions::new()
            .with_namespace("loader_tests")
            .without_flatten();
        load_dict(json!({"db": {"host": "localhost"}}), &options).unwrap();

        let ns = get_namespace("loader_tests");
        assert_eq!(ns.get("db"), Some(json!({"host": "localhost"})));
    }

    #[test]
    #[serial]
    fn test_load_dict_rejects_non_map() {
        reset();
        let result = load_dict(json!([1, 2]), &LoaderOptions::new());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    #[serial]
    fn test_load_dict_duplicate_strict() {
        reset();
        let options = LoaderOptions::new()
            .with_namespace("loader_tests")
            .error_on_duplicate(true);
        load_dict(json!({"a": 1}), &options).unwrap();
        let result = load_dict(json!({"a": 2}), &options);
        assert!(matches!(result, Err(ConfigError::DuplicateKeys(_))));
        assert_eq!(get_namespace("loader_tests").get("a"), Some(json!(1)));
    }

    #[test]
    #[serial]
    fn test_load_json_file() {
        reset();
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"one": "A", "nested": {"two": 2}}"#).unwrap();

        json_loader(&path, "loader_tests").unwrap();
        let ns = get_namespace("loader_tests");
        assert_eq!(ns.get("one"), Some(json!("A")));
        assert_eq!(ns.get("nested.two"), Some(json!(2)));
    }

    #[test]
    #[serial]
    fn test_load_json_file_errors() {
        reset();
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            json_loader(&missing, "loader_tests"),
            Err(ConfigError::Io(_))
        ));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{not json").unwrap();
        assert!(matches!(
            json_loader(&broken, "loader_tests"),
            Err(ConfigError::Parse(_))
        ));
    }
}
