//! Typed accessors returning value proxies
//!
//! Each getter takes a key and an optional default and returns a
//! [`ValueProxy`] bound to a namespace. The free functions read from the
//! `DEFAULT` namespace; [`NamespaceGetters`] reads from a named one.
//!
//! ```
//! use liveconf::config::{get_int, NamespaceGetters};
//!
//! let max_cycles = get_int("max_cycles", Some(10));
//! let currency = NamespaceGetters::new("bling").get_string("currency", None);
//! ```

use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use log::LevelFilter;
use serde::Serialize;

use crate::config::defaults::{DEFAULT, NO_DEFAULT_STR};
use crate::config::help::config_help;
use crate::config::proxy::ValueProxy;
use crate::config::registry::get_namespace;
use crate::config::types::{Validator, Value};
use crate::config::validator::{
    build_list_type_validator, build_optional_validator, into_validator, validate_any,
    validate_bool, validate_date, validate_float, validate_int, validate_log_level,
    validate_list, validate_string, validate_time,
};

/// Render a default for help output. Strings appear without quotes; `null`
/// renders like a missing default.
fn render_default<T: Serialize>(default: &T) -> String {
    match serde_json::to_value(default) {
        Ok(Value::String(s)) => s,
        Ok(Value::Null) | Err(_) => NO_DEFAULT_STR.to_string(),
        Ok(other) => other.to_string(),
    }
}

/// A validator paired with the type name shown in help output
pub struct Getter<T> {
    type_name: &'static str,
    validator: Validator<T>,
}

/// Create a getter for a custom validator
pub fn build_getter<T>(type_name: &'static str, validator: Validator<T>) -> Getter<T> {
    Getter { type_name, validator }
}

impl<T> Getter<T>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    /// Create a proxy for `key` in `namespace`, describing the key for help output
    pub fn get(&self, key: &str, default: Option<T>, namespace: &str) -> ValueProxy<T> {
        let rendered_default = default.as_ref().map(render_default);
        config_help().register(key, self.type_name, rendered_default, namespace);
        ValueProxy::new(
            get_namespace(namespace),
            key,
            Arc::clone(&self.validator),
            default,
        )
    }
}

/// Getters bound to one namespace
#[derive(Debug, Clone)]
pub struct NamespaceGetters {
    namespace: String,
}

impl NamespaceGetters {
    /// Getters reading from `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Namespace these getters read from
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Proxy for a key with a custom getter
    pub fn get_with<T>(&self, getter: &Getter<T>, key: &str, default: Option<T>) -> ValueProxy<T>
    where
        T: Clone + Serialize + Send + Sync + 'static,
    {
        getter.get(key, default, &self.namespace)
    }

    fn typed<T>(
        &self,
        type_name: &'static str,
        validator: Validator<T>,
        key: &str,
        default: Option<T>,
    ) -> ValueProxy<T>
    where
        T: Clone + Serialize + Send + Sync + 'static,
    {
        build_getter(type_name, validator).get(key, default, &self.namespace)
    }

    /// Any value, unvalidated
    pub fn get(&self, key: &str, default: Option<Value>) -> ValueProxy<Value> {
        self.typed("any", into_validator(validate_any), key, default)
    }

    /// A string
    pub fn get_string(&self, key: &str, default: Option<String>) -> ValueProxy<String> {
        self.typed("string", into_validator(validate_string), key, default)
    }

    /// An integer
    pub fn get_int(&self, key: &str, default: Option<i64>) -> ValueProxy<i64> {
        self.typed("int", into_validator(validate_int), key, default)
    }

    /// A float
    pub fn get_float(&self, key: &str, default: Option<f64>) -> ValueProxy<f64> {
        self.typed("float", into_validator(validate_float), key, default)
    }

    /// A boolean
    pub fn get_bool(&self, key: &str, default: Option<bool>) -> ValueProxy<bool> {
        self.typed("bool", into_validator(validate_bool), key, default)
    }

    /// A list of raw values
    pub fn get_list(&self, key: &str, default: Option<Vec<Value>>) -> ValueProxy<Vec<Value>> {
        self.typed("list", into_validator(validate_list), key, default)
    }

    /// A list of strings
    pub fn get_list_of_string(
        &self,
        key: &str,
        default: Option<Vec<String>>,
    ) -> ValueProxy<Vec<String>> {
        let validator = build_list_type_validator(into_validator(validate_string));
        self.typed("list_of_string", validator, key, default)
    }

    /// A list of integers
    pub fn get_list_of_int(&self, key: &str, default: Option<Vec<i64>>) -> ValueProxy<Vec<i64>> {
        let validator = build_list_type_validator(into_validator(validate_int));
        self.typed("list_of_int", validator, key, default)
    }

    /// A time of day
    pub fn get_time(&self, key: &str, default: Option<NaiveTime>) -> ValueProxy<NaiveTime> {
        self.typed("time", into_validator(validate_time), key, default)
    }

    /// A calendar date
    pub fn get_date(&self, key: &str, default: Option<NaiveDate>) -> ValueProxy<NaiveDate> {
        self.typed("date", into_validator(validate_date), key, default)
    }

    /// A log level
    pub fn get_log_level(
        &self,
        key: &str,
        default: Option<LevelFilter>,
    ) -> ValueProxy<LevelFilter> {
        self.typed("log_level", into_validator(validate_log_level), key, default)
    }

    /// A string that may be absent; resolves to `None` when missing or null
    pub fn get_optional_string(&self, key: &str) -> ValueProxy<Option<String>> {
        let validator = build_optional_validator(into_validator(validate_string));
        self.typed("string", validator, key, Some(None))
    }

    /// An integer that may be absent; resolves to `None` when missing or null
    pub fn get_optional_int(&self, key: &str) -> ValueProxy<Option<i64>> {
        let validator = build_optional_validator(into_validator(validate_int));
        self.typed("int", validator, key, Some(None))
    }
}

fn default_getters() -> NamespaceGetters {
    NamespaceGetters::new(DEFAULT)
}

/// Any value from `DEFAULT`
pub fn get(key: &str, default: Option<Value>) -> ValueProxy<Value> {
    default_getters().get(key, default)
}

/// A string from `DEFAULT`
pub fn get_string(key: &str, default: Option<String>) -> ValueProxy<String> {
    default_getters().get_string(key, default)
}

/// An integer from `DEFAULT`
pub fn get_int(key: &str, default: Option<i64>) -> ValueProxy<i64> {
    default_getters().get_int(key, default)
}

/// A float from `DEFAULT`
pub fn get_float(key: &str, default: Option<f64>) -> ValueProxy<f64> {
    default_getters().get_float(key, default)
}

/// A boolean from `DEFAULT`
pub fn get_bool(key: &str, default: Option<bool>) -> ValueProxy<bool> {
    default_getters().get_bool(key, default)
}

/// A list from `DEFAULT`
pub fn get_list(key: &str, default: Option<Vec<Value>>) -> ValueProxy<Vec<Value>> {
    default_getters().get_list(key, default)
}

/// A list of strings from `DEFAULT`
pub fn get_list_of_string(key: &str, default: Option<Vec<String>>) -> ValueProxy<Vec<String>> {
    default_getters().get_list_of_string(key, default)
}

/// A list of integers from `DEFAULT`
pub fn get_list_of_int(key: &str, default: Option<Vec<i64>>) -> ValueProxy<Vec<i64>> {
    default_getters().get_list_of_int(key, default)
}

/// A time of day from `DEFAULT`
pub fn get_time(key: &str, default: Option<NaiveTime>) -> ValueProxy<NaiveTime> {
    default_getters().get_time(key, default)
}

/// A calendar date from `DEFAULT`
pub fn get_date(key: &str, default: Option<NaiveDate>) -> ValueProxy<NaiveDate> {
    default_getters().get_date(key, default)
}

/// A log level from `DEFAULT`
pub fn get_log_level(key: &str, default: Option<LevelFilter>) -> ValueProxy<LevelFilter> {
    default_getters().get_log_level(key, default)
}

/// An optional string from `DEFAULT`
pub fn get_optional_string(key: &str) -> ValueProxy<Option<String>> {
    default_getters().get_optional_string(key)
}

/// An optional integer from `DEFAULT`
pub fn get_optional_int(key: &str) -> ValueProxy<Option<i64>> {
    default_getters().get_optional_int(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use crate::config::error::ConfigError;
    use crate::config::registry::reset;
    use crate::config::types::config_data;

    #[test]
    #[serial]
    fn test_getters_read_default_namespace() {
        reset();
        let port = get_int("port", None);
        let debug = get_bool("debug", Some(false));
        let hosts = get_list_of_string("hosts", None);

        get_namespace(DEFAULT)
            .apply_config_data(
                &config_data([("port", json!("8080")), ("hosts", json!(["a", "b"]))]),
                false,
                false,
            )
            .unwrap();

        assert_eq!(port.value().unwrap(), 8080);
        assert!(!debug.value().unwrap());
        assert_eq!(hosts.value().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    #[serial]
    fn test_namespace_getters() {
        reset();
        let getters = NamespaceGetters::new("bling");
        let currency = getters.get_string("currency", None);
        let value = getters.get_float("value", Some(1.0));

        get_namespace("bling")
            .apply_config_data(&config_data([("currency", "usd")]), false, false)
            .unwrap();

        assert!(currency == "usd");
        assert_eq!(value.value().unwrap(), 1.0);
        assert_eq!(currency.namespace(), "bling");
    }

    #[test]
    #[serial]
    fn test_optional_getters() {
        reset();
        let name = get_optional_string("name");
        assert_eq!(name.value().unwrap(), None);

        get_namespace(DEFAULT)
            .apply_config_data(&config_data([("name", "ada")]), false, false)
            .unwrap();
        assert_eq!(name.value().unwrap(), Some("ada".to_string()));
    }

    #[test]
    #[serial]
    fn test_getter_registers_help() {
        reset();
        let _port = get_int("port", Some(80)).with_help("listen port");
        let text = config_help().view_help();
        assert!(text.contains("port (Type: int, Default: 80)"));
        assert!(text.contains("listen port"));
    }

    #[test]
    #[serial]
    fn test_help_renders_plain_defaults() {
        reset();
        let _name = get_string("name", Some("bob".to_string()));
        let _hosts = get_list_of_string("hosts", Some(vec!["a".to_string()]));
        let _nick = get_optional_string("nick");
        let _level = get_log_level("level", Some(LevelFilter::Warn));

        let text = config_help().view_help();
        assert!(text.contains("name (Type: string, Default: bob)"));
        assert!(text.contains(r#"hosts (Type: list_of_string, Default: ["a"])"#));
        assert!(text.contains("nick (Type: string, Default: None)"));
        assert!(text.contains("level (Type: log_level, Default: WARN)"));
    }

    #[test]
    #[serial]
    fn test_custom_getter() {
        reset();
        let upper = build_getter(
            "upper",
            into_validator(|value: &Value| {
                validate_string(value).map(|s| s.to_uppercase())
            }),
        );
        let proxy = NamespaceGetters::new(DEFAULT).get_with(&upper, "shout", None);
        get_namespace(DEFAULT).set_value("shout", "hey");
        assert_eq!(proxy.value().unwrap(), "HEY");
    }

    #[test]
    #[serial]
    fn test_type_mismatch_is_configuration_error() {
        reset();
        let when = get_time("when", None);
        get_namespace(DEFAULT).set_value("when", "noon");
        assert!(matches!(when.value(), Err(ConfigError::InvalidValue(ref k, _)) if k == "when"));
    }
}
