//! Eager readers
//!
//! Readers validate the current value immediately instead of returning a
//! proxy. They do not register keys with the namespace, so values read this
//! way are not reported as known keys.

use chrono::{NaiveDate, NaiveTime};

use crate::config::error::{ConfigError, Result};
use crate::config::registry::get_namespace;
use crate::config::types::Value;
use crate::config::validator::{
    build_list_type_validator, into_validator, validate_bool, validate_date, validate_float,
    validate_int, validate_list, validate_string, validate_time,
};

/// Read `key` from `namespace` and validate it with `validator`
pub fn read_with<T, F>(validator: F, key: &str, default: Option<T>, namespace: &str) -> Result<T>
where
    F: Fn(&Value) -> Result<T>,
{
    let config_namespace = get_namespace(namespace);
    match config_namespace.get(key) {
        Some(raw) => validator(&raw).map_err(|e| e.for_key(key)),
        None => default.ok_or_else(|| ConfigError::MissingValue {
            namespace: config_namespace.name().to_string(),
            key: key.to_string(),
        }),
    }
}

/// Read a string
pub fn read_string(key: &str, default: Option<String>, namespace: &str) -> Result<String> {
    read_with(validate_string, key, default, namespace)
}

/// Read an integer
pub fn read_int(key: &str, default: Option<i64>, namespace: &str) -> Result<i64> {
    read_with(validate_int, key, default, namespace)
}

/// Read a float
pub fn read_float(key: &str, default: Option<f64>, namespace: &str) -> Result<f64> {
    read_with(validate_float, key, default, namespace)
}

/// Read a boolean
pub fn read_bool(key: &str, default: Option<bool>, namespace: &str) -> Result<bool> {
    read_with(validate_bool, key, default, namespace)
}

/// Read a list of raw values
pub fn read_list(key: &str, default: Option<Vec<Value>>, namespace: &str) -> Result<Vec<Value>> {
    read_with(validate_list, key, default, namespace)
}

/// Read a list of strings
pub fn read_list_of_string(
    key: &str,
    default: Option<Vec<String>>,
    namespace: &str,
) -> Result<Vec<String>> {
    let validator = build_list_type_validator(into_validator(validate_string));
    read_with(|value: &Value| validator(value), key, default, namespace)
}

/// Read a time of day
pub fn read_time(key: &str, default: Option<NaiveTime>, namespace: &str) -> Result<NaiveTime> {
    read_with(validate_time, key, default, namespace)
}

/// Read a calendar date
pub fn read_date(key: &str, default: Option<NaiveDate>, namespace: &str) -> Result<NaiveDate> {
    read_with(validate_date, key, default, namespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use crate::config::registry::reset;

    #[test]
    #[serial]
    fn test_read_present_and_default() {
        reset();
        let ns = get_namespace("readers");
        ns.set_value("max_cycles", 12);
        ns.set_value("poller.init.start_id", "3");

        assert_eq!(read_int("max_cycles", None, "readers").unwrap(), 12);
        assert_eq!(read_int("poller.init.start_id", Some(0), "readers").unwrap(), 3);
        assert_eq!(read_int("missing", Some(0), "readers").unwrap(), 0);
    }

    #[test]
    #[serial]
    fn test_read_missing_value() {
        reset();
        let result = read_string("nope", None, "readers");
        assert!(matches!(result, Err(ConfigError::MissingValue { ref key, .. }) if key == "nope"));
    }

    #[test]
    #[serial]
    fn test_read_does_not_register_keys() {
        reset();
        let ns = get_namespace("readers");
        ns.set_value("names", json!(["a", "b"]));
        assert_eq!(
            read_list_of_string("names", None, "readers").unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(ns.get_known_keys().is_empty());
    }

    #[test]
    #[serial]
    fn test_read_invalid_value() {
        reset();
        get_namespace("readers").set_value("flag", "perhaps");
        let result = read_bool("flag", None, "readers");
        assert!(matches!(result, Err(ConfigError::InvalidValue(ref k, _)) if k == "flag"));
    }
}
