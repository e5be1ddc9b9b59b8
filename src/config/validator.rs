//! Value validators
//!
//! Each validator converts a raw [`Value`] into a typed value or rejects it
//! with [`ConfigError::Validation`]. Getters and readers pair a validator
//! with a key; the key is attached to the error when a proxy resolves.

use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime};
use log::LevelFilter;

use crate::config::error::{ConfigError, Result};
use crate::config::types::{Validator, Value};

fn invalid(expected: &str, value: &Value) -> ConfigError {
    ConfigError::Validation(format!("{} is not a valid {}", value, expected))
}

/// Accept any value unchanged
pub fn validate_any(value: &Value) -> Result<Value> {
    Ok(value.clone())
}

/// Strings, numbers and booleans are accepted and rendered as text
pub fn validate_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(invalid("string", value)),
    }
}

/// Integers, or strings holding an integer
pub fn validate_int(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| invalid("int", value)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid("int", value)),
        _ => Err(invalid("int", value)),
    }
}

/// Numbers, or strings holding a number
pub fn validate_float(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| invalid("float", value)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid("float", value)),
        _ => Err(invalid("float", value)),
    }
}

/// Booleans, or one of true/false/yes/no/on/off/1/0 in any case
pub fn validate_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(invalid("bool", value)),
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(invalid("bool", value)),
        },
        _ => Err(invalid("bool", value)),
    }
}

/// A sequence of raw values
pub fn validate_list(value: &Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        _ => Err(invalid("list", value)),
    }
}

/// `HH:MM` or `HH:MM:SS`
pub fn validate_time(value: &Value) -> Result<NaiveTime> {
    let text = value.as_str().ok_or_else(|| invalid("time", value))?;
    NaiveTime::parse_from_str(text, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M"))
        .map_err(|_| invalid("time", value))
}

/// `YYYY-MM-DD`
pub fn validate_date(value: &Value) -> Result<NaiveDate> {
    let text = value.as_str().ok_or_else(|| invalid("date", value))?;
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid("date", value))
}

/// A log level name such as `info` or `debug`
pub fn validate_log_level(value: &Value) -> Result<LevelFilter> {
    let text = value.as_str().ok_or_else(|| invalid("log level", value))?;
    text.trim().parse().map_err(|_| invalid("log level", value))
}

/// Wrap a validation function as a shareable [`Validator`]
pub fn into_validator<T, F>(f: F) -> Validator<T>
where
    F: Fn(&Value) -> Result<T> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Build a validator for a list whose items all pass `item`
pub fn build_list_type_validator<T>(item: Validator<T>) -> Validator<Vec<T>>
where
    T: 'static,
{
    into_validator(move |value: &Value| -> Result<Vec<T>> {
        validate_list(value)?
            .iter()
            .map(|v| item(v))
            .collect()
    })
}

/// Wrap a validator so that `null` resolves to `None`
pub fn build_optional_validator<T>(inner: Validator<T>) -> Validator<Option<T>>
where
    T: 'static,
{
    into_validator(move |value: &Value| -> Result<Option<T>> {
        match value {
            Value::Null => Ok(None),
            other => inner(other).map(Some),
        }
    })
}
