//! Help and introspection for configuration keys
//!
//! Every getter records a [`KeyDescription`] here so a human-readable
//! listing of all known keys can be produced, grouped by namespace with
//! `DEFAULT` first and the rest in alphabetical order.

use std::collections::BTreeMap;
use std::sync::RwLock;
use once_cell::sync::Lazy;

use crate::common::sync::{read, write};
use crate::config::defaults::{DEFAULT, NO_DEFAULT_STR};

/// Description of one configuration key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDescription {
    /// Key name
    pub name: String,
    /// Name of the validator's type, e.g. `int`
    pub type_name: String,
    /// Rendered default, if any
    pub default: Option<String>,
    /// Free-form help text
    pub help: Option<String>,
}

impl KeyDescription {
    fn format(&self) -> String {
        format!(
            "{} (Type: {}, Default: {})\n{}",
            self.name,
            self.type_name,
            self.default.as_deref().unwrap_or(NO_DEFAULT_STR),
            self.help.as_deref().unwrap_or(""),
        )
    }
}

/// Registry of key descriptions, grouped by namespace
#[derive(Debug, Default)]
pub struct ConfigHelp {
    descriptions: RwLock<BTreeMap<String, Vec<KeyDescription>>>,
}

impl ConfigHelp {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a description
    pub fn add(
        &self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        default: Option<String>,
        namespace: impl Into<String>,
        help: Option<String>,
    ) {
        let desc = KeyDescription {
            name: name.into(),
            type_name: type_name.into(),
            default,
            help,
        };
        write(&self.descriptions)
            .entry(namespace.into())
            .or_default()
            .push(desc);
    }

    /// Add a description unless the key is already described in `namespace`
    pub fn register(
        &self,
        name: &str,
        type_name: &str,
        default: Option<String>,
        namespace: &str,
    ) {
        let mut descriptions = write(&self.descriptions);
        let entries = descriptions.entry(namespace.to_string()).or_default();
        if entries.iter().any(|desc| desc.name == name) {
            return;
        }
        entries.push(KeyDescription {
            name: name.to_string(),
            type_name: type_name.to_string(),
            default,
            help: None,
        });
    }

    /// Set the help text of a described key, describing it first if needed
    pub fn set_help(&self, namespace: &str, name: &str, help: impl Into<String>) {
        let help = help.into();
        let mut descriptions = write(&self.descriptions);
        let entries = descriptions.entry(namespace.to_string()).or_default();
        match entries.iter_mut().find(|desc| desc.name == name) {
            Some(desc) => desc.help = Some(help),
            None => entries.push(KeyDescription {
                name: name.to_string(),
                type_name: "unknown".to_string(),
                default: None,
                help: Some(help),
            }),
        }
    }

    /// Descriptions in display order: `DEFAULT` first, then by name
    pub fn descriptions(&self) -> Vec<(String, Vec<KeyDescription>)> {
        let mut groups: Vec<(String, Vec<KeyDescription>)> = read(&self.descriptions)
            .iter()
            .map(|(namespace, descs)| (namespace.clone(), descs.clone()))
            .collect();
        groups.sort_by(|(a, _), (b, _)| (a != DEFAULT, a).cmp(&(b != DEFAULT, b)));
        groups
    }

    /// Render a help message describing every registered key
    pub fn view_help(&self) -> String {
        self.descriptions()
            .iter()
            .map(|(namespace, descs)| {
                let mut lines: Vec<String> = descs.iter().map(KeyDescription::format).collect();
                lines.sort();
                format!("\nNamespace: {}\n{}", namespace, lines.join("\n"))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Remove all descriptions
    pub fn clear(&self) {
        write(&self.descriptions).clear();
    }
}

static CONFIG_HELP: Lazy<ConfigHelp> = Lazy::new(ConfigHelp::new);

/// The process-wide help registry
pub fn config_help() -> &'static ConfigHelp {
    &CONFIG_HELP
}

/// Render help for every key registered in this process
pub fn view_help() -> String {
    CONFIG_HELP.view_help()
}
