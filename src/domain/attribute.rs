//! Node attributes.
//!
//! The well-known keys (`parameters`, `type`, `change_log`) get typed slots;
//! anything else lands in `extra` as raw JSON.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub const PARAMETERS_KEY: &str = "parameters";
pub const TYPE_KEY: &str = "type";
pub const CHANGE_LOG_KEY: &str = "change_log";

fn is_reserved(key: &str) -> bool {
    matches!(key, PARAMETERS_KEY | TYPE_KEY | CHANGE_LOG_KEY)
}

/// A single attribute write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum Attribute {
    Parameters(Vec<String>),
    #[serde(rename = "type")]
    TypeName(String),
    ChangeLog(Vec<String>),
    Custom(String, serde_json::Value),
}

impl Attribute {
    /// Map a textual key/value pair onto the typed union.
    pub fn from_key_value(key: &str, value: serde_json::Value) -> Result<Self> {
        match key {
            PARAMETERS_KEY => {
                let params: Vec<String> = serde_json::from_value(value)
                    .map_err(|e| anyhow!("'{}' must be a list of strings: {}", key, e))?;
                Ok(Attribute::Parameters(params))
            }
            TYPE_KEY => match value {
                serde_json::Value::String(s) => Ok(Attribute::TypeName(s)),
                other => Err(anyhow!("'{}' must be a string, got {}", key, other)),
            },
            CHANGE_LOG_KEY => {
                let log: Vec<String> = serde_json::from_value(value)
                    .map_err(|e| anyhow!("'{}' must be a list of strings: {}", key, e))?;
                Ok(Attribute::ChangeLog(log))
            }
            _ => Ok(Attribute::Custom(key.to_string(), value)),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Attribute::Parameters(_) => PARAMETERS_KEY,
            Attribute::TypeName(_) => TYPE_KEY,
            Attribute::ChangeLog(_) => CHANGE_LOG_KEY,
            Attribute::Custom(key, _) => key,
        }
    }
}

/// Attribute map of one node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_log: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Attributes {
    pub fn set(&mut self, attribute: Attribute) {
        match attribute {
            Attribute::Parameters(p) => self.parameters = Some(p),
            Attribute::TypeName(t) => self.type_name = Some(t),
            Attribute::ChangeLog(l) => self.change_log = Some(l),
            Attribute::Custom(key, value) if is_reserved(&key) => {
                match Attribute::from_key_value(&key, value) {
                    Ok(typed) => self.set(typed),
                    Err(e) => warn!("Dropping attribute write: {}", e),
                }
            }
            Attribute::Custom(key, value) => {
                self.extra.insert(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Attribute> {
        match key {
            PARAMETERS_KEY => self.parameters.clone().map(Attribute::Parameters),
            TYPE_KEY => self.type_name.clone().map(Attribute::TypeName),
            CHANGE_LOG_KEY => self.change_log.clone().map(Attribute::ChangeLog),
            _ => self
                .extra
                .get(key)
                .map(|v| Attribute::Custom(key.to_string(), v.clone())),
        }
    }

    /// Append to the change log, creating it when absent.
    pub fn log_change(&mut self, entry: impl Into<String>) {
        self.change_log.get_or_insert_with(Vec::new).push(entry.into());
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_none()
            && self.type_name.is_none()
            && self.change_log.is_none()
            && self.extra.is_empty()
    }
}
