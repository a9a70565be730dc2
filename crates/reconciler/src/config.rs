//! Charm configuration: the raw key/value bag and its validated form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zk_core::{Error, Result};

/// Container image reference.
pub const KEY_IMAGE: &str = "image";
/// Port clients connect on.
pub const KEY_CLIENT_PORT: &str = "client-port";
/// Port followers use to talk to the leader.
pub const KEY_SERVER_PORT: &str = "server-port";
/// Port used during leader election.
pub const KEY_LEADER_ELECTION_PORT: &str = "leader-election-port";
/// Number of ensemble members.
pub const KEY_NUM_UNITS: &str = "num-units";

/// Untyped configuration as delivered by the host.
///
/// Nothing is checked here; [`CharmConfig::from_raw`] is the single place a
/// raw bag becomes trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig(BTreeMap<String, Value>);

impl RawConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove a key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Look up a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Parse a YAML mapping of config keys.
    ///
    /// # Errors
    ///
    /// Returns `Error::Serialization` if the text is not a YAML mapping.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::Serialization {
            reason: e.to_string(),
        })
    }
}

/// Validated charm configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CharmConfig {
    pub image: String,
    pub client_port: u16,
    pub server_port: u16,
    pub leader_election_port: u16,
    pub num_units: u32,
}

impl CharmConfig {
    /// Validate a raw configuration bag.
    ///
    /// Keys are checked in a fixed order so the reported key is stable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` naming the first missing or malformed key.
    pub fn from_raw(raw: &RawConfig) -> Result<Self> {
        Ok(Self {
            image: require_string(raw, KEY_IMAGE)?,
            client_port: require_port(raw, KEY_CLIENT_PORT)?,
            server_port: require_port(raw, KEY_SERVER_PORT)?,
            leader_election_port: require_port(raw, KEY_LEADER_ELECTION_PORT)?,
            num_units: require_count(raw, KEY_NUM_UNITS)?,
        })
    }
}

fn require<'a>(raw: &'a RawConfig, key: &str) -> Result<&'a Value> {
    raw.get(key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| Error::configuration(key, "required key is missing"))
}

fn require_string(raw: &RawConfig, key: &str) -> Result<String> {
    match require(raw, key)? {
        Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
        Value::String(_) => Err(Error::configuration(key, "must not be empty")),
        other => Err(Error::configuration(
            key,
            format!("expected a string, got {}", type_name(other)),
        )),
    }
}

fn require_integer(raw: &RawConfig, key: &str) -> Result<i64> {
    let value = require(raw, key)?;
    value.as_i64().ok_or_else(|| {
        Error::configuration(key, format!("expected an integer, got {}", type_name(value)))
    })
}

fn require_port(raw: &RawConfig, key: &str) -> Result<u16> {
    let n = require_integer(raw, key)?;
    u16::try_from(n)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| Error::configuration(key, format!("port {n} is outside 1-65535")))
}

fn require_count(raw: &RawConfig, key: &str) -> Result<u32> {
    let n = require_integer(raw, key)?;
    u32::try_from(n)
        .ok()
        .filter(|count| *count >= 1)
        .ok_or_else(|| Error::configuration(key, format!("must be at least 1, got {n}")))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a float",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
