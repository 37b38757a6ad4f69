//! Opaque container configuration snapshots.
//!
//! Descriptors embed the runtime configuration of the container they were
//! committed from (`container_config`) and the defaults applied when the
//! image is run (`config`). Both are owned by the container runtime; this
//! crate carries them verbatim and only offers read-only lookups.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque container configuration object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerConfig(Map<String, Value>);

impl ContainerConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a raw key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns true if the object has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the configuration and return the JSON object.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Default user (`User`).
    #[must_use]
    pub fn user(&self) -> Option<&str> {
        self.string("User")
    }

    /// Working directory (`WorkingDir`).
    #[must_use]
    pub fn working_dir(&self) -> Option<&str> {
        self.string("WorkingDir")
    }

    /// Default command (`Cmd`).
    #[must_use]
    pub fn cmd(&self) -> Option<Vec<&str>> {
        self.strings("Cmd")
    }

    /// Entrypoint (`Entrypoint`).
    #[must_use]
    pub fn entrypoint(&self) -> Option<Vec<&str>> {
        self.strings("Entrypoint")
    }

    /// Environment entries (`Env`) in `KEY=value` form.
    #[must_use]
    pub fn env(&self) -> Vec<&str> {
        self.strings("Env").unwrap_or_default()
    }

    /// Value of a single environment variable.
    #[must_use]
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env().into_iter().find_map(|entry| {
            entry
                .split_once('=')
                .filter(|(key, _)| *key == name)
                .map(|(_, value)| value)
        })
    }

    /// String-valued labels (`Labels`).
    #[must_use]
    pub fn labels(&self) -> BTreeMap<&str, &str> {
        self.get("Labels")
            .and_then(Value::as_object)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    // Non-string members are skipped rather than rejected.
    fn strings(&self, key: &str) -> Option<Vec<&str>> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
    }
}

impl From<Map<String, Value>> for ContainerConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
