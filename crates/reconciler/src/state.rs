//! Persisted charm state.
//!
//! One record owns everything that survives between hook invocations. It is
//! passed by `&mut` into each pass, so two passes can never interleave.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zk_core::{Error, Result};

use crate::spec::PodSpec;
use crate::status::UnitStatus;
use crate::types::EndpointAdvertisement;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharmState {
    /// Last spec the platform accepted. Only written after a successful submit.
    pub applied_spec: Option<PodSpec>,
    /// Set once the host has delivered `start`.
    pub started: bool,
    /// Endpoint most recently published on the relation.
    pub advertised: Option<EndpointAdvertisement>,
    /// Last status written by a pass.
    pub status: UnitStatus,
}

impl CharmState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load state from `path`; a missing file yields fresh state.
    ///
    /// # Errors
    ///
    /// Returns `Error::State` if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                serde_json::from_str(&text).map_err(|e| Error::state(path, e.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(Error::state(path, e.to_string())),
        }
    }

    /// Write state to `path` as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::State` if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text =
            serde_json::to_string_pretty(self).map_err(|e| Error::state(path, e.to_string()))?;
        fs::write(path, text).map_err(|e| Error::state(path, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::config::CharmConfig;
    use crate::spec::derive_specification;

    #[test]
    fn test_load_missing_file_is_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = CharmState::load(&dir.path().join("state.json"));
        assert_eq!(state, Ok(CharmState::new()));
    }

    #[test]
    fn test_save_then_load_preserves_applied_spec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let config = CharmConfig {
            image: "zk:3.4".to_string(),
            client_port: 2181,
            server_port: 2888,
            leader_election_port: 3888,
            num_units: 3,
        };
        let state = CharmState {
            applied_spec: Some(derive_specification(&config, "zookeeper")),
            started: true,
            advertised: None,
            status: UnitStatus::active(),
        };

        state.save(&path).unwrap();
        assert_eq!(CharmState::load(&path), Ok(state));
    }

    #[test]
    fn test_load_corrupt_file_is_state_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(CharmState::load(&path), Err(Error::State { .. })));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let state: CharmState = serde_json::from_str(r#"{"started": true}"#).unwrap();
        assert!(state.started);
        assert_eq!(state.applied_spec, None);
        assert_eq!(state.status, UnitStatus::Unknown);
    }
}
