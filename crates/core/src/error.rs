//! Error taxonomy for charm operations.
//!
//! Every failure is explicit and typed. Configuration and submission failures
//! are surfaced to operators through the unit status, never through a panic.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for charm operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// A required configuration key is missing or malformed.
    #[error("invalid configuration key '{key}': {reason}")]
    Configuration { key: String, reason: String },

    /// The platform rejected the pod spec or could not be reached.
    #[error("failed to apply pod spec: {reason}")]
    Submission { reason: String },

    /// The status sink refused a status update.
    #[error("failed to set unit status: {reason}")]
    Status { reason: String },

    /// Relation data could not be published.
    #[error("failed to publish relation data: {reason}")]
    Relation { reason: String },

    /// Persisted charm state could not be loaded or saved.
    #[error("charm state at '{path}': {reason}")]
    State { path: PathBuf, reason: String },

    /// The host delivered a hook this charm does not observe.
    #[error("unknown hook '{name}'")]
    UnknownHook { name: String },

    /// A reconciler was assembled without a required capability.
    #[error("invalid setup: {reason}")]
    InvalidSetup { reason: String },

    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl Error {
    /// Create a configuration error for `key`.
    pub fn configuration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a submission error.
    pub fn submission(reason: impl Into<String>) -> Self {
        Self::Submission {
            reason: reason.into(),
        }
    }

    /// Create a status sink error.
    pub fn status(reason: impl Into<String>) -> Self {
        Self::Status {
            reason: reason.into(),
        }
    }

    /// Create a relation error.
    pub fn relation(reason: impl Into<String>) -> Self {
        Self::Relation {
            reason: reason.into(),
        }
    }

    /// Create a state persistence error.
    pub fn state(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::State {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown hook error.
    pub fn unknown_hook(name: impl Into<String>) -> Self {
        Self::UnknownHook { name: name.into() }
    }

    /// Create an invalid setup error.
    pub fn invalid_setup(reason: impl Into<String>) -> Self {
        Self::InvalidSetup {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_display_names_key() {
        let err = Error::configuration("client-port", "expected an integer");
        let text = err.to_string();
        assert!(text.contains("client-port"));
        assert!(text.contains("expected an integer"));
    }

    #[test]
    fn test_capability_errors_name_their_surface() {
        assert_eq!(
            Error::submission("connection refused").to_string(),
            "failed to apply pod spec: connection refused"
        );
        assert_eq!(
            Error::status("sink closed").to_string(),
            "failed to set unit status: sink closed"
        );
    }

    #[test]
    fn test_serde_json_error_converts() {
        let parsed: std::result::Result<u16, serde_json::Error> = serde_json::from_str("nope");
        let err = parsed.map_err(Error::from);
        assert!(matches!(err, Err(Error::Serialization { .. })));
    }
}
