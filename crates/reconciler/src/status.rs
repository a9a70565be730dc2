//! Unit status indicator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Workload status reported to the host, with a free-text message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum UnitStatus {
    /// No pass has written a status yet.
    #[default]
    Unknown,
    Maintenance(String),
    Active(String),
    Blocked(String),
    Waiting(String),
}

impl UnitStatus {
    pub fn maintenance(message: impl Into<String>) -> Self {
        Self::Maintenance(message.into())
    }

    /// Active with an empty message.
    #[must_use]
    pub const fn active() -> Self {
        Self::Active(String::new())
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        Self::Blocked(message.into())
    }

    pub fn waiting(message: impl Into<String>) -> Self {
        Self::Waiting(message.into())
    }

    /// Host-facing status name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Maintenance(_) => "maintenance",
            Self::Active(_) => "active",
            Self::Blocked(_) => "blocked",
            Self::Waiting(_) => "waiting",
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unknown => "",
            Self::Maintenance(m) | Self::Active(m) | Self::Blocked(m) | Self::Waiting(m) => m,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message().is_empty() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}: {}", self.name(), self.message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(UnitStatus::active().to_string(), "active");
        assert_eq!(
            UnitStatus::maintenance("Applying pod spec").to_string(),
            "maintenance: Applying pod spec"
        );
    }

    #[test]
    fn test_only_active_is_active() {
        assert!(UnitStatus::active().is_active());
        assert!(UnitStatus::Active("serving".to_string()).is_active());
        assert!(!UnitStatus::blocked("x").is_active());
        assert!(!UnitStatus::waiting("x").is_active());
        assert!(!UnitStatus::Unknown.is_active());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&UnitStatus::blocked("bad port")).unwrap_or_default();
        assert_eq!(json, r#"{"status":"blocked","message":"bad port"}"#);
    }
}
