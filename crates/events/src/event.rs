//! Hook event types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zk_core::Error;

use crate::types::EventId;

/// Hooks this charm observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookKind {
    ConfigChanged,
    Start,
    UpgradeCharm,
}

impl HookKind {
    /// Every observed hook, in registration order.
    pub const ALL: [Self; 3] = [Self::ConfigChanged, Self::Start, Self::UpgradeCharm];

    /// Name the host uses for this hook.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigChanged => "config-changed",
            Self::Start => "start",
            Self::UpgradeCharm => "upgrade-charm",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Hosts sometimes pass the underscore form.
        let normalized = s.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| Error::unknown_hook(s))
    }
}

/// One hook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookEvent {
    pub event_id: EventId,
    pub kind: HookKind,
    pub received_at: DateTime<Utc>,
}

impl HookEvent {
    /// Stamp a new delivery of `kind`.
    #[must_use]
    pub fn new(kind: HookKind) -> Self {
        Self {
            event_id: EventId::new(),
            kind,
            received_at: Utc::now(),
        }
    }
}
