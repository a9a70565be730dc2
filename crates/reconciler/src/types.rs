//! Core types for the reconciler.

use serde::{Deserialize, Serialize};

use crate::status::UnitStatus;

/// What triggered a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PassTrigger {
    ConfigChanged,
    Start,
    UpgradeCharm,
}

impl PassTrigger {
    /// Maintenance messages shown, in order, while the pass applies a spec.
    ///
    /// An upgrade is a restart, so it announces itself and then the start.
    #[must_use]
    pub const fn maintenance_messages(self) -> &'static [&'static str] {
        match self {
            Self::ConfigChanged => &["Applying new pod spec"],
            Self::Start => &["Applying pod spec"],
            Self::UpgradeCharm => &["Upgrading charm", "Applying pod spec"],
        }
    }

    /// Whether the leader submits even when the spec matches the applied one.
    #[must_use]
    pub const fn forces_apply(self) -> bool {
        matches!(self, Self::Start | Self::UpgradeCharm)
    }
}

/// Connection data published for dependent clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointAdvertisement {
    pub host: String,
    pub port: u16,
}

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum ReconcileOutcome {
    /// Derived spec equals the applied spec; nothing was touched.
    Unchanged,
    /// The leader submitted a new spec and recorded it.
    Applied,
    /// A new spec was derived but this unit is not the leader.
    SkippedNotLeader,
    /// Configuration could not be validated.
    InvalidConfig { reason: String },
    /// The platform refused or could not be reached.
    SubmissionFailed { reason: String },
}

impl ReconcileOutcome {
    /// Whether the pass left the workload converged from this unit's view.
    #[must_use]
    pub const fn is_converged(&self) -> bool {
        matches!(self, Self::Unchanged | Self::Applied)
    }
}

/// Report of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub trigger: PassTrigger,
    pub outcome: ReconcileOutcome,
    /// Every status written during the pass, in order.
    pub statuses: Vec<UnitStatus>,
    /// Status after the pass.
    pub status: UnitStatus,
    /// Whether the platform was called.
    pub submitted: bool,
    /// Endpoint published during the pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertised: Option<EndpointAdvertisement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_error: Option<String>,
}

impl ReconcileReport {
    /// Start an empty report for `trigger`, carrying the current status.
    #[must_use]
    pub fn new(trigger: PassTrigger, status: UnitStatus) -> Self {
        Self {
            trigger,
            outcome: ReconcileOutcome::Unchanged,
            statuses: Vec::new(),
            status,
            submitted: false,
            advertised: None,
            publish_error: None,
        }
    }

    /// Whether any status was written.
    #[must_use]
    pub fn status_changed(&self) -> bool {
        !self.statuses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maintenance_messages() {
        assert_eq!(
            PassTrigger::ConfigChanged.maintenance_messages(),
            &["Applying new pod spec"]
        );
        assert_eq!(PassTrigger::Start.maintenance_messages(), &["Applying pod spec"]);
        assert_eq!(
            PassTrigger::UpgradeCharm.maintenance_messages(),
            &["Upgrading charm", "Applying pod spec"]
        );
    }

    #[test]
    fn test_only_lifecycle_hooks_force_apply() {
        assert!(!PassTrigger::ConfigChanged.forces_apply());
        assert!(PassTrigger::Start.forces_apply());
        assert!(PassTrigger::UpgradeCharm.forces_apply());
    }

    #[test]
    fn test_outcome_convergence() {
        assert!(ReconcileOutcome::Applied.is_converged());
        assert!(!ReconcileOutcome::SkippedNotLeader.is_converged());
        assert!(!ReconcileOutcome::SubmissionFailed {
            reason: "down".to_string()
        }
        .is_converged());
    }

    #[test]
    fn test_new_report_is_quiet() {
        let report = ReconcileReport::new(PassTrigger::Start, UnitStatus::active());
        assert!(!report.status_changed());
        assert!(!report.submitted);
        assert_eq!(report.outcome, ReconcileOutcome::Unchanged);
    }
}
