//! Reconciler implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zk_core::{Error, Result, ResultExt};

use crate::config::{CharmConfig, RawConfig};
use crate::platform::{RelationChannel, SpecSink, StatusSink};
use crate::spec::{derive_specification, PodSpec};
use crate::state::CharmState;
use crate::status::UnitStatus;
use crate::types::{EndpointAdvertisement, PassTrigger, ReconcileOutcome, ReconcileReport};

/// Relation key carrying the advertised host.
pub const RELATION_KEY_HOST: &str = "host";
/// Relation key carrying the advertised client port.
pub const RELATION_KEY_PORT: &str = "port";

const NON_LEADER_MESSAGE: &str = "Waiting for leader to apply pod spec";

/// Status a non-leader reports when it detects a spec change it may not apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonLeaderPolicy {
    /// Maintenance, then Waiting.
    #[default]
    Waiting,
    /// Write nothing; the unit keeps whatever status it had.
    Unchanged,
}

/// Configuration for the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Application name; names the container and the advertised host.
    pub app_name: String,
    pub non_leader_policy: NonLeaderPolicy,
    /// Publish `{host, port}` on the relation after every successful apply.
    pub advertise_endpoint: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            app_name: "zookeeper".to_string(),
            non_leader_policy: NonLeaderPolicy::default(),
            advertise_endpoint: false,
        }
    }
}

/// K8s-style reconciler for the Zookeeper pod spec.
pub struct Reconciler {
    sink: Arc<dyn SpecSink>,
    status: Arc<dyn StatusSink>,
    relation: Option<Arc<dyn RelationChannel>>,
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Core reconciliation: derive the desired spec and converge the applied one.
    ///
    /// Configuration and submission failures end the pass in `Blocked` and are
    /// reported through the returned outcome; `state.applied_spec` is only
    /// replaced after the platform accepts the new spec. A `config-changed`
    /// pass whose spec matches the applied one never calls the platform;
    /// `start` and `upgrade-charm` always re-submit on the leader.
    ///
    /// # Errors
    ///
    /// Returns `Error::Status` if the status sink rejects an update.
    pub async fn reconcile(
        &self,
        raw: &RawConfig,
        state: &mut CharmState,
        is_leader: bool,
        trigger: PassTrigger,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::new(trigger, state.status.clone());

        let config = match CharmConfig::from_raw(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(trigger = ?trigger, error = %e, "Configuration rejected");
                self.write_status(state, &mut report, UnitStatus::blocked(e.to_string()))
                    .await?;
                report.outcome = ReconcileOutcome::InvalidConfig {
                    reason: e.to_string(),
                };
                return Ok(report);
            }
        };

        let candidate = derive_specification(&config, &self.config.app_name);
        let matches_applied = state.applied_spec.as_ref() == Some(&candidate);

        if matches_applied && !trigger.forces_apply() {
            debug!(trigger = ?trigger, "Pod spec unchanged, nothing to do");
            // A failure from an earlier pass may still be showing.
            if is_leader && !state.status.is_active() {
                info!(previous = %state.status, "Applied spec is current, clearing status");
                self.write_status(state, &mut report, UnitStatus::active())
                    .await?;
            }
            return Ok(report);
        }

        info!(
            trigger = ?trigger,
            is_leader,
            changed = !matches_applied,
            image = %config.image,
            num_units = config.num_units,
            "Reconciling pod spec"
        );

        if !is_leader {
            return self.skip_non_leader(state, report).await;
        }

        self.announce(state, &mut report).await?;
        self.apply(&config, candidate, state, report).await
    }

    /// Handle `start`: mark the unit started and re-apply the spec.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile`].
    pub async fn on_start(
        &self,
        raw: &RawConfig,
        state: &mut CharmState,
        is_leader: bool,
    ) -> Result<ReconcileReport> {
        if !state.started {
            info!("Unit starting");
            state.started = true;
        }
        self.reconcile(raw, state, is_leader, PassTrigger::Start).await
    }

    /// Handle `upgrade-charm`: treated as a restart, so the spec is re-applied.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile`].
    pub async fn on_upgrade(
        &self,
        raw: &RawConfig,
        state: &mut CharmState,
        is_leader: bool,
    ) -> Result<ReconcileReport> {
        self.reconcile(raw, state, is_leader, PassTrigger::UpgradeCharm)
            .await
    }

    /// Handle `config-changed`.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile`].
    pub async fn on_config_changed(
        &self,
        raw: &RawConfig,
        state: &mut CharmState,
        is_leader: bool,
    ) -> Result<ReconcileReport> {
        self.reconcile(raw, state, is_leader, PassTrigger::ConfigChanged)
            .await
    }

    async fn apply(
        &self,
        config: &CharmConfig,
        candidate: PodSpec,
        state: &mut CharmState,
        mut report: ReconcileReport,
    ) -> Result<ReconcileReport> {
        report.submitted = true;

        if let Err(e) = self.sink.submit(&candidate).await {
            let err = match e {
                Error::Submission { .. } => e,
                other => Error::submission(other.to_string()),
            };
            warn!(error = %err, "Pod spec submission failed");
            self.write_status(state, &mut report, UnitStatus::blocked(err.to_string()))
                .await?;
            report.outcome = ReconcileOutcome::SubmissionFailed {
                reason: err.to_string(),
            };
            return Ok(report);
        }

        state.applied_spec = Some(candidate);
        info!("Pod spec applied");

        if self.config.advertise_endpoint {
            self.advertise(config, state, &mut report).await;
        }

        self.write_status(state, &mut report, UnitStatus::active())
            .await?;
        report.outcome = ReconcileOutcome::Applied;
        Ok(report)
    }

    async fn skip_non_leader(
        &self,
        state: &mut CharmState,
        mut report: ReconcileReport,
    ) -> Result<ReconcileReport> {
        debug!(policy = ?self.config.non_leader_policy, "Not leader, skipping submission");
        let waiting = UnitStatus::waiting(NON_LEADER_MESSAGE);
        match self.config.non_leader_policy {
            NonLeaderPolicy::Waiting if state.status == waiting => {
                debug!("Already waiting for the leader");
            }
            NonLeaderPolicy::Waiting => {
                self.announce(state, &mut report).await?;
                self.write_status(state, &mut report, waiting).await?;
            }
            NonLeaderPolicy::Unchanged => {}
        }
        report.outcome = ReconcileOutcome::SkippedNotLeader;
        Ok(report)
    }

    async fn advertise(
        &self,
        config: &CharmConfig,
        state: &mut CharmState,
        report: &mut ReconcileReport,
    ) {
        let Some(relation) = &self.relation else {
            debug!("No relation attached, endpoint not advertised");
            return;
        };

        let endpoint = EndpointAdvertisement {
            host: self.config.app_name.clone(),
            port: config.client_port,
        };

        let published = publish_endpoint(relation.as_ref(), &endpoint)
            .await
            .inspect_error(|e| report.publish_error = Some(e.to_string()))
            .into_option_logged();

        if published.is_some() {
            info!(host = %endpoint.host, port = endpoint.port, "Endpoint advertised");
            state.advertised = Some(endpoint.clone());
            report.advertised = Some(endpoint);
        }
    }

    async fn announce(&self, state: &mut CharmState, report: &mut ReconcileReport) -> Result<()> {
        let trigger = report.trigger;
        for message in trigger.maintenance_messages() {
            self.write_status(state, report, UnitStatus::maintenance(*message))
                .await?;
        }
        Ok(())
    }

    async fn write_status(
        &self,
        state: &mut CharmState,
        report: &mut ReconcileReport,
        status: UnitStatus,
    ) -> Result<()> {
        self.status.set_status(&status).await.map_err(|e| match e {
            Error::Status { .. } => e,
            other => Error::status(other.to_string()),
        })?;
        debug!(status = %status, "Status set");
        state.status = status.clone();
        report.status = status.clone();
        report.statuses.push(status);
        Ok(())
    }

    /// Get the configuration.
    pub const fn config(&self) -> &ReconcilerConfig {
        &self.config
    }
}

async fn publish_endpoint(
    relation: &dyn RelationChannel,
    endpoint: &EndpointAdvertisement,
) -> Result<()> {
    relation.publish(RELATION_KEY_HOST, &endpoint.host).await?;
    relation
        .publish(RELATION_KEY_PORT, &endpoint.port.to_string())
        .await
}

/// Builder for Reconciler.
#[derive(Default)]
pub struct ReconcilerBuilder {
    sink: Option<Arc<dyn SpecSink>>,
    status: Option<Arc<dyn StatusSink>>,
    relation: Option<Arc<dyn RelationChannel>>,
    config: ReconcilerConfig,
}

impl ReconcilerBuilder {
    /// Create a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the platform spec sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn SpecSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Set the status sink.
    #[must_use]
    pub fn with_status(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the relation used for endpoint advertisement.
    #[must_use]
    pub fn with_relation(mut self, relation: Arc<dyn RelationChannel>) -> Self {
        self.relation = Some(relation);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.config.app_name = name.into();
        self
    }

    #[must_use]
    pub const fn non_leader_policy(mut self, policy: NonLeaderPolicy) -> Self {
        self.config.non_leader_policy = policy;
        self
    }

    /// Enable/disable endpoint advertisement.
    #[must_use]
    pub const fn advertise_endpoint(mut self, enabled: bool) -> Self {
        self.config.advertise_endpoint = enabled;
        self
    }

    /// Build the reconciler.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSetup` if the spec sink or status sink is missing,
    /// or the application name is empty.
    pub fn build(self) -> Result<Reconciler> {
        let sink = self
            .sink
            .ok_or_else(|| Error::invalid_setup("spec sink is required"))?;
        let status = self
            .status
            .ok_or_else(|| Error::invalid_setup("status sink is required"))?;

        if self.config.app_name.trim().is_empty() {
            return Err(Error::invalid_setup("application name must not be empty"));
        }

        Ok(Reconciler {
            sink,
            status,
            relation: self.relation,
            config: self.config,
        })
    }
}
