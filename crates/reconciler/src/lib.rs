//! K8s-style reconciliation of a Zookeeper pod spec.
//!
//! The reconciler compares a declared configuration against the last pod spec
//! it applied and converges the two:
//!
//! - **Desired State**: [`PodSpec`] derived from a validated [`CharmConfig`]
//! - **Applied State**: the spec recorded in [`CharmState`] after a successful submit
//! - **Diff**: structural equality; an unchanged spec is a complete no-op
//! - **Action**: submit on the leader, report status everywhere
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use zk_reconciler::{
//!     CharmState, InMemorySpecSink, PassTrigger, RawConfig, ReconcilerBuilder,
//!     RecordingStatusSink,
//! };
//!
//! #[tokio::main]
//! async fn main() -> zk_reconciler::Result<()> {
//!     let reconciler = ReconcilerBuilder::new()
//!         .with_sink(Arc::new(InMemorySpecSink::new()))
//!         .with_status(Arc::new(RecordingStatusSink::new()))
//!         .app_name("zookeeper")
//!         .build()?;
//!
//!     let raw = RawConfig::from_yaml_str("image: zk:3.4\nclient-port: 2181\n...")?;
//!     let mut state = CharmState::new();
//!     let report = reconciler
//!         .reconcile(&raw, &mut state, true, PassTrigger::ConfigChanged)
//!         .await?;
//!     println!("{:?}", report.outcome);
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod platform;
pub mod reconciler;
pub mod spec;
pub mod state;
pub mod status;
pub mod types;

// Re-export main types
pub use config::{CharmConfig, RawConfig};
pub use platform::{
    InMemoryRelation, InMemorySpecSink, LeadershipOracle, RecordingStatusSink, RelationChannel,
    SpecSink, StaticLeadership, StatusSink,
};
pub use reconciler::{NonLeaderPolicy, Reconciler, ReconcilerBuilder, ReconcilerConfig};
pub use spec::{derive_from_raw, derive_specification, PodSpec};
pub use state::CharmState;
pub use status::UnitStatus;
pub use types::{EndpointAdvertisement, PassTrigger, ReconcileOutcome, ReconcileReport};
pub use zk_core::{Error, Result};
