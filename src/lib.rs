#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # zk-charm
//!
//! Zookeeper charm for a Kubernetes-backed substrate. One invocation handles
//! one hook: derive the pod spec from configuration, apply it on the leader,
//! report unit status.
//!
//! This library holds the binary's CLI, command handlers and the file-backed
//! host capabilities so they can be exercised from integration tests.

pub mod cli;
pub mod commands;
pub mod host;

pub use zk_core;
pub use zk_events;
pub use zk_reconciler;
