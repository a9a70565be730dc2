//! Capabilities supplied by the host framework.
//!
//! The reconciler never talks to the platform directly; it is handed these
//! trait objects. The in-memory implementations back the tests and any
//! embedding that drives passes without a real host.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use zk_core::{Error, Result};

use crate::spec::PodSpec;
use crate::status::UnitStatus;

/// Accepts pod specs for the application.
#[async_trait]
pub trait SpecSink: Send + Sync {
    /// Submit a spec. Only the leader may call this.
    async fn submit(&self, spec: &PodSpec) -> Result<()>;
}

/// Receives unit status updates.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn set_status(&self, status: &UnitStatus) -> Result<()>;
}

/// Application-level relation data bag.
#[async_trait]
pub trait RelationChannel: Send + Sync {
    async fn publish(&self, key: &str, value: &str) -> Result<()>;
}

/// Answers whether this unit is the leader.
#[async_trait]
pub trait LeadershipOracle: Send + Sync {
    async fn is_leader(&self) -> bool;
}

/// Spec sink that records submissions and can be told to fail.
#[derive(Debug, Default)]
pub struct InMemorySpecSink {
    submitted: Mutex<Vec<PodSpec>>,
    calls: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl InMemorySpecSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following submit fail with `reason`.
    pub async fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock().await = Some(reason.into());
    }

    /// Let submits succeed again.
    pub async fn recover(&self) {
        *self.failure.lock().await = None;
    }

    /// Number of submit calls, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Specs accepted so far, oldest first.
    pub async fn submitted(&self) -> Vec<PodSpec> {
        self.submitted.lock().await.clone()
    }
}

#[async_trait]
impl SpecSink for InMemorySpecSink {
    async fn submit(&self, spec: &PodSpec) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.failure.lock().await.clone() {
            return Err(Error::submission(reason));
        }
        self.submitted.lock().await.push(spec.clone());
        Ok(())
    }
}

/// Status sink that keeps every status it was given.
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    history: Mutex<Vec<UnitStatus>>,
}

impl RecordingStatusSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn history(&self) -> Vec<UnitStatus> {
        self.history.lock().await.clone()
    }

    pub async fn current(&self) -> UnitStatus {
        self.history.lock().await.last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl StatusSink for RecordingStatusSink {
    async fn set_status(&self, status: &UnitStatus) -> Result<()> {
        self.history.lock().await.push(status.clone());
        Ok(())
    }
}

/// Relation data bag held in memory.
#[derive(Debug, Default)]
pub struct InMemoryRelation {
    data: Mutex<BTreeMap<String, String>>,
    publishes: AtomicUsize,
    broken: AtomicBool,
}

impl InMemoryRelation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a relation that refuses writes.
    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.data.lock().await.get(key).cloned()
    }

    /// Number of successful key writes.
    pub fn publishes(&self) -> usize {
        self.publishes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationChannel for InMemoryRelation {
    async fn publish(&self, key: &str, value: &str) -> Result<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(Error::relation("relation is not established"));
        }
        self.data
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        self.publishes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Leadership fixed by the caller, flippable between passes.
#[derive(Debug, Default)]
pub struct StaticLeadership {
    leader: AtomicBool,
}

impl StaticLeadership {
    #[must_use]
    pub const fn new(leader: bool) -> Self {
        Self {
            leader: AtomicBool::new(leader),
        }
    }

    pub fn set_leader(&self, leader: bool) {
        self.leader.store(leader, Ordering::SeqCst);
    }
}

#[async_trait]
impl LeadershipOracle for StaticLeadership {
    async fn is_leader(&self) -> bool {
        self.leader.load(Ordering::SeqCst)
    }
}
