//! Explicit hook-to-handler table.

use std::collections::HashMap;

use futures::future::BoxFuture;
use itertools::Itertools;
use zk_core::Result;
use zk_reconciler::{CharmState, RawConfig, ReconcileReport, Reconciler};

use crate::event::HookKind;

/// Everything a handler may touch during one pass.
pub struct HookContext<'a> {
    pub reconciler: &'a Reconciler,
    pub raw: &'a RawConfig,
    pub state: &'a mut CharmState,
    /// Leadership as queried for this pass.
    pub is_leader: bool,
}

/// A hook handler.
pub type Handler = for<'a> fn(HookContext<'a>) -> BoxFuture<'a, Result<ReconcileReport>>;

/// Maps each observed hook to its handler. Built once at startup.
#[derive(Clone)]
pub struct DispatchTable {
    handlers: HashMap<HookKind, Handler>,
}

impl DispatchTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The charm's standard table: every [`HookKind`] runs a reconcile pass.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .register(HookKind::ConfigChanged, on_config_changed)
            .register(HookKind::Start, on_start)
            .register(HookKind::UpgradeCharm, on_upgrade_charm)
    }

    /// Register `handler` for `kind`, replacing any previous one.
    #[must_use]
    pub fn register(mut self, kind: HookKind, handler: Handler) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    #[must_use]
    pub fn get(&self, kind: HookKind) -> Option<Handler> {
        self.handlers.get(&kind).copied()
    }

    /// Registered hooks, sorted by host name.
    #[must_use]
    pub fn kinds(&self) -> Vec<HookKind> {
        self.handlers
            .keys()
            .copied()
            .sorted_by_key(|kind| kind.as_str())
            .collect_vec()
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn on_config_changed(ctx: HookContext<'_>) -> BoxFuture<'_, Result<ReconcileReport>> {
    Box::pin(async move {
        ctx.reconciler
            .on_config_changed(ctx.raw, ctx.state, ctx.is_leader)
            .await
    })
}

fn on_start(ctx: HookContext<'_>) -> BoxFuture<'_, Result<ReconcileReport>> {
    Box::pin(async move {
        ctx.reconciler
            .on_start(ctx.raw, ctx.state, ctx.is_leader)
            .await
    })
}

fn on_upgrade_charm(ctx: HookContext<'_>) -> BoxFuture<'_, Result<ReconcileReport>> {
    Box::pin(async move {
        ctx.reconciler
            .on_upgrade(ctx.raw, ctx.state, ctx.is_leader)
            .await
    })
}
