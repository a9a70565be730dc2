//! The charm: leadership, reconciler and dispatch table wired together.

use std::sync::Arc;

use tracing::{info, info_span, Instrument};
use zk_core::{Error, Result};
use zk_reconciler::{CharmState, LeadershipOracle, RawConfig, ReconcileReport, Reconciler};

use crate::dispatch::{DispatchTable, HookContext};
use crate::event::{HookEvent, HookKind};

pub struct Charm {
    reconciler: Reconciler,
    leadership: Arc<dyn LeadershipOracle>,
    table: DispatchTable,
}

impl Charm {
    /// Create a charm using the standard dispatch table.
    pub fn new(reconciler: Reconciler, leadership: Arc<dyn LeadershipOracle>) -> Self {
        Self::with_table(reconciler, leadership, DispatchTable::standard())
    }

    pub const fn with_table(
        reconciler: Reconciler,
        leadership: Arc<dyn LeadershipOracle>,
        table: DispatchTable,
    ) -> Self {
        Self {
            reconciler,
            leadership,
            table,
        }
    }

    /// Run the handler for one delivered hook.
    ///
    /// Leadership is queried fresh for every delivery. Taking `state` by
    /// `&mut` keeps passes strictly sequential.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownHook` if no handler is registered for the hook,
    /// or any error the pass itself returns.
    pub async fn dispatch(
        &self,
        event: &HookEvent,
        raw: &RawConfig,
        state: &mut CharmState,
    ) -> Result<ReconcileReport> {
        let handler = self
            .table
            .get(event.kind)
            .ok_or_else(|| Error::unknown_hook(event.kind.as_str()))?;

        let span = info_span!(
            "hook",
            event_id = %event.event_id,
            hook = %event.kind,
            received_at = %event.received_at,
        );

        async {
            let is_leader = self.leadership.is_leader().await;
            info!(is_leader, "Dispatching hook");

            let report = handler(HookContext {
                reconciler: &self.reconciler,
                raw,
                state,
                is_leader,
            })
            .await?;

            info!(outcome = ?report.outcome, status = %report.status, "Hook handled");
            Ok::<_, Error>(report)
        }
        .instrument(span)
        .await
    }

    /// Parse a host hook name and dispatch it.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownHook` for hooks this charm does not observe.
    pub async fn dispatch_named(
        &self,
        hook: &str,
        raw: &RawConfig,
        state: &mut CharmState,
    ) -> Result<ReconcileReport> {
        let kind: HookKind = hook.parse()?;
        self.dispatch(&HookEvent::new(kind), raw, state).await
    }
}
