//! Hook events and their dispatch.
//!
//! The host delivers one hook at a time. This crate turns a hook name into a
//! [`HookEvent`], looks its handler up in an explicit [`DispatchTable`] and
//! runs exactly one reconciliation pass through the [`Charm`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use zk_events::{Charm, HookEvent, HookKind};
//! use zk_reconciler::{CharmState, RawConfig, StaticLeadership};
//!
//! let charm = Charm::new(reconciler, Arc::new(StaticLeadership::new(true)));
//! let mut state = CharmState::new();
//! let report = charm
//!     .dispatch(&HookEvent::new(HookKind::Start), &raw, &mut state)
//!     .await?;
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod charm;
pub mod dispatch;
pub mod event;
pub mod types;

// Re-export main types
pub use charm::Charm;
pub use dispatch::{DispatchTable, Handler, HookContext};
pub use event::{HookEvent, HookKind};
pub use types::EventId;
pub use zk_core::{Error, Result};
