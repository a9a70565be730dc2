//! Core types shared by every zk-charm crate.
//!
//! - [`Error`]: the single error taxonomy for configuration, submission and
//!   capability failures
//! - [`Result`]: the crate-wide result alias
//! - [`ResultExt`]: logging combinators so callers never need to unwrap

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod result;

pub use error::Error;
pub use result::{Result, ResultExt};
