//! Monitor Rules Core - uptime assertions and status check filters
//!
//! This crate models the pass/fail logic of uptime checks as a typed
//! expression tree with copy-on-write edits, and the build filters of
//! size status checks along with their compact query syntax. Python
//! bindings are available behind the `python` feature.

pub mod assertion;
pub mod error;
pub mod status_check;

#[cfg(feature = "python")]
mod python;

pub use crate::error::{Result, RuleError};
