//! Uptime check assertion trees
//!
//! An assertion is a boolean expression over an HTTP response: status code,
//! JSON path and header checks combined with `and` / `or` / `not`. Edits are
//! copy-on-write and return a new tree.

mod ast;
pub mod edit;
pub mod path;
mod render;
pub mod visit;


pub use ast::*;
pub use edit::*;
pub use path::*;
pub use visit::*;
