//! Build-size status check rules
//!
//! Rules carry build-metadata filters that are edited as a compact query
//! string such as `build.platform:[android,ios] !build.branch:main`.

pub mod codec;
pub mod config;
pub mod tokenizer;
mod types;

#[cfg(test)]
mod property_tests;

pub use codec::*;
pub use config::*;
pub use tokenizer::*;
pub use types::*;
