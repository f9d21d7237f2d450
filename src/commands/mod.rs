//! Command implementations for opcat CLI

pub mod completions;
pub mod diff;
pub mod validate;
pub mod version;
