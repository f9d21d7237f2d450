//! Configuration file handling for opcat
//!
//! This module contains data structures for:
//! - include files (`--include-file`) selecting catalog content for a diff

pub mod include;

// Re-export commonly used types
pub use include::{IncludeChannelConfig, IncludeConfig, IncludePackageConfig};
