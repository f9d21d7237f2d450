//! opcat - operator catalog graph model and diff engine
//!
//! A catalog is a flat set of package, channel, bundle and deprecation
//! records. This crate turns such a record set into a validated
//! [`Model`](model::Model) whose channels are well-formed upgrade graphs, and
//! computes diffs between two models for incremental publication.
//!
//! ```text
//! records ──to_model──▶ Model ──DiffGenerator::run──▶ Model ──from_model──▶ records
//! ```

pub mod config;
pub mod convert;
pub mod declcfg;
pub mod diff;
pub mod error;
pub mod graph;
pub mod hash;
pub mod model;
pub mod property;
pub mod version;

#[cfg(test)]
mod test_fixtures;

pub use convert::{from_model, to_model};
pub use declcfg::DeclarativeConfig;
pub use diff::DiffGenerator;
pub use error::{CatalogError, Result};
pub use model::Model;
