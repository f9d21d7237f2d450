//! Conversion between flat records and the validated model
//!
//! - [`to_model`]: record set → [`Model`](crate::model::Model), collecting
//!   every problem into one validation tree
//! - [`from_model`]: model → record set, in a deterministic order

mod from_model;
mod to_model;

pub use from_model::from_model;
pub use to_model::{to_model, validate_package_name};
