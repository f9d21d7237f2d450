//! Diff errors

use super::CatalogError;

/// Creates a diff configuration error
pub fn config(message: impl Into<String>) -> CatalogError {
    CatalogError::DiffConfig {
        message: message.into(),
    }
}

/// Creates an include error from every collected problem
pub fn include_failed(errors: Vec<String>) -> CatalogError {
    CatalogError::Include { errors }
}

/// Creates an unreachable head error
pub fn unreachable_head(
    channel: impl Into<String>,
    head: impl Into<String>,
    bundle: impl Into<String>,
) -> CatalogError {
    CatalogError::UnreachableHead {
        channel: channel.into(),
        head: head.into(),
        bundle: bundle.into(),
    }
}
