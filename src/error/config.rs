//! Configuration errors

use super::CatalogError;

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> CatalogError {
    CatalogError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> CatalogError {
    CatalogError::ConfigInvalid {
        message: message.into(),
    }
}
