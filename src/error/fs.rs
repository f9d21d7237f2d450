//! File system errors

use super::CatalogError;

/// Creates a file read failed error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> CatalogError {
    CatalogError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> CatalogError {
    CatalogError::IoError {
        message: message.into(),
    }
}
