//! Property and record decoding errors

use super::CatalogError;

/// Creates a property parse error for the property at `index`
pub fn parse_failed(
    index: usize,
    property_type: impl Into<String>,
    reason: impl Into<String>,
) -> CatalogError {
    CatalogError::PropertyParse {
        index,
        property_type: property_type.into(),
        reason: reason.into(),
    }
}

/// Creates a record decode error
pub fn record_decode_failed(schema: impl Into<String>, reason: impl Into<String>) -> CatalogError {
    CatalogError::RecordDecode {
        schema: schema.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid version error
pub fn invalid_version(input: impl Into<String>, reason: impl Into<String>) -> CatalogError {
    CatalogError::InvalidVersion {
        input: input.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid version range error
pub fn invalid_range(input: impl Into<String>, reason: impl Into<String>) -> CatalogError {
    CatalogError::InvalidRange {
        input: input.into(),
        reason: reason.into(),
    }
}
