//! Error types and handling for opcat
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`validation`]: Structured validation error tree produced by model builds
//! - [`property`]: Property decoding errors
//! - [`config`]: Configuration and include-file errors
//! - [`diff`]: Diff configuration errors
//! - [`fs`]: File system errors

pub mod config;
pub mod diff;
pub mod fs;
pub mod property;
pub mod validation;

pub use validation::{Scope, ValidationError, Violation};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for opcat operations
#[derive(Error, Diagnostic, Debug)]
pub enum CatalogError {
    // Decode errors
    #[error("properties[{index}].value parse error for type \"{property_type}\": {reason}")]
    #[diagnostic(code(opcat::property::parse_failed))]
    PropertyParse {
        index: usize,
        property_type: String,
        reason: String,
    },

    #[error("Failed to decode {schema} record: {reason}")]
    #[diagnostic(
        code(opcat::record::decode_failed),
        help("Every record must be a JSON object with a string \"schema\" field")
    )]
    RecordDecode { schema: String, reason: String },

    // Model errors
    #[error("{0}")]
    #[diagnostic(
        code(opcat::model::invalid),
        help("Fix every listed problem; the catalog is only usable once all of them are resolved")
    )]
    InvalidModel(ValidationError),

    // Version errors
    #[error("Invalid version '{input}': {reason}")]
    #[diagnostic(code(opcat::version::invalid))]
    InvalidVersion { input: String, reason: String },

    #[error("Invalid version range '{input}': {reason}")]
    #[diagnostic(
        code(opcat::version::invalid_range),
        help("Ranges look like \">=1.0.0 <2.0.0 || 3.0.0\"")
    )]
    InvalidRange { input: String, reason: String },

    // Diff errors
    #[error("Invalid diff configuration: {message}")]
    #[diagnostic(code(opcat::diff::config))]
    DiffConfig { message: String },

    #[error("Failed to include requested catalog content:\n{}", .errors.join("\n"))]
    #[diagnostic(
        code(opcat::diff::include_failed),
        help("Check that every included package, channel, version and bundle exists in the new catalog")
    )]
    Include { errors: Vec<String> },

    #[error("Channel {channel:?}: head {head:?} not reachable from bundle {bundle:?}")]
    #[diagnostic(code(opcat::diff::unreachable_head))]
    UnreachableHead {
        channel: String,
        head: String,
        bundle: String,
    },

    // Configuration errors
    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(opcat::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(opcat::config::invalid))]
    ConfigInvalid { message: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(opcat::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(opcat::fs::io_error))]
    IoError { message: String },
}

impl CatalogError {
    /// Validation tree of a failed model build, if this is one
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            CatalogError::InvalidModel(tree) => Some(tree),
            _ => None,
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        CatalogError::InvalidModel(err)
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, CatalogError>;
