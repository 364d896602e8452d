//! Error types and the SCORM error code table.

use crate::cmi::Rejection;
use std::io;
use thiserror::Error;

/// SCORM 1.2 error codes and their descriptions.
pub const ERROR_CODES: &[(&str, &str)] = &[
    ("0", "No error"),
    ("101", "General exception"),
    ("201", "Invalid argument error"),
    ("202", "Element cannot have children"),
    ("203", "Element not an array - cannot have count"),
    ("301", "Not initialized"),
    ("401", "Not implemented error"),
    ("402", "Invalid set value, element is a keyword"),
    ("403", "Element is read only"),
    ("404", "Element is write only"),
    ("405", "Incorrect data type"),
];

/// Description of a SCORM error code, `"Unknown error"` if unlisted.
#[must_use]
pub fn error_string(code: &str) -> &'static str {
    ERROR_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map_or("Unknown error", |(_, text)| *text)
}

/// `"Error {code}: {description}"`.
#[must_use]
pub fn diagnostic(code: &str) -> String {
    format!("Error {}: {}", code, error_string(code))
}

/// Errors from the persistent storage slot.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid stored tracking data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a tracking call did not succeed.
#[derive(Error, Debug)]
pub enum TrackingError {
    #[error("session is already initialized")]
    AlreadyInitialized,

    #[error("session is not initialized")]
    NotInitialized,

    #[error("session has been terminated")]
    Terminated,

    #[error("element '{0}' not found")]
    NotFound(String),

    #[error("invalid value for '{element}': {reason}")]
    Rejected {
        element: String,
        #[source]
        reason: Rejection,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TrackingError {
    /// The SCORM error code this failure corresponds to.
    #[must_use]
    pub fn scorm_code(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized | Self::Storage(_) => "101",
            Self::NotInitialized | Self::Terminated => "301",
            Self::NotFound(_) => "401",
            Self::Rejected { .. } => "405",
        }
    }
}
