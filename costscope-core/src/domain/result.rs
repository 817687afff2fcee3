//! Result and error types for the core library

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV must contain these columns: {} (missing: {})", .required.join(", "), .missing.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        required: Vec<String>,
    },

    #[error("No valid data found in CSV")]
    NoValidData,

    #[error("Invalid file type: {0} (please upload a CSV file)")]
    InvalidFileType(String),

    #[error("Upload superseded: ticket {ticket} is older than upload {latest}")]
    StaleUpload { ticket: u64, latest: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read the file: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// True for errors caused by the uploaded file rather than the system
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::MissingColumns { .. }
                | Error::NoValidData
                | Error::InvalidFileType(_)
                | Error::Validation(_)
                | Error::Csv(_)
                | Error::Io(_)
        )
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Serialisable success/error envelope for JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}
