//! Error types for the drivelib library.

use thiserror::Error;

use crate::api::ApiError;

/// Main error type for drivelib operations.
#[derive(Error, Debug)]
pub enum DriveError {
    /// Backend rejected the request (normalized status + message).
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Network request error.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid or unexpected response from server.
    #[error("Invalid response from server")]
    InvalidResponse,

    /// Signed-destination transfer returned a non-success status.
    #[error("Transfer failed with status {0}")]
    TransferFailed(u16),

    /// Transfer aborted through the progress callback.
    #[error("Upload cancelled by user")]
    Cancelled,

    /// A second upload was started while one is active.
    #[error("An upload is already in progress. Please wait.")]
    UploadInProgress,

    /// Custom error message.
    #[error("{0}")]
    Custom(String),
}

impl DriveError {
    /// Get the normalized API error, if this is a backend rejection.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            DriveError::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Check whether this error means the session cookie is missing or stale.
    pub fn is_unauthorized(&self) -> bool {
        self.api().is_some_and(ApiError::is_unauthorized)
    }
}

/// Result type alias for drivelib operations.
pub type Result<T> = std::result::Result<T, DriveError>;
