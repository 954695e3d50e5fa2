//! Normalized backend API errors.

use thiserror::Error;

/// Normalized error returned by the Storage Drive backend.
///
/// Every failed request collapses to the HTTP status plus the human-readable
/// message from the `{ "error": ... }` response body, so callers never have
/// to inspect transport details.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (status {status_code})")]
pub struct ApiError {
    /// HTTP status code of the failed response
    pub status_code: u16,
    /// Server-provided message, or the canonical status reason
    pub message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    /// Check if the request was rejected for a missing or stale session.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code == 401
    }

    /// Check if the server reported the resource as missing.
    ///
    /// The backend signals this through the message text, not the status.
    pub fn is_not_found(&self) -> bool {
        self.message_contains("not found")
    }

    /// Case-insensitive substring test on the server message.
    pub fn message_contains(&self, needle: &str) -> bool {
        self.message.to_lowercase().contains(needle)
    }
}
