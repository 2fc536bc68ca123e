//! Error types for diary-core

use thiserror::Error;

use crate::EntryId;

/// Result type alias using diary-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in diary-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// No session token is available, the request was never sent
    #[error("You are not logged in. Please log in again.")]
    MissingToken,

    /// The server rejected the session token (HTTP 401)
    #[error("Your session has expired. Please log in again.")]
    Unauthorized,

    /// The server no longer knows the session (HTTP 404 on the list endpoint)
    #[error("Your session was lost by the server. Please log in again.")]
    SessionLost,

    /// A command that needs a logged-in user was issued while logged out
    #[error("Log in first")]
    NotAuthenticated,

    /// Client-side validation failed before any request was made
    #[error("{0}")]
    Validation(String),

    /// Login was answered with anything other than the success marker
    #[error("Login failed. Please check your credentials.")]
    InvalidCredentials,

    /// Registration was answered with anything other than the success marker
    #[error("Registration failed. Username might already exist.")]
    RegistrationRejected,

    /// Transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response that is not otherwise categorized
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Entry is not present in the local cache
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Export format recognised but not implemented
    #[error("{0} export not implemented yet")]
    UnsupportedExportFormat(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Durable session storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Errors that end the session: the store is cleared and the user must
    /// log in again.
    #[must_use]
    pub const fn is_session_failure(&self) -> bool {
        matches!(
            self,
            Self::MissingToken | Self::Unauthorized | Self::SessionLost
        )
    }
}
