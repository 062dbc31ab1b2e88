//! API error types for the JIRA client.

use thiserror::Error;

/// Boxed error produced by a [`Transport`](super::Transport) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when interacting with the JIRA API.
///
/// `Protocol` and `Api` display only the extracted message, so `to_string()`
/// yields text that can be logged or shown as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport failed before a response was received.
    #[error("Network error: {0}")]
    Network(#[source] BoxError),

    /// The body claimed to be JSON but could not be decoded.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// An HTML error page or a 401; the message is the page title.
    #[error("{message}")]
    Protocol { status: u16, message: String },

    /// HTTP status >= 400 with a structured body.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Well-formed JSON that does not have the expected shape.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The stored credential cannot be sent as a header.
    #[error("Invalid credentials: the auth string is not a valid header value")]
    InvalidCredentials,

    /// An operation needs configuration that was not supplied.
    #[error("Not configured: {0}")]
    NotConfigured(&'static str),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Wrap an arbitrary transport failure.
    pub fn network(err: impl Into<BoxError>) -> Self {
        ApiError::Network(err.into())
    }

    /// The HTTP status behind this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Protocol { status, .. } | ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network(Box::new(err))
    }
}
