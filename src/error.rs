//! Crate-level error type.
//!
//! Each layer has its own error enum; [`Error`] aggregates them for callers
//! that mix configuration loading, requests and formatting.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::format::FormatError;

/// Any error jirakit can return.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Template rendering errors.
    #[error("{0}")]
    Format(#[from] FormatError),
}

impl Error {
    /// Get a user-friendly message for display.
    ///
    /// Server-supplied messages are passed through; everything else is
    /// rephrased without technical detail.
    pub fn user_message(&self) -> String {
        match self {
            Error::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::ReadError { path, .. } => format!(
                    "Could not read {}. Please check the file exists and is readable.",
                    path.display()
                ),
                ConfigError::ParseError(_) => {
                    "Configuration file is invalid. Please check the file format.".to_string()
                }
                ConfigError::ValidationError(msg) => format!("Configuration error: {}", msg),
            },
            Error::Api(e) => match e {
                ApiError::Network(_) => {
                    "Connection failed. Please check your network and JIRA URL.".to_string()
                }
                ApiError::Parse(_) | ApiError::InvalidResponse(_) => {
                    "Unexpected response from JIRA.".to_string()
                }
                ApiError::Protocol { .. } if e.is_auth_failure() => format!(
                    "Authentication failed ({}). Please check your username and password.",
                    e
                ),
                ApiError::Protocol { message, .. } | ApiError::Api { message, .. } => {
                    message.clone()
                }
                ApiError::InvalidUrl(_) => "Invalid JIRA URL in configuration.".to_string(),
                ApiError::InvalidCredentials => {
                    "The configured credentials cannot be used. Please reconfigure them."
                        .to_string()
                }
                ApiError::NotConfigured(what) => format!("{} is not configured.", what),
            },
            Error::Format(e) => format!("Invalid format template: {}", e),
        }
    }

    /// Whether the server rejected the credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_auth_failure())
    }
}

/// Result type for operations that can fail in more than one layer.
pub type Result<T> = std::result::Result<T, Error>;
