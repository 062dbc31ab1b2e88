//! Authentication handling for JIRA API.
//!
//! JIRA accepts Basic Auth with a Base64-encoded `user:password` pair. The
//! credential is kept in encoded form only.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use tracing::warn;

/// Authentication credentials for JIRA.
#[derive(Clone, PartialEq, Eq)]
pub struct Auth {
    /// The Base64-encoded `user:password` string.
    encoded: String,
    /// The complete "Basic ..." header value.
    auth_header: String,
}

impl Auth {
    /// Create new authentication credentials from a user name and password or API token.
    ///
    /// The secret is immediately encoded and the raw value is not stored.
    pub fn new(username: &str, password: &str) -> Self {
        Self::from_encoded(&encode_credentials(username, password))
    }

    /// Wrap an already Base64-encoded `user:password` string.
    pub fn from_encoded(encoded: &str) -> Self {
        let encoded = encoded.trim().to_string();
        let auth_header = format!("Basic {}", encoded);
        Self {
            encoded,
            auth_header,
        }
    }

    /// Get the authorization header value for HTTP requests.
    ///
    /// Returns the complete "Basic ..." header value.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// The encoded credential, as it would be stored in a profile.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Decode the credential and return the part before the first colon.
    ///
    /// Returns `None` when the stored string is not valid Base64 or UTF-8.
    pub fn username(&self) -> Option<String> {
        let bytes = match BASE64.decode(&self.encoded) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Stored credential is not valid base64: {}", e);
                return None;
            }
        };
        let decoded = String::from_utf8(bytes).ok()?;
        let user = decoded.split(':').next().unwrap_or_default();
        Some(user.to_string())
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("username", &self.username())
            .finish_non_exhaustive()
    }
}

/// Encode "user:password" in Base64.
fn encode_credentials(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    BASE64.encode(credentials.as_bytes())
}
