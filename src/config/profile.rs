//! JIRA profile file.
//!
//! A profile is the on-disk TOML form of a [`ClientConfig`]:
//!
//! ```toml
//! uri = "https://jira.example.com/rest/api/2"
//! username = "jdoe"
//! password = "api-token"
//! strict_ssl = true
//!
//! [custom_fields]
//! team = "customfield_10010.value"
//! points = "customfield_10002"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ClientConfig, ConfigError, FieldRule, Result};

fn default_true() -> bool {
    true
}

/// Connection details for a JIRA instance as stored on disk.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The REST base URI.
    pub uri: String,

    /// Base64-encoded `user:password`. Mutually exclusive with `username`/`password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_string: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default = "default_true")]
    pub strict_ssl: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profields_uri: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path_suffix: String,

    /// Custom field name to `"field"` or `"field.member"` rule.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, String>,
}

impl Profile {
    /// Create a profile with no credentials.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            auth_string: None,
            username: None,
            password: None,
            strict_ssl: true,
            profields_uri: None,
            path_suffix: String::new(),
            custom_fields: BTreeMap::new(),
        }
    }

    /// Read and parse a profile file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading profile");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse a profile from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validate this profile.
    ///
    /// Checks that:
    /// - The URI is non-empty and uses http or https
    /// - Credentials are given either encoded or as a user/password pair, not both
    /// - No custom field rule is empty
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.uri.is_empty() {
            return Err(ConfigError::ValidationError("URI cannot be empty".to_string()));
        }

        if !self.uri.starts_with("https://") && !self.uri.starts_with("http://") {
            return Err(ConfigError::ValidationError(format!(
                "URI '{}' must start with http:// or https://",
                self.uri
            )));
        }

        match (&self.auth_string, &self.username, &self.password) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(ConfigError::ValidationError(
                    "use either auth_string or username/password, not both".to_string(),
                ));
            }
            (None, Some(_), None) => {
                return Err(ConfigError::ValidationError(
                    "username given without a password".to_string(),
                ));
            }
            (None, None, Some(_)) => {
                return Err(ConfigError::ValidationError(
                    "password given without a username".to_string(),
                ));
            }
            _ => {}
        }

        if let Some((name, _)) = self.custom_fields.iter().find(|(_, rule)| rule.is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "custom field '{}' has an empty rule",
                name
            )));
        }

        Ok(())
    }

    /// Validate the profile and build the client configuration from it.
    pub fn into_config(self) -> Result<ClientConfig> {
        self.validate()?;

        let mut builder = ClientConfig::builder(self.uri)
            .strict_ssl(self.strict_ssl)
            .path_suffix(self.path_suffix);

        if let Some(encoded) = &self.auth_string {
            builder = builder.auth_string(encoded);
        }
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            builder = builder.credentials(username, password);
        }
        if let Some(uri) = self.profields_uri {
            builder = builder.profields_uri(uri);
        }
        for (name, rule) in &self.custom_fields {
            builder = builder.custom_field(name.as_str(), FieldRule::parse(rule));
        }

        builder.build()
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("has_auth_string", &self.auth_string.is_some())
            .field("strict_ssl", &self.strict_ssl)
            .field("profields_uri", &self.profields_uri)
            .field("path_suffix", &self.path_suffix)
            .field("custom_fields", &self.custom_fields)
            .finish_non_exhaustive()
    }
}
