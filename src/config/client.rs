//! Immutable client configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use reqwest::Url;
use serde_json::{Map, Value};
use tracing::warn;

use super::{ConfigError, Result};
use crate::api::Auth;

/// Signature of a custom-field transform: receives the issue's full `fields` map.
pub type FieldTransform = dyn Fn(&Map<String, Value>) -> Value + Send + Sync;

/// How to extract a custom field from an issue's `fields` object.
#[derive(Clone)]
pub enum FieldRule {
    /// Compute the value from the whole field map.
    Transform(Arc<FieldTransform>),
    /// Two-level lookup: `fields[first][second]`.
    Path(String, String),
    /// Direct lookup: `fields[name]`.
    Direct(String),
}

impl FieldRule {
    /// Parse a string rule: `"a.b"` becomes a path split on the first dot,
    /// anything else is a direct field name.
    pub fn parse(rule: &str) -> Self {
        match rule.split_once('.') {
            Some((first, second)) if !first.is_empty() => {
                FieldRule::Path(first.to_string(), second.to_string())
            }
            _ => FieldRule::Direct(rule.to_string()),
        }
    }

    /// Wrap a closure as a transform rule.
    pub fn transform<F>(f: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> Value + Send + Sync + 'static,
    {
        FieldRule::Transform(Arc::new(f))
    }

    /// Apply the rule. Missing and `null` values yield `None`.
    pub fn extract(&self, fields: &Map<String, Value>) -> Option<Value> {
        let value = match self {
            FieldRule::Transform(f) => f(fields),
            FieldRule::Path(first, second) => fields.get(first)?.get(second)?.clone(),
            FieldRule::Direct(name) => fields.get(name)?.clone(),
        };
        (!value.is_null()).then_some(value)
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Transform(_) => f.write_str("Transform(..)"),
            FieldRule::Path(first, second) => write!(f, "Path({first}.{second})"),
            FieldRule::Direct(name) => write!(f, "Direct({name})"),
        }
    }
}

impl From<&str> for FieldRule {
    fn from(rule: &str) -> Self {
        FieldRule::parse(rule)
    }
}

/// Connection settings for a [`Client`](crate::Client).
///
/// Built once through [`ClientConfig::builder`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_uri: String,
    root_uri: String,
    auth: Option<Auth>,
    strict_ssl: bool,
    profields_uri: Option<String>,
    path_suffix: String,
    custom_fields: BTreeMap<String, FieldRule>,
}

impl ClientConfig {
    /// Start building a configuration for the given REST base URI,
    /// e.g. `https://jira.example.com/rest/api/2`.
    pub fn builder(base_uri: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder {
            base_uri: base_uri.into(),
            auth: None,
            strict_ssl: true,
            profields_uri: None,
            path_suffix: String::new(),
            custom_fields: BTreeMap::new(),
        }
    }

    /// The REST base URI without a trailing slash.
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Scheme, host and port of the base URI, used for browse links.
    pub fn root_uri(&self) -> &str {
        &self.root_uri
    }

    pub fn auth(&self) -> Option<&Auth> {
        self.auth.as_ref()
    }

    /// Whether server certificates are verified.
    pub fn strict_ssl(&self) -> bool {
        self.strict_ssl
    }

    /// Base URI of the secondary project-field endpoint.
    pub fn profields_uri(&self) -> Option<&str> {
        self.profields_uri.as_deref()
    }

    /// Suffix appended to relative resource paths.
    pub fn path_suffix(&self) -> &str {
        &self.path_suffix
    }

    pub fn custom_fields(&self) -> &BTreeMap<String, FieldRule> {
        &self.custom_fields
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    base_uri: String,
    auth: Option<Auth>,
    strict_ssl: bool,
    profields_uri: Option<String>,
    path_suffix: String,
    custom_fields: BTreeMap<String, FieldRule>,
}

impl ClientConfigBuilder {
    /// Authenticate with a user name and password (or API token).
    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.auth = Some(Auth::new(username, password));
        self
    }

    /// Authenticate with an already Base64-encoded `user:password` string.
    pub fn auth_string(mut self, encoded: &str) -> Self {
        self.auth = Some(Auth::from_encoded(encoded));
        self
    }

    pub fn strict_ssl(mut self, strict: bool) -> Self {
        self.strict_ssl = strict;
        self
    }

    pub fn profields_uri(mut self, uri: impl Into<String>) -> Self {
        self.profields_uri = Some(uri.into());
        self
    }

    pub fn path_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.path_suffix = suffix.into();
        self
    }

    /// Register a custom field. A later rule for the same name replaces the earlier one.
    pub fn custom_field(mut self, name: impl Into<String>, rule: impl Into<FieldRule>) -> Self {
        self.custom_fields.insert(name.into(), rule.into());
        self
    }

    /// Validate the URIs and produce the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the base URI (or the project
    /// field URI) is not an absolute http(s) URL with a host.
    pub fn build(self) -> Result<ClientConfig> {
        let base_uri = normalize_base_url(&self.base_uri);
        let url = parse_http_url("base URI", &base_uri)?;
        let root_uri = url.origin().ascii_serialization();

        let profields_uri = match self.profields_uri {
            Some(uri) => {
                let uri = normalize_base_url(&uri);
                parse_http_url("project field URI", &uri)?;
                Some(uri)
            }
            None => None,
        };

        if !self.strict_ssl {
            warn!("TLS certificate verification is disabled for {}", base_uri);
        }

        Ok(ClientConfig {
            base_uri,
            root_uri,
            auth: self.auth,
            strict_ssl: self.strict_ssl,
            profields_uri,
            path_suffix: self.path_suffix,
            custom_fields: self.custom_fields,
        })
    }
}

fn parse_http_url(what: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::ValidationError(format!("{what} '{raw}' is not a URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "{what} '{raw}' must start with http:// or https://"
        )));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "{what} '{raw}' has no host"
        )));
    }
    Ok(url)
}

/// Remove trailing slashes and warn about plain HTTP.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');

    // Don't enforce for localhost/testing
    if url.starts_with("http://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}
