//! Configuration management for jirakit.
//!
//! [`ClientConfig`] is the immutable, validated configuration a client runs
//! with. [`Profile`] is its TOML form on disk.

mod client;
mod profile;

use std::path::PathBuf;

use thiserror::Error;

pub use client::{ClientConfig, ClientConfigBuilder, FieldRule, FieldTransform};
pub use profile::Profile;

/// Environment variable that overrides the profile location.
pub const CONFIG_PATH_ENV: &str = "JIRAKIT_CONFIG";

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No platform configuration directory could be determined.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// The profile file could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The profile file is not valid TOML for a profile.
    #[error("failed to parse profile: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value failed validation.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Location of the default profile file.
///
/// `$JIRAKIT_CONFIG` when set, otherwise `jirakit/config.toml` in the
/// platform configuration directory (e.g. `~/.config` on Linux).
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let base_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base_dir.join("jirakit").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_config_path_env_override() {
        std::env::set_var(CONFIG_PATH_ENV, "/tmp/jirakit-test.toml");
        let path = default_config_path().unwrap();
        std::env::remove_var(CONFIG_PATH_ENV);

        assert_eq!(path, PathBuf::from("/tmp/jirakit-test.toml"));
    }

    #[test]
    #[serial]
    fn test_default_config_path_structure() {
        std::env::remove_var(CONFIG_PATH_ENV);
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("jirakit/config.toml"));
        }
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::ValidationError("bad uri".to_string());
        assert_eq!(err.to_string(), "invalid configuration: bad uri");
    }
}
