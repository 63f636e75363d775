//! # Authenticator Configuration
//!
//! Server-side values the payload is checked against, optionally loaded from
//! a TOML file.
//!
//! # Config File Format
//!
//! ```toml
//! [auth]
//! protocol_version = "1.2"
//! max_command_len = 131072
//! max_username_len = 256
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use crate::adapters::system::platform_arg_max;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Protocol version this server speaks.
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.2";

/// Longest username accepted, matching Linux `LOGIN_NAME_MAX`.
pub const DEFAULT_MAX_USERNAME_LEN: usize = 256;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Authenticator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Version string clients must send, compared exactly
    pub protocol_version: String,
    /// Commands must be strictly shorter than this many bytes
    pub max_command_len: usize,
    /// Longest accepted username in bytes
    pub max_username_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            max_command_len: platform_arg_max(),
            max_username_len: DEFAULT_MAX_USERNAME_LEN,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    auth: AuthSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct AuthSection {
    protocol_version: Option<String>,
    max_command_len: Option<usize>,
    max_username_len: Option<usize>,
}

impl AuthConfig {
    /// Use a specific protocol version.
    #[must_use]
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol_version = version.into();
        self
    }

    /// Use a specific command length limit.
    #[must_use]
    pub fn with_max_command_len(mut self, max: usize) -> Self {
        self.max_command_len = max;
        self
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::default();

        let config = Self {
            protocol_version: file
                .auth
                .protocol_version
                .unwrap_or(defaults.protocol_version),
            max_command_len: file.auth.max_command_len.unwrap_or(defaults.max_command_len),
            max_username_len: file
                .auth
                .max_username_len
                .unwrap_or(defaults.max_username_len),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol_version.is_empty() || self.protocol_version.contains('\0') {
            return Err(ConfigError::Invalid {
                key: "protocol_version",
                reason: "must be a non-empty string without NUL".to_string(),
            });
        }
        if self.max_command_len == 0 {
            return Err(ConfigError::Invalid {
                key: "max_command_len",
                reason: "must be positive".to_string(),
            });
        }
        if self.max_username_len == 0 {
            return Err(ConfigError::Invalid {
                key: "max_username_len",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
