//! Error types for the harness
//!
//! Provides error handling for:
//! - Driver failures (transport, remote command)
//! - Configuration loading
//! - Scenario resolution and test-case aborts

use probity_identity::IdentityError;
use probity_manifest::ManifestError;
use std::path::PathBuf;

/// Errors reported by a [`crate::Driver`]
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Remote command could not be run or produced unusable output
    #[error("remote command failed: {command}: {message}")]
    Remote {
        /// Command line that failed
        command: String,
        /// Transport or remote diagnostic
        message: String,
    },

    /// Manifest handed to the driver could not be read
    #[error("manifest rejected: {0}")]
    Manifest(#[from] ManifestError),

    /// Resource type unknown to the driver
    #[error("unknown resource type: '{0}'")]
    UnknownResourceType(String),
}

impl DriverError {
    /// Create remote failure
    pub fn remote(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            command: command.into(),
            message: message.into(),
        }
    }
}

/// Errors loading a [`crate::HarnessConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for the config schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value parsed but is unusable
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Config key
        field: &'static str,
        /// Why it was rejected
        reason: String,
    },
}

/// Main harness error type
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Identity could not be composed; aborts the test case
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Manifest text error
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Driver failure; aborts the test case
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Scenario identifier not registered
    #[error("unknown scenario: '{0}'")]
    UnknownScenario(String),

    /// Scenario identifier registered twice
    #[error("scenario already registered: '{0}'")]
    DuplicateScenario(String),
}
