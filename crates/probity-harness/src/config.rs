//! Harness configuration
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! puppet_binpath = "/opt/puppetlabs/bin/puppet "
//! manifest_path = "/etc/puppetlabs/code/environments/production/manifests/site.pp"
//! node = "default"
//! namespace = "management"
//! platform = "nexus"
//!
//! [acceptable_exit_codes]
//! apply = [2]
//! setup = [0, 2, 6]
//! ```

use crate::error::ConfigError;
use crate::exit_code::AcceptableExitCodes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Agent operating system family
///
/// Decides which properties exist and what their defaults are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// NX-OS
    #[default]
    Nexus,
    /// IOS XR
    IosXr,
}

/// Exit codes accepted per step kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitCodePolicy {
    /// Present/absent manifest runs
    pub apply: AcceptableExitCodes,
    /// Scenario setup runs
    pub setup: AcceptableExitCodes,
}

impl Default for ExitCodePolicy {
    fn default() -> Self {
        Self {
            apply: AcceptableExitCodes::changes(),
            setup: AcceptableExitCodes::setup(),
        }
    }
}

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Agent binary prefix, including the trailing space
    pub puppet_binpath: String,
    /// Manifest location on the master
    pub manifest_path: String,
    /// Node definition name wrapping each manifest
    pub node: String,
    /// Network namespace agent commands run in
    pub namespace: Option<String>,
    /// Agent platform
    pub platform: Platform,
    /// Accepted exit codes
    pub acceptable_exit_codes: ExitCodePolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            puppet_binpath: "/opt/puppetlabs/bin/puppet ".to_string(),
            manifest_path: "/etc/puppetlabs/code/environments/production/manifests/site.pp".to_string(),
            node: "default".to_string(),
            namespace: None,
            platform: Platform::Nexus,
            acceptable_exit_codes: ExitCodePolicy::default(),
        }
    }
}

impl HarnessConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With platform
    #[inline]
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// With network namespace
    #[inline]
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError`] on malformed TOML or unusable values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.node.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "node",
                reason: "must not be empty".to_string(),
            });
        }
        if self.manifest_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "manifest_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.acceptable_exit_codes.apply.is_empty() {
            return Err(ConfigError::Invalid {
                field: "acceptable_exit_codes.apply",
                reason: "at least one exit code must be accepted".to_string(),
            });
        }
        Ok(())
    }
}
