//! Driver seam between the harness and the remote agent/master
//!
//! A real transport runs the shell commands over SSH; the in-memory
//! [`crate::SimulatedAgent`] interprets them directly.

use crate::error::DriverError;
use crate::exit_code::DetailedExitCode;
use probity_identity::ResourceIdentity;
use probity_manifest::{write_command, ShellCommand};

/// Manifest to install on the master
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestUpload {
    /// Destination path on the master
    pub path: String,
    /// Manifest text
    pub body: String,
}

impl ManifestUpload {
    /// Create upload
    #[must_use]
    pub fn new(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
        }
    }

    /// Heredoc that writes the manifest on the master
    #[must_use]
    pub fn shell_command(&self) -> ShellCommand {
        ShellCommand::new(write_command(&self.path, &self.body))
    }
}

/// Introspection request for one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeRequest {
    /// Resource type
    pub resource_type: String,
    /// Fully-qualified title
    pub title: String,
    /// `puppet resource` command line
    pub command: ShellCommand,
}

impl DescribeRequest {
    /// Request for a composed identity
    #[must_use]
    pub fn for_identity(binpath: &str, identity: &ResourceIdentity, namespace: Option<&str>) -> Self {
        Self {
            resource_type: identity.resource_type().to_string(),
            title: identity.render(),
            command: ShellCommand::puppet_resource(binpath, identity).in_namespace(namespace),
        }
    }
}

/// Remote execution seam
///
/// Calls are made strictly in sequence; a driver never sees two steps at
/// once.
pub trait Driver {
    /// Install a manifest on the master
    ///
    /// # Errors
    /// Returns [`DriverError`] when the upload cannot be performed.
    fn install_manifest(&mut self, upload: &ManifestUpload) -> Result<(), DriverError>;

    /// Run the agent and report its detailed exit code
    ///
    /// # Errors
    /// Returns [`DriverError`] when the command cannot be run at all; a
    /// failed catalog is an exit code, not an error.
    fn apply(&mut self, command: &ShellCommand) -> Result<DetailedExitCode, DriverError>;

    /// Run the introspection command and return its output
    ///
    /// # Errors
    /// Returns [`DriverError`] when the command cannot be run.
    fn describe(&mut self, request: &DescribeRequest) -> Result<String, DriverError>;
}

impl<D: Driver + ?Sized> Driver for &mut D {
    fn install_manifest(&mut self, upload: &ManifestUpload) -> Result<(), DriverError> {
        (**self).install_manifest(upload)
    }

    fn apply(&mut self, command: &ShellCommand) -> Result<DetailedExitCode, DriverError> {
        (**self).apply(command)
    }

    fn describe(&mut self, request: &DescribeRequest) -> Result<String, DriverError> {
        (**self).describe(request)
    }
}
