//! Shell command lines sent to the agent host

use crate::render::quote;
use probity_identity::ResourceIdentity;
use std::fmt::{self, Display, Formatter};

/// A command line, optionally run inside a network namespace
///
/// Agents on switches often live in a management namespace; the command is
/// then prefixed with `sudo ip netns exec <namespace>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    line: String,
    namespace: Option<String>,
}

impl ShellCommand {
    /// Raw command line
    #[inline]
    #[must_use]
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            namespace: None,
        }
    }

    /// `<binpath>resource <type> '<full title>'`
    ///
    /// The fully-qualified title is used even when the manifest declared the
    /// resource under an opaque name, since that is how the agent reports it.
    #[must_use]
    pub fn puppet_resource(binpath: &str, identity: &ResourceIdentity) -> Self {
        Self::new(format!(
            "{binpath}resource {} {}",
            identity.resource_type(),
            quote(&identity.render())
        ))
    }

    /// `<binpath>agent -t`
    #[must_use]
    pub fn puppet_agent(binpath: &str) -> Self {
        Self::new(format!("{binpath}agent -t"))
    }

    /// Run inside a network namespace; `None` leaves the command unwrapped
    #[must_use]
    pub fn in_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.filter(|ns| !ns.is_empty()).map(str::to_string);
        self
    }

    /// Command line without the namespace prefix
    #[inline]
    #[must_use]
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Namespace, if any
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl Display for ShellCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "sudo ip netns exec {} {}", ns, self.line),
            None => f.write_str(&self.line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probity_identity::{compose, IdentitySchema};

    const BINPATH: &str = "/opt/puppetlabs/bin/puppet ";

    #[test]
    fn resource_command_uses_full_title() {
        let props = [
            ("afi", "ipv4"),
            ("vrf", "red"),
            ("rp_addr", "22.22.22.22"),
            ("group", "224.0.0.0/8"),
        ];
        let id = compose(&IdentitySchema::pim_grouplist(), "newyork", &props).unwrap();
        let cmd = ShellCommand::puppet_resource(BINPATH, &id);

        assert_eq!(
            cmd.to_string(),
            "/opt/puppetlabs/bin/puppet resource cisco_pim_grouplist 'ipv4 red 22.22.22.22 224.0.0.0/8'"
        );
    }

    #[test]
    fn asdot_is_reported_as_asplain() {
        let none: [(&str, &str); 0] = [];
        let id = compose(&IdentitySchema::bgp(), "55.77 blue", &none).unwrap();

        assert_eq!(
            ShellCommand::puppet_resource(BINPATH, &id).line(),
            "/opt/puppetlabs/bin/puppet resource cisco_bgp '3604557 blue'"
        );
    }

    #[test]
    fn namespace_prefix() {
        let cmd = ShellCommand::puppet_agent(BINPATH).in_namespace(Some("management"));
        assert_eq!(
            cmd.to_string(),
            "sudo ip netns exec management /opt/puppetlabs/bin/puppet agent -t"
        );

        let bare = ShellCommand::puppet_agent(BINPATH).in_namespace(Some(""));
        assert_eq!(bare.namespace(), None);
    }
}
