//! In-memory agent for exercising the harness without a device
//!
//! [`SimulatedAgent`] keeps the installed manifest and the current resource
//! state. Applying resolves every block's identity the way a real provider
//! would, so title-pattern bugs surface as failed runs or wrong resources.

use crate::driver::{DescribeRequest, Driver, ManifestUpload};
use crate::error::DriverError;
use crate::exit_code::DetailedExitCode;
use probity_identity::{ResourceIdentity, SchemaCatalog};
use probity_manifest::{parse_all, quote, EnsureState, ManifestBlock, PropertyMap, ShellCommand, ENSURE};
use std::collections::BTreeMap;
use std::fmt;

/// Default property values for a resource, given its identity
pub type DefaultsFn = Box<dyn Fn(&ResourceIdentity) -> PropertyMap>;

/// Simulated agent and master
pub struct SimulatedAgent {
    catalog: SchemaCatalog,
    defaults: BTreeMap<String, DefaultsFn>,
    manifest: Vec<ManifestBlock>,
    state: BTreeMap<(String, String), PropertyMap>,
    history: Vec<String>,
}

impl fmt::Debug for SimulatedAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedAgent")
            .field("catalog", &self.catalog)
            .field("defaults", &self.defaults.keys().collect::<Vec<_>>())
            .field("manifest", &self.manifest)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Default for SimulatedAgent {
    fn default() -> Self {
        Self::new(SchemaCatalog::builtin())
    }
}

impl SimulatedAgent {
    /// Create agent knowing the given resource types
    #[must_use]
    pub fn new(catalog: SchemaCatalog) -> Self {
        Self {
            catalog,
            defaults: BTreeMap::new(),
            manifest: Vec::new(),
            state: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    /// Properties a new resource of `resource_type` reports without being told
    #[must_use]
    pub fn with_defaults<F>(mut self, resource_type: impl Into<String>, defaults: F) -> Self
    where
        F: Fn(&ResourceIdentity) -> PropertyMap + 'static,
    {
        self.defaults.insert(resource_type.into(), Box::new(defaults));
        self
    }

    /// Current state of a resource, keyed by its fully-qualified title
    #[must_use]
    pub fn resource(&self, resource_type: &str, title: &str) -> Option<&PropertyMap> {
        self.state.get(&(resource_type.to_string(), title.to_string()))
    }

    /// Number of existing resources
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.state.len()
    }

    /// Every command line seen, in order
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn resolve(&self, block: &ManifestBlock) -> Option<ResourceIdentity> {
        let schema = match self.catalog.get(&block.resource_type) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::warn!("catalog error: {}", e);
                return None;
            }
        };
        match ResourceIdentity::compose(schema, &block.title, &block.properties) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!("catalog error: {} {{ '{}' }}: {}", block.resource_type, block.title, e);
                None
            }
        }
    }

    fn desired_state(&self, identity: &ResourceIdentity, block: &ManifestBlock) -> PropertyMap {
        let mut builder = PropertyMap::builder();
        for (name, value) in identity.fields() {
            builder = builder.set(name, value);
        }
        if let Some(defaults) = self.defaults.get(identity.resource_type()) {
            builder = builder.extend(&defaults(identity));
        }
        builder = builder.extend(&block.properties);
        // The provider reports identity fields in canonical form.
        for (name, value) in identity.fields() {
            builder = builder.set(name, value);
        }
        builder.build().filtered(|key| key != ENSURE)
    }

    fn canonical_title(&self, resource_type: &str, title: &str) -> String {
        self.catalog
            .get(resource_type)
            .ok()
            .and_then(|schema| ResourceIdentity::parse_title(schema, title).ok())
            .map_or_else(|| title.to_string(), |identity| identity.render())
    }
}

impl Driver for SimulatedAgent {
    fn install_manifest(&mut self, upload: &ManifestUpload) -> Result<(), DriverError> {
        self.history.push(upload.shell_command().to_string());
        self.manifest = parse_all(&upload.body)?;
        tracing::debug!("installed {} block(s) at {}", self.manifest.len(), upload.path);
        Ok(())
    }

    fn apply(&mut self, command: &ShellCommand) -> Result<DetailedExitCode, DriverError> {
        self.history.push(command.to_string());
        if !command.line().ends_with("agent -t") {
            return Err(DriverError::remote(command.to_string(), "not an agent run"));
        }

        // Resolve the whole catalog before touching state; one bad block
        // fails the run without applying anything.
        let mut resolved = Vec::with_capacity(self.manifest.len());
        for block in &self.manifest {
            match self.resolve(block) {
                Some(identity) => resolved.push((identity, block)),
                None => return Ok(DetailedExitCode::ERRORS),
            }
        }

        let mut updates = Vec::with_capacity(resolved.len());
        for (identity, block) in resolved {
            let key = (identity.resource_type().to_string(), identity.render());
            let desired = match block.ensure.unwrap_or_default() {
                EnsureState::Present => Some(self.desired_state(&identity, block)),
                EnsureState::Absent => None,
            };
            updates.push((key, desired));
        }

        let mut changed = false;
        for (key, desired) in updates {
            match desired {
                Some(props) => {
                    if self.state.get(&key) != Some(&props) {
                        tracing::debug!("{} '{}' => present", key.0, key.1);
                        self.state.insert(key, props);
                        changed = true;
                    }
                }
                None => {
                    if self.state.remove(&key).is_some() {
                        tracing::debug!("{} '{}' => absent", key.0, key.1);
                        changed = true;
                    }
                }
            }
        }

        Ok(if changed {
            DetailedExitCode::CHANGES
        } else {
            DetailedExitCode::NO_CHANGES
        })
    }

    fn describe(&mut self, request: &DescribeRequest) -> Result<String, DriverError> {
        self.history.push(request.command.to_string());
        let title = self.canonical_title(&request.resource_type, &request.title);

        let mut out = format!("{} {{ {}:\n", request.resource_type, quote(&title));
        match self.state.get(&(request.resource_type.clone(), title)) {
            Some(props) => {
                out.push_str(&format!("  {ENSURE} => 'present',\n"));
                for (key, value) in props {
                    out.push_str(&format!("  {key} => {},\n", quote(value)));
                }
            }
            None => out.push_str(&format!("  {ENSURE} => 'absent',\n")),
        }
        out.push_str("}\n");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use probity_manifest::{wrap_node, ManifestRenderer};

    fn agent_cmd() -> ShellCommand {
        ShellCommand::puppet_agent("puppet ")
    }

    fn install(agent: &mut SimulatedAgent, body: &str) {
        agent
            .install_manifest(&ManifestUpload::new("/tmp/site.pp", wrap_node("default", body)))
            .unwrap();
    }

    #[test]
    fn apply_creates_then_settles() {
        let mut agent = SimulatedAgent::default();
        install(
            &mut agent,
            "cisco_bgp { '2':\n  ensure => present,\n  vrf => 'blue',\n}\n",
        );

        assert_eq!(agent.apply(&agent_cmd()).unwrap(), DetailedExitCode::CHANGES);
        assert_eq!(agent.apply(&agent_cmd()).unwrap(), DetailedExitCode::NO_CHANGES);
        assert_eq!(agent.resource("cisco_bgp", "2 blue").unwrap().get("asn"), Some("2"));
    }

    #[test]
    fn describe_formats() {
        let mut agent = SimulatedAgent::default()
            .with_defaults("cisco_bgp", |_| PropertyMap::builder().set("shutdown", "false").build());
        install(&mut agent, "cisco_bgp { '2 default':\n  ensure => present,\n}\n");
        agent.apply(&agent_cmd()).unwrap();

        let request = DescribeRequest {
            resource_type: "cisco_bgp".into(),
            title: "2 default".into(),
            command: ShellCommand::new("puppet resource cisco_bgp '2 default'"),
        };
        assert_eq!(
            agent.describe(&request).unwrap(),
            "cisco_bgp { '2 default':\n  ensure => 'present',\n  asn => '2',\n  vrf => 'default',\n  shutdown => 'false',\n}\n"
        );
    }

    #[test]
    fn describe_missing_is_absent() {
        let mut agent = SimulatedAgent::default();
        let request = DescribeRequest {
            resource_type: "cisco_bgp".into(),
            title: "1.1 blue".into(),
            command: ShellCommand::new("puppet resource cisco_bgp '1.1 blue'"),
        };
        assert_eq!(
            agent.describe(&request).unwrap(),
            "cisco_bgp { '65537 blue':\n  ensure => 'absent',\n}\n"
        );
    }

    #[test]
    fn bad_identity_fails_whole_run() {
        let mut agent = SimulatedAgent::default();
        let renderer = ManifestRenderer::new();
        let body = format!(
            "{}{}",
            renderer.render_block("cisco_bgp", "2 default", EnsureState::Present, &PropertyMap::new()),
            renderer.render_block("cisco_bgp", "3", EnsureState::Present, &PropertyMap::new()),
        );
        install(&mut agent, &body);

        assert_eq!(agent.apply(&agent_cmd()).unwrap(), DetailedExitCode::ERRORS);
        assert_eq!(agent.resource_count(), 0);
    }

    #[test]
    fn absent_removes() {
        let mut agent = SimulatedAgent::default();
        install(&mut agent, "cisco_bgp { '2 default': ensure => present }");
        agent.apply(&agent_cmd()).unwrap();
        install(&mut agent, "cisco_bgp { '2 default': ensure => absent }");

        assert_eq!(agent.apply(&agent_cmd()).unwrap(), DetailedExitCode::CHANGES);
        assert_eq!(agent.resource_count(), 0);
        assert_eq!(agent.apply(&agent_cmd()).unwrap(), DetailedExitCode::NO_CHANGES);
    }

    #[test]
    fn rejects_non_agent_commands() {
        let mut agent = SimulatedAgent::default();
        assert!(matches!(
            agent.apply(&ShellCommand::new("reboot")),
            Err(DriverError::Remote { .. })
        ));
    }
}
