//! ManifestRenderer - identity and properties to declarative text
//!
//! Output format:
//!
//! ```text
//! cisco_pim_grouplist { 'ipv4 red 44.44.44.44 226.0.0.0/8':
//!   ensure => present,
//!   bfd => 'true',
//! }
//! ```
//!
//! Property values are rendered verbatim inside single quotes. Their meaning
//! is the configuration engine's business.

use crate::properties::{EnsureState, PropertyMap, ENSURE};
use probity_identity::ResourceIdentity;

/// Renders resource blocks
#[derive(Debug, Clone, Copy)]
pub struct ManifestRenderer {
    indent: usize,
}

impl Default for ManifestRenderer {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl ManifestRenderer {
    /// Renderer with two-space indentation
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set indentation width
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Render one resource block from an explicit title
    ///
    /// With [`EnsureState::Absent`] only the ensure line is emitted. An
    /// `ensure` key inside `properties` is never rendered.
    #[must_use]
    pub fn render_block(
        &self,
        resource_type: &str,
        title: &str,
        ensure: EnsureState,
        properties: &PropertyMap,
    ) -> String {
        let pad = " ".repeat(self.indent);
        let mut out = format!("{} {{ {}:\n{pad}{ENSURE} => {ensure},\n", resource_type, quote(title));

        if ensure == EnsureState::Present {
            for (key, value) in properties.iter().filter(|(k, _)| *k != ENSURE) {
                out.push_str(&format!("{pad}{key} => {},\n", quote(value)));
            }
        }

        out.push('}');
        out.push('\n');
        out
    }

    /// Render one resource block for a composed identity
    #[must_use]
    pub fn render(
        &self,
        identity: &ResourceIdentity,
        ensure: EnsureState,
        properties: &PropertyMap,
    ) -> String {
        let text = self.render_block(
            identity.resource_type(),
            &identity.manifest_title(),
            ensure,
            properties,
        );
        tracing::debug!("rendered manifest for {}:\n{}", identity, text);
        text
    }
}

/// Render with the default renderer
///
/// `resource_type` is rendered verbatim and may differ from the identity's
/// own type (e.g. a namespaced alias).
#[must_use]
pub fn render(
    resource_type: &str,
    identity: &ResourceIdentity,
    ensure: EnsureState,
    properties: &PropertyMap,
) -> String {
    ManifestRenderer::new().render_block(resource_type, &identity.manifest_title(), ensure, properties)
}

/// Wrap resource blocks in a node definition
#[must_use]
pub fn wrap_node(node: &str, body: &str) -> String {
    let mut out = format!("node {} {{\n", quote(node));
    for line in body.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str("}\n");
    out
}

/// Shell heredoc that writes `body` to `path` on the master
#[must_use]
pub fn write_command(path: &str, body: &str) -> String {
    let body = body.strip_suffix('\n').unwrap_or(body);
    format!("cat <<EOF >{path}\n{body}\nEOF")
}

/// Single-quote a value, escaping backslashes and quotes
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use probity_identity::{compose, IdentitySchema};

    fn identity() -> ResourceIdentity {
        let props = [("rp_addr", "44.44.44.44"), ("group", "226.0.0.0/8")];
        compose(&IdentitySchema::pim_grouplist(), "ipv4 red", &props).unwrap()
    }

    #[test]
    fn present_block() {
        let props = PropertyMap::builder().set("bfd", "true").set("note", "x").build();
        let text = ManifestRenderer::new().render(&identity(), EnsureState::Present, &props);

        assert_eq!(
            text,
            "cisco_pim_grouplist { 'ipv4 red 44.44.44.44 226.0.0.0/8':\n  \
             ensure => present,\n  bfd => 'true',\n  note => 'x',\n}\n"
        );
    }

    #[test]
    fn absent_block_drops_properties() {
        let props = PropertyMap::builder().set("bfd", "true").build();
        let text = render("cisco_pim_grouplist", &identity(), EnsureState::Absent, &props);

        assert_eq!(
            text,
            "cisco_pim_grouplist { 'ipv4 red 44.44.44.44 226.0.0.0/8':\n  ensure => absent,\n}\n"
        );
    }

    #[test]
    fn ensure_property_is_not_duplicated() {
        let props = PropertyMap::builder().set("ensure", "absent").set("a", "1").build();
        let text = ManifestRenderer::new().render_block("t", "x", EnsureState::Present, &props);

        assert_eq!(text.matches("ensure").count(), 1);
        assert!(text.contains("ensure => present,"));
    }

    #[test]
    fn custom_indent() {
        let props = PropertyMap::builder().set("bfd", "true").build();
        let text = ManifestRenderer::new()
            .with_indent(4)
            .render_block("t", "x", EnsureState::Present, &props);

        assert_eq!(text, "t { 'x':\n    ensure => present,\n    bfd => 'true',\n}\n");
    }

    #[test]
    fn rendering_is_deterministic() {
        let props = PropertyMap::builder().set("z", "1").set("a", "2").build();
        let a = ManifestRenderer::new().render(&identity(), EnsureState::Present, &props);
        let b = ManifestRenderer::new().render(&identity(), EnsureState::Present, &props);

        assert_eq!(a, b);
        assert!(a.find("z =>").unwrap() < a.find("a =>").unwrap());
    }

    #[test]
    fn quote_escapes() {
        assert_eq!(quote("it's"), "'it\\'s'");
        assert_eq!(quote("a\\b"), "'a\\\\b'");
    }

    #[test]
    fn node_and_heredoc_wrapping() {
        let block = ManifestRenderer::new().render_block("t", "x", EnsureState::Absent, &PropertyMap::new());
        let node = wrap_node("default", &block);
        let cmd = write_command("/etc/puppetlabs/code/environments/production/manifests/site.pp", &node);

        assert_eq!(
            node,
            "node 'default' {\n  t { 'x':\n    ensure => absent,\n  }\n}\n"
        );
        assert!(cmd.starts_with("cat <<EOF >/etc/puppetlabs/code/environments/production/manifests/site.pp\n"));
        assert!(cmd.ends_with("}\nEOF"));
    }
}
