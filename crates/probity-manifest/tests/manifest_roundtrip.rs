use pretty_assertions::assert_eq;
use probity_identity::{compose, IdentitySchema};
use probity_manifest::{parse_all, wrap_node, EnsureState, ManifestBlock, ManifestRenderer, PropertyMap};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_absent_manifest_has_only_ensure(
        entries in proptest::collection::vec(("[a-z_]{1,12}", "[ -~]{0,16}"), 0..8)
    ) {
        let props: PropertyMap = entries.into_iter().collect();
        let text = ManifestRenderer::new().render_block("cisco_bgp", "2 default", EnsureState::Absent, &props);
        let block = ManifestBlock::parse(&text).unwrap();

        prop_assert_eq!(block.ensure, Some(EnsureState::Absent));
        prop_assert!(block.properties.is_empty());
        prop_assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn prop_parse_recovers_rendered_properties(
        entries in proptest::collection::vec(("[a-z][a-z_]{0,11}", "[ -~]{0,16}"), 0..8)
    ) {
        let props: PropertyMap = entries
            .into_iter()
            .filter(|(k, _)| k != "ensure")
            .collect();
        let text = ManifestRenderer::new().render_block("cisco_bgp", "2 default", EnsureState::Present, &props);
        let block = ManifestBlock::parse(&text).unwrap();

        prop_assert_eq!(block.title, "2 default");
        prop_assert_eq!(block.properties, props);
    }
}

#[test]
fn pim_manifest_in_node() {
    let props = PropertyMap::builder()
        .set("rp_addr", "44.44.44.44")
        .set("group", "226.0.0.0/8")
        .build();
    let identity = compose(&IdentitySchema::pim_grouplist(), "ipv4 red", &props).unwrap();

    // Identity fields come from the title here, so the block carries no properties.
    let block = ManifestRenderer::new().render(&identity, EnsureState::Present, &PropertyMap::new());
    let manifest = wrap_node("default", &block);

    assert_eq!(
        manifest,
        "node 'default' {\n  cisco_pim_grouplist { 'ipv4 red 44.44.44.44 226.0.0.0/8':\n    ensure => present,\n  }\n}\n"
    );

    let parsed = parse_all(&manifest).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].title, "ipv4 red 44.44.44.44 226.0.0.0/8");
}
