//! `cisco_bgp` title patterns
//!
//! Every case expects the resource to come up with the platform's default
//! property values; see [`DefaultsProfile`].

use super::DefaultsProfile;
use crate::case::{Scenario, TestCase};
use crate::config::HarnessConfig;
use probity_identity::IdentitySchema;
use probity_manifest::PropertyMap;

/// AS number used by the plain cases
pub const ASN: &str = "2";
/// AS number in asdot notation
pub const ASN_ASDOT: &str = "1.1";
/// [`ASN_ASDOT`] in asplain notation
pub const ASN_ASPLAIN: &str = "65537";
/// Non-default VRF
pub const VRF1: &str = "blue";
/// Opaque title
const NAME: &str = "raleigh";

/// Default vrf scenario id
pub const DEFAULT_VRF_ID: &str = "bgp_title_patterns_default_vrf";
/// Named vrf scenario id
pub const VRF_ID: &str = "bgp_title_patterns_vrf";
/// Asdot scenario id
pub const ASDOT_ID: &str = "bgp_title_patterns_asdot";

/// Default vrf description
pub const DEFAULT_VRF_DESCRIPTION: &str = "Resource cisco_bgp :: Verify Title Patterns (default vrf)";
/// Named vrf description
pub const VRF_DESCRIPTION: &str = "Resource cisco_bgp :: Verify Title Patterns (named vrf)";
/// Asdot description
pub const ASDOT_DESCRIPTION: &str = "Resource cisco_bgp :: Verify Title Patterns (asdot asn)";

fn props(pairs: &[(&str, &str)]) -> PropertyMap {
    pairs.iter().copied().collect()
}

fn cases(prefix: &str, patterns: Vec<(&str, PropertyMap)>, expected: &PropertyMap) -> Vec<TestCase> {
    patterns
        .into_iter()
        .enumerate()
        .map(|(i, (title, identity))| {
            TestCase::builder(format!("{prefix} title pattern {}", i + 1), IdentitySchema::bgp())
                .title(title)
                .identity(identity)
                .expect(expected.clone())
                .build()
        })
        .collect()
}

/// `asn => 2, vrf => default`
#[must_use]
pub fn default_vrf(config: &HarnessConfig) -> Scenario {
    let expected = DefaultsProfile::new(config.platform).bgp("default");
    let patterns = vec![
        (ASN, props(&[("vrf", "default")])),
        ("2 default", PropertyMap::new()),
        (NAME, props(&[("asn", ASN), ("vrf", "default")])),
        ("2 default", props(&[("asn", ASN), ("vrf", "default")])),
        (ASN, props(&[("asn", ASN), ("vrf", "default")])),
    ];
    Scenario::new(DEFAULT_VRF_ID, DEFAULT_VRF_DESCRIPTION, cases("default vrf", patterns, &expected))
}

/// `asn => 2, vrf => blue`
#[must_use]
pub fn vrf(config: &HarnessConfig) -> Scenario {
    let expected = DefaultsProfile::new(config.platform).bgp(VRF1);
    let patterns = vec![
        ("2 blue", PropertyMap::new()),
        (ASN, props(&[("vrf", VRF1)])),
        (NAME, props(&[("asn", ASN), ("vrf", VRF1)])),
    ];
    Scenario::new(VRF_ID, VRF_DESCRIPTION, cases("vrf", patterns, &expected))
}

/// `asn => 1.1, vrf => blue`; the agent reports the asn as 65537
#[must_use]
pub fn asdot(config: &HarnessConfig) -> Scenario {
    let expected = DefaultsProfile::new(config.platform).bgp(VRF1);
    let patterns = vec![
        ("1.1 blue", PropertyMap::new()),
        (ASN_ASDOT, props(&[("vrf", VRF1)])),
        (NAME, props(&[("asn", ASN_ASDOT), ("vrf", VRF1)])),
    ];
    Scenario::new(ASDOT_ID, ASDOT_DESCRIPTION, cases("asdot", patterns, &expected))
}
