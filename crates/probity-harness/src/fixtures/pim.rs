//! `cisco_pim_grouplist` title patterns
//!
//! One case per way of splitting the four identity fields between the title
//! and the properties: none in the title (opaque name), one, two, and all.

use crate::case::{Scenario, TestCase};
use crate::config::HarnessConfig;
use probity_identity::IdentitySchema;
use probity_manifest::PropertyMap;

/// Registry identifier
pub const ID: &str = "pim_grouplist_title_patterns";

/// Registry description
pub const DESCRIPTION: &str = "Resource cisco_pim_grouplist :: Verify Title Patterns";

fn case(desc: &str, title: &str, identity: PropertyMap) -> TestCase {
    TestCase::builder(desc, IdentitySchema::pim_grouplist())
        .title(title)
        .identity(identity)
        .build()
}

/// Build the scenario
#[must_use]
pub fn title_patterns(_config: &HarnessConfig) -> Scenario {
    let cases = vec![
        case(
            "3.1 Title Patterns",
            "newyork",
            PropertyMap::builder()
                .set("afi", "ipv4")
                .set("vrf", "red")
                .set("rp_addr", "22.22.22.22")
                .set("group", "224.0.0.0/8")
                .build(),
        ),
        case(
            "3.2 Title Patterns",
            "ipv4",
            PropertyMap::builder()
                .set("vrf", "red")
                .set("rp_addr", "33.33.33.33")
                .set("group", "225.0.0.0/8")
                .build(),
        ),
        case(
            "3.3 Title Patterns",
            "ipv4 red",
            PropertyMap::builder()
                .set("rp_addr", "44.44.44.44")
                .set("group", "226.0.0.0/8")
                .build(),
        ),
        case("3.4 Title Patterns", "ipv4 default 55.55.55.55 227.0.0.0/8", PropertyMap::new()),
    ];
    Scenario::new(ID, DESCRIPTION, cases)
}
