//! Testing utilities for the probity workspace
//!
//! Shared fixtures: schemas, property maps and captured introspection output.

#![allow(missing_docs)]

use probity_identity::{IdentitySchema, ResourceIdentity};
use probity_manifest::PropertyMap;

/// `puppet resource cisco_bgp '2 default'` on a Nexus agent
pub const BGP_DEFAULT_OUTPUT: &str = "\
cisco_bgp { '2 default':
  ensure                                 => 'present',
  bestpath_always_compare_med            => 'false',
  bestpath_aspath_multipath_relax        => 'false',
  bestpath_compare_routerid              => 'false',
  bestpath_cost_community_ignore         => 'false',
  bestpath_med_confed                    => 'false',
  bestpath_med_missing_as_worst          => 'false',
  bestpath_med_non_deterministic         => 'false',
  disable_policy_batching                => 'false',
  enforce_first_as                       => 'true',
  event_history_cli                      => 'size_small',
  event_history_detail                   => 'false',
  event_history_events                   => 'size_small',
  event_history_periodic                 => 'size_small',
  fast_external_fallover                 => 'true',
  flush_routes                           => 'false',
  graceful_restart                       => 'true',
  graceful_restart_helper                => 'false',
  graceful_restart_timers_restart        => '120',
  graceful_restart_timers_stalepath_time => '300',
  isolate                                => 'false',
  log_neighbor_changes                   => 'false',
  maxas_limit                            => 'false',
  neighbor_down_fib_accelerate           => 'false',
  shutdown                               => 'false',
  suppress_fib_pending                   => 'false',
  timer_bestpath_limit                   => '300',
  timer_bestpath_limit_always            => 'false',
  timer_bgp_holdtime                     => '180',
  timer_bgp_keepalive                    => '60',
}
";

/// `puppet resource` output for a resource that does not exist
pub const ABSENT_OUTPUT: &str = "cisco_pim_grouplist { 'ipv4 red 44.44.44.44 226.0.0.0/8':\n  ensure => 'absent',\n}\n";

pub fn props(pairs: &[(&str, &str)]) -> PropertyMap {
    pairs.iter().copied().collect()
}

pub fn pim_schema() -> IdentitySchema {
    IdentitySchema::pim_grouplist()
}

/// The two trailing PIM fields, for a title of `ipv4 red`
pub fn pim_trailing_props() -> PropertyMap {
    props(&[("rp_addr", "44.44.44.44"), ("group", "226.0.0.0/8")])
}

/// All four PIM fields
pub fn pim_full_props() -> PropertyMap {
    props(&[
        ("afi", "ipv4"),
        ("vrf", "red"),
        ("rp_addr", "22.22.22.22"),
        ("group", "224.0.0.0/8"),
    ])
}

/// `cisco_pim_grouplist 'ipv4 red 44.44.44.44 226.0.0.0/8'`
pub fn pim_identity() -> ResourceIdentity {
    ResourceIdentity::compose(&pim_schema(), "ipv4 red", &pim_trailing_props()).unwrap()
}

/// A few of the Nexus `cisco_bgp` defaults under the default vrf
pub fn bgp_expected_sample() -> PropertyMap {
    props(&[
        ("ensure", "present"),
        ("fast_external_fallover", "true"),
        ("enforce_first_as", "true"),
        ("graceful_restart", "true"),
        ("timer_bgp_keepalive", "60"),
        ("timer_bgp_holdtime", "180"),
    ])
}
