//! Built-in scenarios and the default values they expect
//!
//! The expected values mirror what a freshly created resource reports on
//! each platform.

pub mod bgp;
pub mod pim;

use crate::config::{HarnessConfig, Platform};
use crate::registry::ScenarioFn;
use crate::simulator::SimulatedAgent;
use probity_manifest::{PropertyMap, ENSURE};

/// `(id, description, constructor)` for every built-in scenario
pub const BUILTIN: &[(&str, &str, ScenarioFn)] = &[
    (pim::ID, pim::DESCRIPTION, pim::title_patterns),
    (bgp::DEFAULT_VRF_ID, bgp::DEFAULT_VRF_DESCRIPTION, bgp::default_vrf),
    (bgp::VRF_ID, bgp::VRF_DESCRIPTION, bgp::vrf),
    (bgp::ASDOT_ID, bgp::ASDOT_DESCRIPTION, bgp::asdot),
];

/// Properties only valid under the default vrf
const DEFAULT_VRF_ONLY: &[&str] = &[
    "enforce_first_as",
    "event_history_cli",
    "event_history_detail",
    "event_history_events",
    "event_history_periodic",
    "disable_policy_batching",
];

/// Properties IOS XR does not support under a non-default vrf
const XR_DEFAULT_VRF_ONLY: &[&str] = &[
    "bestpath_med_confed",
    "graceful_restart",
    "graceful_restart_timers_restart",
    "graceful_restart_timers_stalepath_time",
    "nsr",
];

/// Expected `cisco_bgp` defaults for a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultsProfile {
    platform: Platform,
}

impl DefaultsProfile {
    /// Create profile
    #[inline]
    #[must_use]
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Expected properties of a new `cisco_bgp` resource in `vrf`, including
    /// `ensure => present`
    #[must_use]
    pub fn bgp(&self, vrf: &str) -> PropertyMap {
        let nexus = self.platform != Platform::IosXr;
        let base = PropertyMap::builder()
            .set(ENSURE, "present")
            .set("fast_external_fallover", "true")
            .set("enforce_first_as", "true")
            .set("bestpath_always_compare_med", "false")
            .set("bestpath_aspath_multipath_relax", "false")
            .set("bestpath_compare_routerid", "false")
            .set("bestpath_cost_community_ignore", "false")
            .set("bestpath_med_confed", "false")
            .set("bestpath_med_missing_as_worst", "false")
            .set("graceful_restart", "false")
            .set("graceful_restart_timers_restart", "120")
            .set("graceful_restart_timers_stalepath_time", "300")
            .set("timer_bgp_keepalive", "60")
            .set("timer_bgp_holdtime", "180")
            .set_if(nexus, "bestpath_med_non_deterministic", "false")
            .set_if(nexus, "disable_policy_batching", "false")
            .set_if(nexus, "event_history_cli", "size_small")
            .set_if(nexus, "event_history_detail", "false")
            .set_if(nexus, "event_history_events", "size_small")
            .set_if(nexus, "event_history_periodic", "size_small")
            .set_if(nexus, "flush_routes", "false")
            .set_if(nexus, "graceful_restart", "true")
            .set_if(nexus, "graceful_restart_helper", "false")
            .set_if(nexus, "isolate", "false")
            .set_if(nexus, "log_neighbor_changes", "false")
            .set_if(nexus, "maxas_limit", "false")
            .set_if(nexus, "neighbor_down_fib_accelerate", "false")
            .set_if(nexus, "shutdown", "false")
            .set_if(nexus, "suppress_fib_pending", "false")
            .set_if(nexus, "timer_bestpath_limit", "300")
            .set_if(nexus, "timer_bestpath_limit_always", "false")
            .set_if(!nexus, "nsr", "false")
            .build();

        if vrf == "default" {
            return base;
        }
        let named = base.without(DEFAULT_VRF_ONLY.iter().copied());
        if nexus {
            named
        } else {
            named.without(XR_DEFAULT_VRF_ONLY.iter().copied())
        }
    }
}

/// Simulated agent that reports the platform's defaults
#[must_use]
pub fn simulated_agent(config: &HarnessConfig) -> SimulatedAgent {
    let profile = DefaultsProfile::new(config.platform);
    SimulatedAgent::default().with_defaults("cisco_bgp", move |identity| {
        profile
            .bgp(identity.get("vrf").unwrap_or("default"))
            .without([ENSURE])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nexus_default_vrf() {
        let defaults = DefaultsProfile::new(Platform::Nexus).bgp("default");
        assert_eq!(defaults.len(), 30);
        assert_eq!(defaults.get("graceful_restart"), Some("true"));
        assert!(!defaults.contains_key("nsr"));
    }

    #[test]
    fn nexus_named_vrf_drops_default_only() {
        let defaults = DefaultsProfile::new(Platform::Nexus).bgp("blue");
        assert_eq!(defaults.len(), 24);
        assert!(!defaults.contains_key("enforce_first_as"));
        assert!(defaults.contains_key("graceful_restart"));
    }

    #[test]
    fn xr_profiles() {
        let profile = DefaultsProfile::new(Platform::IosXr);
        let default_vrf = profile.bgp("default");
        assert_eq!(default_vrf.len(), 15);
        assert_eq!(default_vrf.get("nsr"), Some("false"));
        assert_eq!(default_vrf.get("graceful_restart"), Some("false"));

        let named = profile.bgp("blue");
        assert_eq!(named.len(), 9);
        assert!(!named.contains_key("nsr"));
        assert!(!named.contains_key("bestpath_med_confed"));
    }

    #[test]
    fn builtin_ids_unique() {
        let mut ids: Vec<_> = BUILTIN.iter().map(|(id, _, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), BUILTIN.len());
    }
}
