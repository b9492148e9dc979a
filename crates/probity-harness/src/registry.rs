//! Scenario registry
//!
//! Provides [`ScenarioRegistry`], mapping scenario identifiers to the
//! functions that build them. Resolution happens before anything runs, so a
//! typo fails fast instead of halfway through a device session.

use crate::case::Scenario;
use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::fixtures;
use std::collections::BTreeMap;

/// Builds a scenario for a configuration
pub type ScenarioFn = fn(&HarnessConfig) -> Scenario;

#[derive(Debug, Clone)]
struct Entry {
    description: &'static str,
    build: ScenarioFn,
}

/// Registry of runnable scenarios
#[derive(Debug, Default, Clone)]
pub struct ScenarioRegistry {
    scenarios: BTreeMap<String, Entry>,
}

impl ScenarioRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            scenarios: BTreeMap::new(),
        }
    }

    /// Create registry with the built-in scenarios
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (id, description, build) in fixtures::BUILTIN {
            if let Err(e) = registry.register(id, *description, *build) {
                tracing::warn!("skipping built-in scenario: {}", e);
            }
        }
        registry
    }

    /// Register a scenario
    ///
    /// # Errors
    /// Returns [`HarnessError::DuplicateScenario`] if `id` is taken.
    pub fn register(&mut self, id: &str, description: &'static str, build: ScenarioFn) -> Result<(), HarnessError> {
        if self.scenarios.contains_key(id) {
            return Err(HarnessError::DuplicateScenario(id.to_string()));
        }
        self.scenarios.insert(id.to_string(), Entry { description, build });
        Ok(())
    }

    /// Check if scenario exists
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.scenarios.contains_key(id)
    }

    /// Build one scenario
    ///
    /// # Errors
    /// Returns [`HarnessError::UnknownScenario`] if `id` is not registered.
    pub fn resolve(&self, id: &str, config: &HarnessConfig) -> Result<Scenario, HarnessError> {
        let entry = self
            .scenarios
            .get(id)
            .ok_or_else(|| HarnessError::UnknownScenario(id.to_string()))?;
        Ok((entry.build)(config))
    }

    /// Build several scenarios, failing on the first unknown identifier
    ///
    /// # Errors
    /// Returns [`HarnessError::UnknownScenario`] before building anything.
    pub fn resolve_all<S: AsRef<str>>(&self, ids: &[S], config: &HarnessConfig) -> Result<Vec<Scenario>, HarnessError> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(id.as_ref())) {
            return Err(HarnessError::UnknownScenario(missing.as_ref().to_string()));
        }
        ids.iter().map(|id| self.resolve(id.as_ref(), config)).collect()
    }

    /// Registered identifiers with their descriptions, sorted by identifier
    pub fn entries(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.scenarios.iter().map(|(id, e)| (id.as_str(), e.description))
    }

    /// Registered identifiers, sorted
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.scenarios.keys().map(String::as_str).collect()
    }

    /// Number of scenarios
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty(_: &HarnessConfig) -> Scenario {
        Scenario::new("empty", "Nothing", Vec::new())
    }

    #[test]
    fn builtins_registered() {
        let registry = ScenarioRegistry::with_builtins();
        assert!(registry.contains("pim_grouplist_title_patterns"));
        assert!(registry.contains("bgp_title_patterns_default_vrf"));
        assert!(registry.contains("bgp_title_patterns_vrf"));
        assert!(registry.contains("bgp_title_patterns_asdot"));
    }

    #[test]
    fn duplicate_rejected() {
        let mut registry = ScenarioRegistry::new();
        registry.register("empty", "Nothing", empty).unwrap();
        assert!(matches!(
            registry.register("empty", "Nothing", empty),
            Err(HarnessError::DuplicateScenario(id)) if id == "empty"
        ));
    }

    #[test]
    fn resolve_all_fails_fast() {
        let registry = ScenarioRegistry::with_builtins();
        let err = registry
            .resolve_all(&["bgp_title_patterns_vrf", "bgp_typo"], &HarnessConfig::default())
            .unwrap_err();
        assert!(matches!(err, HarnessError::UnknownScenario(id) if id == "bgp_typo"));
    }

    #[test]
    fn ids_sorted() {
        let ids = ScenarioRegistry::with_builtins().ids().join(",");
        assert_eq!(
            ids,
            "bgp_title_patterns_asdot,bgp_title_patterns_default_vrf,bgp_title_patterns_vrf,pim_grouplist_title_patterns"
        );
    }
}
