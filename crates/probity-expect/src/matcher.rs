//! ExpectationMatcher - expected properties against introspection output

use crate::pattern::PairPattern;
use crate::result::{ExpectationResult, Mismatch, MismatchKind};
use probity_manifest::PropertyMap;

/// Checks expected `key => value` pairs against free-form text
#[derive(Debug, Clone, Copy)]
pub struct ExpectationMatcher {
    wildcards: bool,
}

impl Default for ExpectationMatcher {
    fn default() -> Self {
        Self { wildcards: true }
    }
}

impl ExpectationMatcher {
    /// Matcher with `*` wildcards enabled
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat every expected value as a literal
    #[inline]
    #[must_use]
    pub fn literal() -> Self {
        Self { wildcards: false }
    }

    /// Check every pair
    ///
    /// With `expect_present` each missing pair is a mismatch; without it
    /// each pair that is found is one. Never fails: mismatches are reported
    /// in the result.
    #[must_use]
    pub fn matches(&self, output: &str, expected: &PropertyMap, expect_present: bool) -> ExpectationResult {
        let mut mismatches = Vec::new();

        for (key, value) in expected.iter() {
            let pattern = PairPattern::new(key, value, self.wildcards);
            let found = pattern.is_found_in(output);

            if found != expect_present {
                let kind = if expect_present {
                    MismatchKind::Missing
                } else {
                    MismatchKind::UnexpectedlyPresent
                };
                mismatches.push(Mismatch {
                    key: key.to_string(),
                    expected: value.to_string(),
                    observed: pattern.observed_in(output),
                    kind,
                });
            }
        }

        let result = ExpectationResult {
            expect_present,
            checked: expected.len(),
            mismatches,
        };

        if !result.passed() {
            tracing::warn!("{}", result.summary());
        }
        result
    }
}

/// Check with the default matcher; see [`ExpectationMatcher::matches`]
#[must_use]
pub fn matches(output: &str, expected: &PropertyMap, expect_present: bool) -> ExpectationResult {
    ExpectationMatcher::new().matches(output, expected, expect_present)
}
