//! Expectation results
//!
//! A mismatch is data: [`ExpectationResult`] lists every offending key so
//! a failing check can be diagnosed in one run.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Why a key failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// Expected pair not found
    Missing,
    /// Pair found although absence was expected
    UnexpectedlyPresent,
}

/// One offending key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Property name
    pub key: String,
    /// Value from the expectation
    pub expected: String,
    /// Value the output shows for the key, if any
    pub observed: Option<String>,
    /// Failure kind
    pub kind: MismatchKind,
}

impl Display for Mismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.observed) {
            (MismatchKind::Missing, Some(observed)) => write!(
                f,
                "{} => '{}' not found (output has '{}')",
                self.key, self.expected, observed
            ),
            (MismatchKind::Missing, None) => {
                write!(f, "{} => '{}' not found", self.key, self.expected)
            }
            (MismatchKind::UnexpectedlyPresent, _) => {
                write!(f, "{} => '{}' present but expected absent", self.key, self.expected)
            }
        }
    }
}

/// Outcome of one expectation check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectationResult {
    /// Whether presence (true) or absence (false) was checked
    pub expect_present: bool,
    /// Number of pairs checked
    pub checked: usize,
    /// Every offending key, in expectation order
    pub mismatches: Vec<Mismatch>,
}

impl ExpectationResult {
    /// True when no key mismatched
    #[inline]
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Keys that mismatched
    pub fn failing_keys(&self) -> impl Iterator<Item = &str> {
        self.mismatches.iter().map(|m| m.key.as_str())
    }

    /// Multi-line report
    #[must_use]
    pub fn summary(&self) -> String {
        let mode = if self.expect_present { "present" } else { "absent" };
        if self.passed() {
            return format!("PASS: {} pairs {}", self.checked, mode);
        }

        let mut out = format!(
            "FAIL: {} of {} pairs mismatched (expected {})",
            self.mismatches.len(),
            self.checked,
            mode
        );
        for m in &self.mismatches {
            out.push_str("\n  ");
            out.push_str(&m.to_string());
        }
        out
    }

    /// Convert to `Result` for callers that want `?`
    ///
    /// # Errors
    /// Returns [`ExpectationMismatch`] carrying every mismatch.
    pub fn into_result(self) -> Result<(), ExpectationMismatch> {
        if self.passed() {
            Ok(())
        } else {
            Err(ExpectationMismatch { result: self })
        }
    }
}

/// Failed expectation as an error value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", result.summary())]
pub struct ExpectationMismatch {
    /// The failing result
    pub result: ExpectationResult,
}
