//! Detailed exit codes of the configuration agent
//!
//! `puppet agent -t --detailed-exitcodes` reports:
//! - 0: no changes
//! - 1: errors (catalog could not be applied)
//! - 2: changes applied
//! - 4: failures during the run
//! - 6: changes and failures

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Exit status of one agent run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetailedExitCode(pub i32);

impl DetailedExitCode {
    /// Nothing changed
    pub const NO_CHANGES: Self = Self(0);
    /// Run errored
    pub const ERRORS: Self = Self(1);
    /// Changes applied
    pub const CHANGES: Self = Self(2);
    /// Resource failures
    pub const FAILURES: Self = Self(4);
    /// Changes and failures
    pub const CHANGES_AND_FAILURES: Self = Self(6);

    /// Raw code
    #[inline]
    #[must_use]
    pub fn code(self) -> i32 {
        self.0
    }

    /// Run reported an error
    #[inline]
    #[must_use]
    pub fn is_error(self) -> bool {
        self.0 == 1
    }

    /// Changes were applied
    #[inline]
    #[must_use]
    pub fn has_changes(self) -> bool {
        !self.is_error() && self.0 & 2 != 0
    }

    /// Some resources failed
    #[inline]
    #[must_use]
    pub fn has_failures(self) -> bool {
        !self.is_error() && self.0 & 4 != 0
    }

    /// Human-readable meaning
    #[must_use]
    pub fn describe(self) -> &'static str {
        match self.0 {
            0 => "no changes",
            1 => "errors",
            2 => "changes",
            4 => "failures",
            6 => "changes and failures",
            _ => "unknown",
        }
    }
}

impl Display for DetailedExitCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.describe())
    }
}

impl From<i32> for DetailedExitCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

/// Exit codes accepted for a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AcceptableExitCodes(Vec<i32>);

impl AcceptableExitCodes {
    /// Accept exactly these codes
    #[must_use]
    pub fn new(codes: impl Into<Vec<i32>>) -> Self {
        Self(codes.into())
    }

    /// `[2]`: the run must have changed something
    #[must_use]
    pub fn changes() -> Self {
        Self(vec![2])
    }

    /// `[0, 2, 6]`: setup and cleanup runs
    #[must_use]
    pub fn setup() -> Self {
        Self(vec![0, 2, 6])
    }

    /// Whether `code` is accepted
    #[inline]
    #[must_use]
    pub fn accepts(&self, code: DetailedExitCode) -> bool {
        self.0.contains(&code.0)
    }

    /// Accepted codes
    #[inline]
    #[must_use]
    pub fn codes(&self) -> &[i32] {
        &self.0
    }

    /// True when nothing is accepted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for AcceptableExitCodes {
    fn default() -> Self {
        Self::changes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_meanings() {
        assert!(DetailedExitCode::CHANGES.has_changes());
        assert!(!DetailedExitCode::CHANGES.has_failures());
        assert!(DetailedExitCode::CHANGES_AND_FAILURES.has_changes());
        assert!(DetailedExitCode::CHANGES_AND_FAILURES.has_failures());
        assert!(DetailedExitCode::ERRORS.is_error());
        assert!(!DetailedExitCode::ERRORS.has_changes());
        assert!(!DetailedExitCode::NO_CHANGES.has_changes());
    }

    #[test]
    fn acceptable_sets() {
        assert!(AcceptableExitCodes::changes().accepts(DetailedExitCode::CHANGES));
        assert!(!AcceptableExitCodes::changes().accepts(DetailedExitCode::NO_CHANGES));
        assert!(AcceptableExitCodes::setup().accepts(DetailedExitCode::NO_CHANGES));
        assert!(AcceptableExitCodes::setup().accepts(DetailedExitCode::CHANGES_AND_FAILURES));
        assert!(!AcceptableExitCodes::setup().accepts(DetailedExitCode::FAILURES));
    }

    #[test]
    fn display() {
        assert_eq!(DetailedExitCode(2).to_string(), "2 (changes)");
        assert_eq!(DetailedExitCode(9).describe(), "unknown");
    }
}
