//! Probity Expect
//!
//! Verifies that expected properties do (or do not) appear in the free-form
//! text a configuration tool prints when describing current state.
//!
//! # Example
//!
//! ```rust
//! use probity_expect::matches;
//! use probity_manifest::PropertyMap;
//!
//! let output = "cisco_bgp { '2 default':\n  ensure => 'present',\n}\n";
//! let expected = PropertyMap::builder().set("ensure", "present").build();
//!
//! assert!(matches(output, &expected, true).passed());
//! assert!(!matches(output, &expected, false).passed());
//! ```

#![warn(missing_docs)]

pub mod matcher;
pub mod pattern;
pub mod result;

// Re-exports
pub use matcher::{matches, ExpectationMatcher};
pub use pattern::PairPattern;
pub use result::{ExpectationMismatch, ExpectationResult, Mismatch, MismatchKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
