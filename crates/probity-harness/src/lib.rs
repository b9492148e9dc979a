//! Probity Harness
//!
//! Present/absent acceptance runs for declarative resources.
//!
//! # Overview
//!
//! - **TestCase**: title, identity properties and expected resource state
//! - **Harness**: compose, render, apply and verify over a [`Driver`]
//! - **ScenarioRegistry**: named scenarios, resolved before anything runs
//! - **SimulatedAgent**: in-memory [`Driver`] used by tests and dry runs
//!
//! # Example
//!
//! ```rust
//! use probity_harness::{fixtures, Harness, HarnessConfig, ScenarioRegistry};
//!
//! let config = HarnessConfig::default();
//! let scenario = ScenarioRegistry::with_builtins()
//!     .resolve("pim_grouplist_title_patterns", &config)
//!     .unwrap();
//!
//! let mut harness = Harness::new(config.clone(), fixtures::simulated_agent(&config));
//! assert!(harness.run_scenario(&scenario).passed());
//! ```

#![warn(missing_docs)]

pub mod case;
pub mod config;
pub mod driver;
pub mod error;
pub mod exit_code;
pub mod fixtures;
pub mod harness;
pub mod registry;
pub mod simulator;

// Re-exports
pub use case::{CaseReport, Phase, Scenario, ScenarioReport, StepKind, StepOutcome, TestCase, TestCaseBuilder};
pub use config::{ExitCodePolicy, HarnessConfig, Platform};
pub use driver::{DescribeRequest, Driver, ManifestUpload};
pub use error::{ConfigError, DriverError, HarnessError};
pub use exit_code::{AcceptableExitCodes, DetailedExitCode};
pub use fixtures::DefaultsProfile;
pub use harness::Harness;
pub use registry::{ScenarioFn, ScenarioRegistry};
pub use simulator::{DefaultsFn, SimulatedAgent};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running scenarios
    pub use crate::{Driver, Harness, HarnessConfig, HarnessError, Scenario, ScenarioRegistry, TestCase};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
