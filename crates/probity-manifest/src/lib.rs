//! Probity Manifest
//!
//! Property mappings and the declarative text built from them.
//!
//! # Overview
//!
//! - **PropertyMap**: immutable, insertion-ordered property mapping
//! - **ManifestRenderer**: identity + ensure + properties to a resource block
//! - **ManifestBlock**: parse a block back (manifests and `puppet resource` output)
//! - **ShellCommand**: agent-side command lines with namespace wrapping
//!
//! # Example
//!
//! ```rust
//! use probity_identity::{compose, IdentitySchema};
//! use probity_manifest::{EnsureState, ManifestRenderer, PropertyMap};
//!
//! let props = PropertyMap::builder()
//!     .set("rp_addr", "44.44.44.44")
//!     .set("group", "226.0.0.0/8")
//!     .build();
//! let identity = compose(&IdentitySchema::pim_grouplist(), "ipv4 red", &props).unwrap();
//!
//! let text = ManifestRenderer::new().render(&identity, EnsureState::Absent, &props);
//! assert!(text.contains("ensure => absent,"));
//! assert!(!text.contains("rp_addr"));
//! ```

#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod parse;
pub mod properties;
pub mod render;

// Re-exports
pub use command::ShellCommand;
pub use error::ManifestError;
pub use parse::{parse_all, ManifestBlock};
pub use properties::{EnsureState, PropertyMap, PropertyMapBuilder, ENSURE};
pub use render::{quote, render, wrap_node, write_command, ManifestRenderer};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for manifest operations
    pub use crate::{EnsureState, ManifestBlock, ManifestRenderer, PropertyMap, ShellCommand};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
