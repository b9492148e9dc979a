//! Probity Identity
//!
//! Resource identity codec: composes a resource's identity from a title
//! string plus a property mapping, and renders it back to a title.
//!
//! # Overview
//!
//! - **IdentitySchema**: resource type plus its canonical, ordered fields
//! - **ResourceIdentity**: every field resolved, in canonical form
//! - **TitlePattern**: positional tokens or an opaque resource name
//!
//! # Example
//!
//! ```rust
//! use probity_identity::{compose, IdentitySchema};
//!
//! let schema = IdentitySchema::pim_grouplist();
//! let props = [("rp_addr", "44.44.44.44"), ("group", "226.0.0.0/8")];
//!
//! let identity = compose(&schema, "ipv4 red", &props).unwrap();
//! assert_eq!(identity.render(), "ipv4 red 44.44.44.44 226.0.0.0/8");
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod identity;
pub mod schema;

// Re-exports
pub use error::IdentityError;
pub use identity::{compose, render, ResourceIdentity, TitlePattern};
pub use schema::{FieldKind, FieldSource, FieldSpec, IdentitySchema, SchemaCatalog};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
