//! # provider-settings-ports
//!
//! Port traits for the provider-settings hexagonal architecture.
//!
//! This crate defines the interfaces between the coordinator and the
//! validation and logging implementations. It depends only on `domain` and
//! `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod logger;
pub mod validator;

pub use logger::*;
pub use validator::*;

// Re-export the domain types used in port signatures, so adapter crates can
// implement ports without directly depending on `provider-settings-domain`.
pub use provider_settings_domain::{ValidationParams, ValidationReport};
