//! # provider-settings-app
//!
//! The deferred validation coordinator.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod deferred_validation;

pub use deferred_validation::{
    CoordinatorPhase, DEFAULT_CACHE_TTL, DEFAULT_COALESCE_DELAY, DeferredValidator,
    DeferredValidatorDeps, DeferredValidatorOptions,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
