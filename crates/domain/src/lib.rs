//! # provider-settings-domain
//!
//! Domain model for provider settings validation:
//!
//! - **Primitives** - `ProviderId`, `ProviderStatus`
//! - **Settings** - the `ValidationParams` snapshot and its sections
//! - **Reports** - `ValidationReport`, `ValidationIssue`, `Severity`
//! - **Loading** - `LoadingSource` flags gating validation
//! - **Fingerprint** - `ConfigFingerprint` cache key
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub use provider_settings_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod fingerprint;
pub mod loading;
pub mod primitives;
pub mod report;
pub mod settings;

pub use fingerprint::ConfigFingerprint;
pub use loading::{LoadingSource, LoadingState, LoadingUpdate, update_all};
pub use primitives::{PrimitiveError, ProviderId, ProviderStatus};
pub use report::{
    DATA_UNAVAILABLE_FIELD, LOADING_FIELD, Severity, ValidationIssue, ValidationReport,
};
pub use settings::{
    ModelParameters, ModelRef, ModelSelection, ProviderRecord, ProviderSet, ValidationParams,
    VectorSearchConfig,
};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        assert!(!domain_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
