//! # provider-settings-shared
//!
//! Foundational types used by every other crate in the workspace:
//!
//! - the structured `ErrorEnvelope` and the `Result` alias built on it
//! - process-unique request identifiers for log correlation
//! - secret-key detection for log and metadata redaction
//!
//! This crate only depends on external crates.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod errors;
pub mod ids;
pub mod redaction;
pub mod result;

pub use errors::{ErrorClass, ErrorCode, ErrorEnvelope, ErrorKind, ErrorMetadata};
pub use ids::RequestId;
pub use redaction::{REDACTED, is_secret_key, redact_if_secret};
pub use result::Result;

/// Returns the shared crate version.
#[must_use]
pub const fn shared_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_error_types_are_available() {
        let error = ErrorEnvelope::expected(ErrorCode::invalid_input(), "invalid");
        assert_eq!(error.kind, ErrorKind::Expected);
        assert_eq!(error.class, ErrorClass::NonRetriable);
        assert!(!shared_crate_version().is_empty());
    }

    #[test]
    fn envelope_serializes_without_empty_metadata() -> std::result::Result<(), serde_json::Error> {
        let error = ErrorEnvelope::cancelled("queue cleared");
        let json = serde_json::to_value(&error)?;
        assert!(json.get("metadata").is_none());
        assert_eq!(json["code"]["namespace"], "core");
        Ok(())
    }
}
