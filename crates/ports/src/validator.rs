//! Settings validation boundary contract.

use provider_settings_domain::{ValidationParams, ValidationReport};
use provider_settings_shared::Result;

/// The validation function the coordinator defers to.
///
/// Implementations must be synchronous and free of side effects. An `Err` (or
/// a panic) is reported to the single request that triggered the call.
pub trait SettingsValidatorPort: Send + Sync {
    /// Validate one settings snapshot.
    fn validate(&self, params: &ValidationParams) -> Result<ValidationReport>;
}

impl<F> SettingsValidatorPort for F
where
    F: Fn(&ValidationParams) -> Result<ValidationReport> + Send + Sync,
{
    fn validate(&self, params: &ValidationParams) -> Result<ValidationReport> {
        self(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_settings_shared::{ErrorCode, ErrorEnvelope};

    #[test]
    fn closures_implement_the_port() {
        let accept = |_: &ValidationParams| -> Result<ValidationReport> {
            Ok(ValidationReport::from_issues(Vec::new()))
        };
        let reject = |_: &ValidationParams| -> Result<ValidationReport> {
            Err(ErrorEnvelope::expected(ErrorCode::invalid_input(), "nope"))
        };

        let params = ValidationParams::default();
        assert!(accept.validate(&params).is_ok_and(|report| report.is_valid));
        assert!(reject.validate(&params).is_err());
    }
}
