//! Domain primitives with validated constructors.

use provider_settings_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validation failures for domain primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// `ProviderId` is empty after trimming.
    EmptyProviderId {
        /// Length of the raw input before trimming.
        input_length: usize,
    },
    /// `ProviderId` contains characters outside the allowlist.
    InvalidProviderId {
        /// Trimmed provider id that failed validation.
        input: String,
    },
    /// Loading source name is not recognized.
    UnknownLoadingSource {
        /// Raw source name.
        input: String,
    },
}

impl PrimitiveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyProviderId { .. } | Self::InvalidProviderId { .. } => {
                ErrorCode::new("domain", "invalid_provider_id")
            },
            Self::UnknownLoadingSource { .. } => {
                ErrorCode::new("domain", "unknown_loading_source")
            },
        }
    }
}

impl fmt::Display for PrimitiveError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyProviderId { .. } => formatter.write_str("ProviderId must be non-empty"),
            Self::InvalidProviderId { .. } => {
                formatter.write_str("ProviderId must match /^[a-zA-Z0-9_.-]+$/")
            },
            Self::UnknownLoadingSource { input } => {
                write!(formatter, "unknown loading source: {input}")
            },
        }
    }
}

impl std::error::Error for PrimitiveError {}

impl From<PrimitiveError> for ErrorEnvelope {
    fn from(error: PrimitiveError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            PrimitiveError::EmptyProviderId { input_length } => {
                envelope.with_metadata("input_length", input_length.to_string())
            },
            PrimitiveError::InvalidProviderId { input }
            | PrimitiveError::UnknownLoadingSource { input } => {
                envelope.with_metadata("input", input)
            },
        }
    }
}

/// Identifier of a configured AI provider (e.g. `openai`, `ollama`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(Box<str>);

impl ProviderId {
    /// Parse a provider id from user input.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, PrimitiveError> {
        let raw = input.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PrimitiveError::EmptyProviderId {
                input_length: raw.len(),
            });
        }
        if !trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
        {
            return Err(PrimitiveError::InvalidProviderId {
                input: trimmed.to_owned(),
            });
        }

        Ok(Self(trimmed.to_owned().into_boxed_str()))
    }

    /// Access the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProviderId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<String> for ProviderId {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ProviderId> for String {
    fn from(value: ProviderId) -> Self {
        value.0.into_string()
    }
}

/// Connection status last reported for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    /// The last connection test succeeded.
    Connected,
    /// The provider is configured but was never reached.
    Disconnected,
    /// A connection test is in flight.
    Testing,
    /// The last connection test failed.
    Error,
}

impl ProviderStatus {
    /// Canonical string used in fingerprints and config files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Testing => "testing",
            Self::Error => "error",
        }
    }

    /// Returns true when the provider can serve requests.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_trims_and_validates() {
        let id = ProviderId::parse("  openai ").map(|id| id.to_string());
        assert_eq!(id.ok().as_deref(), Some("openai"));

        assert_eq!(
            ProviderId::parse("   "),
            Err(PrimitiveError::EmptyProviderId { input_length: 3 })
        );
        assert!(matches!(
            ProviderId::parse("open ai"),
            Err(PrimitiveError::InvalidProviderId { .. })
        ));
    }

    #[test]
    fn provider_id_deserializes_through_validation() {
        let ok: Result<ProviderId, _> = serde_json::from_str("\"ollama\"");
        assert!(ok.is_ok());

        let bad: Result<ProviderId, _> = serde_json::from_str("\"\"");
        assert!(bad.is_err());
    }
}
