//! Coordinator configuration schema, defaults, validation, and normalization.
//!
//! - Deserialization uses `serde` (JSON or TOML).
//! - Validation is manual and returns typed errors mapped to `ErrorEnvelope`.
//! - Normalization enforces stable ordering for `trackedSources`.

use provider_settings_domain::LoadingSource;
use provider_settings_shared::{ErrorCode, ErrorEnvelope};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Current supported configuration schema version.
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Default delay between readiness and batch processing.
pub const DEFAULT_COALESCE_DELAY_MS: u64 = 100;
/// Default lifetime of a cached report.
pub const DEFAULT_CACHE_TTL_MS: u64 = 1_000;

const SECTION: &str = "coordinator";

const COALESCE_DELAY_MIN_MS: u64 = 0;
const COALESCE_DELAY_MAX_MS: u64 = 10_000;
const CACHE_TTL_MIN_MS: u64 = 0;
const CACHE_TTL_MAX_MS: u64 = 600_000;

/// Deferred validation coordinator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct CoordinatorConfig {
    /// Schema version for forward-compatible migrations.
    pub version: u32,
    /// Delay between the last loading flag settling and the batch running.
    pub coalesce_delay_ms: u64,
    /// How long a cached report stays usable.
    pub cache_ttl_ms: u64,
    /// Loading sources that must settle before validation runs.
    pub tracked_sources: Vec<LoadingSource>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_CONFIG_VERSION,
            coalesce_delay_ms: DEFAULT_COALESCE_DELAY_MS,
            cache_ttl_ms: DEFAULT_CACHE_TTL_MS,
            tracked_sources: LoadingSource::ALL.to_vec(),
        }
    }
}

impl CoordinatorConfig {
    /// Validate and normalize the config.
    pub fn validate_and_normalize(mut self) -> Result<ValidatedCoordinatorConfig, ConfigSchemaError> {
        self.validate_version()?;
        self.normalize();

        validate_duration_ms(
            "coalesceDelayMs",
            self.coalesce_delay_ms,
            COALESCE_DELAY_MIN_MS,
            COALESCE_DELAY_MAX_MS,
        )?;
        validate_duration_ms(
            "cacheTtlMs",
            self.cache_ttl_ms,
            CACHE_TTL_MIN_MS,
            CACHE_TTL_MAX_MS,
        )?;
        if self.tracked_sources.is_empty() {
            return Err(ConfigSchemaError::EmptyList {
                section: SECTION,
                field: "trackedSources",
            });
        }

        Ok(ValidatedCoordinatorConfig { raw: self })
    }

    const fn validate_version(&self) -> Result<(), ConfigSchemaError> {
        if self.version != CURRENT_CONFIG_VERSION {
            return Err(ConfigSchemaError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_CONFIG_VERSION,
            });
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.tracked_sources.sort_unstable();
        self.tracked_sources.dedup();
    }
}

/// Validated config wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCoordinatorConfig {
    raw: CoordinatorConfig,
}

impl ValidatedCoordinatorConfig {
    /// Coalescing delay as a `Duration`.
    #[must_use]
    pub const fn coalesce_delay(&self) -> Duration {
        Duration::from_millis(self.raw.coalesce_delay_ms)
    }

    /// Cache TTL as a `Duration`.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.raw.cache_ttl_ms)
    }

    /// Sorted, deduplicated tracked sources.
    #[must_use]
    pub fn tracked_sources(&self) -> &[LoadingSource] {
        &self.raw.tracked_sources
    }

    /// Consume the wrapper and return the raw config.
    #[must_use]
    pub fn into_inner(self) -> CoordinatorConfig {
        self.raw
    }
}

impl Default for ValidatedCoordinatorConfig {
    fn default() -> Self {
        Self {
            raw: CoordinatorConfig::default(),
        }
    }
}

impl AsRef<CoordinatorConfig> for ValidatedCoordinatorConfig {
    fn as_ref(&self) -> &CoordinatorConfig {
        &self.raw
    }
}

impl std::ops::Deref for ValidatedCoordinatorConfig {
    type Target = CoordinatorConfig;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

/// Parse a coordinator config from a JSON string, applying validation and normalization.
pub fn parse_coordinator_config_json(
    input: &str,
) -> Result<ValidatedCoordinatorConfig, ErrorEnvelope> {
    let config: CoordinatorConfig = serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Parse a coordinator config from a TOML string, applying validation and normalization.
pub fn parse_coordinator_config_toml(
    input: &str,
) -> Result<ValidatedCoordinatorConfig, ErrorEnvelope> {
    let config: CoordinatorConfig = toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })?;

    config.validate_and_normalize().map_err(Into::into)
}

/// Typed validation errors for the configuration schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSchemaError {
    /// The config version is not supported by this binary.
    UnsupportedVersion {
        /// Version found in the config.
        found: u32,
        /// Version supported by this crate.
        supported: u32,
    },
    /// A duration value is out of bounds.
    DurationOutOfRange {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file (e.g. `cacheTtlMs`).
        field: &'static str,
        /// Value provided (ms).
        value_ms: u64,
        /// Minimum allowed value (ms).
        min_ms: u64,
        /// Maximum allowed value (ms).
        max_ms: u64,
    },
    /// A list field that must have entries is empty.
    EmptyList {
        /// Schema section.
        section: &'static str,
        /// Field name in the config file (e.g. `trackedSources`).
        field: &'static str,
    },
}

impl ConfigSchemaError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedVersion { .. } => ErrorCode::new("config", "unsupported_version"),
            Self::DurationOutOfRange { .. } => ErrorCode::new("config", "invalid_duration"),
            Self::EmptyList { .. } => ErrorCode::new("config", "empty_list"),
        }
    }
}

impl fmt::Display for ConfigSchemaError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, supported } => write!(
                formatter,
                "unsupported config version {found} (supported: {supported})"
            ),
            Self::DurationOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => write!(
                formatter,
                "{section}.{field} must be between {min_ms} and {max_ms} ms (got {value_ms})"
            ),
            Self::EmptyList { section, field } => {
                write!(formatter, "{section}.{field} must have at least one entry")
            },
        }
    }
}

impl std::error::Error for ConfigSchemaError {}

impl From<ConfigSchemaError> for ErrorEnvelope {
    fn from(error: ConfigSchemaError) -> Self {
        let code = error.error_code();
        let message = error.to_string();
        let envelope = Self::expected(code, message);

        match error {
            ConfigSchemaError::UnsupportedVersion { found, supported } => envelope
                .with_metadata("found", found.to_string())
                .with_metadata("supported", supported.to_string()),
            ConfigSchemaError::DurationOutOfRange {
                section,
                field,
                value_ms,
                min_ms,
                max_ms,
            } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field)
                .with_metadata("value_ms", value_ms.to_string())
                .with_metadata("min_ms", min_ms.to_string())
                .with_metadata("max_ms", max_ms.to_string()),
            ConfigSchemaError::EmptyList { section, field } => envelope
                .with_metadata("section", section)
                .with_metadata("field", field),
        }
    }
}

const fn validate_duration_ms(
    field: &'static str,
    value_ms: u64,
    min_ms: u64,
    max_ms: u64,
) -> Result<(), ConfigSchemaError> {
    if value_ms < min_ms || value_ms > max_ms {
        return Err(ConfigSchemaError::DurationOutOfRange {
            section: SECTION,
            field,
            value_ms,
            min_ms,
            max_ms,
        });
    }
    Ok(())
}
