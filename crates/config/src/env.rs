//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: invalid values fail fast instead of falling back to
//! defaults. CSV lists normalize to sorted, deduplicated values.

use crate::schema::{CoordinatorConfig, ValidatedCoordinatorConfig};
use provider_settings_domain::LoadingSource;
use provider_settings_shared::{ErrorCode, ErrorEnvelope, redact_if_secret};
use std::collections::BTreeMap;
use thiserror::Error;

/// Env var: coalescing delay in milliseconds.
pub const ENV_COALESCE_DELAY_MS: &str = "PSV_COALESCE_DELAY_MS";
/// Env var: cache TTL in milliseconds.
pub const ENV_CACHE_TTL_MS: &str = "PSV_CACHE_TTL_MS";
/// Env var: tracked loading sources as CSV.
pub const ENV_TRACKED_SOURCES: &str = "PSV_TRACKED_SOURCES";

const ENV_VARS: [&str; 3] = [ENV_COALESCE_DELAY_MS, ENV_CACHE_TTL_MS, ENV_TRACKED_SOURCES];

const MAX_CSV_ITEMS: usize = 32;

/// Env overrides for the coordinator config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorEnv {
    /// Override for `coalesceDelayMs`.
    pub coalesce_delay_ms: Option<u64>,
    /// Override for `cacheTtlMs`.
    pub cache_ttl_ms: Option<u64>,
    /// Override for `trackedSources`.
    pub tracked_sources: Option<Vec<LoadingSource>>,
}

impl CoordinatorEnv {
    /// Parse env overrides from a key/value map (useful for tests and fixtures).
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            coalesce_delay_ms: parse_optional_u64(map, ENV_COALESCE_DELAY_MS)?,
            cache_ttl_ms: parse_optional_u64(map, ENV_CACHE_TTL_MS)?,
            tracked_sources: parse_optional_csv_sources(map, ENV_TRACKED_SOURCES)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map: BTreeMap<String, String> = ENV_VARS
            .into_iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (name.to_owned(), value)))
            .collect();
        Self::from_map(&map)
    }

    /// Returns true when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.coalesce_delay_ms.is_none()
            && self.cache_ttl_ms.is_none()
            && self.tracked_sources.is_none()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
pub fn apply_env_overrides(
    base: CoordinatorConfig,
    env: &CoordinatorEnv,
) -> Result<ValidatedCoordinatorConfig, ErrorEnvelope> {
    let mut config = base;
    if let Some(value) = env.coalesce_delay_ms {
        config.coalesce_delay_ms = value;
    }
    if let Some(value) = env.cache_ttl_ms {
        config.cache_ttl_ms = value;
    }
    if let Some(sources) = &env.tracked_sources {
        config.tracked_sources.clone_from(sources);
    }

    config.validate_and_normalize().map_err(Into::into)
}

/// Validation failures when parsing env variables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    #[error("{var} must be non-empty")]
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Integer env var had an invalid value.
    #[error("{var} must be a non-negative integer")]
    InvalidInt {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
    /// CSV list exceeds a safety limit.
    #[error("{var} is too large ({len} items, max {max})")]
    CsvTooLarge {
        /// Env var name.
        var: &'static str,
        /// Number of parsed items.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// CSV contained an unknown loading source.
    #[error("{var} contains unknown loading source: {entry}")]
    InvalidSourceEntry {
        /// Env var name.
        var: &'static str,
        /// Invalid entry.
        entry: String,
    },
}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let envelope = Self::expected(ErrorCode::new("config", "invalid_env"), error.to_string());

        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidInt { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", redact_if_secret(var, &value)),
            EnvParseError::CsvTooLarge { var, len, max } => envelope
                .with_metadata("env_var", var)
                .with_metadata("len", len.to_string())
                .with_metadata("max", max.to_string()),
            EnvParseError::InvalidSourceEntry { var, entry } => envelope
                .with_metadata("env_var", var)
                .with_metadata("entry", entry),
        }
    }
}

fn parse_optional_u64(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<u64>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    trimmed
        .parse::<u64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidInt {
            var,
            value: raw.clone(),
        })
}

fn parse_optional_csv_sources(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<Vec<LoadingSource>>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Some(Vec::new()));
    }

    let items: Vec<&str> = trimmed
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    if items.len() > MAX_CSV_ITEMS {
        return Err(EnvParseError::CsvTooLarge {
            var,
            len: items.len(),
            max: MAX_CSV_ITEMS,
        });
    }

    let mut sources = items
        .into_iter()
        .map(|item| {
            LoadingSource::parse(item).map_err(|_| EnvParseError::InvalidSourceEntry {
                var,
                entry: item.to_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    sources.sort_unstable();
    sources.dedup();
    Ok(Some(sources))
}
