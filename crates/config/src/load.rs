//! Config and settings snapshot loading (env + file).
//!
//! The loader is responsible for deterministic merge order and surfacing
//! user-facing errors as typed `ErrorEnvelope`s.

use crate::{CoordinatorConfig, CoordinatorEnv, ValidatedCoordinatorConfig, apply_env_overrides};
use provider_settings_domain::ValidationParams;
use provider_settings_shared::{ErrorClass, ErrorCode, ErrorEnvelope};
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Toml,
}

/// Load the coordinator config from an optional file path.
///
/// Precedence (highest wins):
/// - env overrides (`CoordinatorEnv`)
/// - config file content
/// - defaults (`CoordinatorConfig::default()`)
pub fn load_coordinator_config_from_path(
    config_path: Option<&Path>,
    env: &CoordinatorEnv,
) -> Result<ValidatedCoordinatorConfig, ErrorEnvelope> {
    let config = match config_path {
        None => CoordinatorConfig::default(),
        Some(path) => {
            let text = read_file(path, "config")?;
            let format = detect_format(path, "config")?;
            parse_unvalidated::<CoordinatorConfig>(&text, format, "config")?
        },
    };

    // env is applied last and also validates/normalizes the resulting config.
    apply_env_overrides(config, env)
}

/// Load the coordinator config from std env and an optional file path.
pub fn load_coordinator_config_std_env(
    config_path: Option<&Path>,
) -> Result<ValidatedCoordinatorConfig, ErrorEnvelope> {
    let env = CoordinatorEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_coordinator_config_from_path(config_path, &env)
}

/// Load a settings snapshot from a `.json` or `.toml` file.
pub fn load_settings_snapshot(path: &Path) -> Result<ValidationParams, ErrorEnvelope> {
    let text = read_file(path, "settings")?;
    let format = detect_format(path, "settings")?;
    parse_unvalidated(&text, format, "settings")
        .map_err(|error| error.with_metadata("path", path.to_string_lossy().to_string()))
}

/// Parse a settings snapshot from a JSON string.
pub fn parse_settings_snapshot_json(input: &str) -> Result<ValidationParams, ErrorEnvelope> {
    parse_unvalidated(input, FileFormat::Json, "settings")
}

/// Serialize the config as deterministic pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &CoordinatorConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

/// Serialize the config as deterministic pretty TOML (with trailing newline).
pub fn to_pretty_toml(config: &CoordinatorConfig) -> Result<String, ErrorEnvelope> {
    let mut output = toml::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_toml"),
            format!("failed to serialize config TOML: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

fn parse_unvalidated<T: DeserializeOwned>(
    input: &str,
    format: FileFormat,
    namespace: &'static str,
) -> Result<T, ErrorEnvelope> {
    match format {
        FileFormat::Json => serde_json::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new(namespace, "invalid_json"),
                format!("invalid {namespace} JSON: {error}"),
            )
        }),
        FileFormat::Toml => toml::from_str(input).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new(namespace, "invalid_toml"),
                format!("invalid {namespace} TOML: {error}"),
            )
        }),
    }
}

fn read_file(path: &Path, namespace: &'static str) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        let code = match error.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::new(namespace, "file_not_found"),
            std::io::ErrorKind::PermissionDenied => {
                ErrorCode::new(namespace, "file_permission_denied")
            },
            _ => ErrorCode::new(namespace, "file_io"),
        };

        ErrorEnvelope::expected(code, format!("failed to read {namespace} file: {error}"))
            .with_metadata("path", path.to_string_lossy().to_string())
    })
}

fn detect_format(path: &Path, namespace: &'static str) -> Result<FileFormat, ErrorEnvelope> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        None | Some("json") => Ok(FileFormat::Json),
        Some("toml") => Ok(FileFormat::Toml),
        Some(other) => Err(ErrorEnvelope::expected(
            ErrorCode::new(namespace, "unsupported_format"),
            "unsupported file format; use .json or .toml",
        )
        .with_metadata("extension", other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ENV_CACHE_TTL_MS;
    use std::collections::BTreeMap;
    use std::error::Error;

    #[test]
    fn missing_config_path_uses_defaults() -> Result<(), Box<dyn Error>> {
        let config = load_coordinator_config_from_path(None, &CoordinatorEnv::default())?;
        assert_eq!(config.as_ref(), &CoordinatorConfig::default());
        Ok(())
    }

    #[test]
    fn invalid_file_value_overridden_by_valid_env_succeeds() -> Result<(), Box<dyn Error>> {
        let dir = std::env::temp_dir().join(format!("psv-load-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("coordinator.json");
        std::fs::write(&path, r#"{"cacheTtlMs": 999999999}"#)?;

        let env = CoordinatorEnv::from_map(&BTreeMap::from([(
            ENV_CACHE_TTL_MS.to_owned(),
            "2000".to_owned(),
        )]))?;
        let config = load_coordinator_config_from_path(Some(&path), &env)?;
        assert_eq!(config.cache_ttl_ms, 2_000);

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn missing_files_report_namespaced_codes() {
        let path = Path::new("/definitely/not/here/settings.json");
        let result = load_settings_snapshot(path);
        assert!(result.is_err_and(|error| {
            error.code == ErrorCode::new("settings", "file_not_found")
                && error.metadata.contains_key("path")
        }));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(detect_format(Path::new("config.yaml"), "config").is_err_and(|error| {
            error.code == ErrorCode::new("config", "unsupported_format")
        }));
    }

    #[test]
    fn serialization_is_deterministic() -> Result<(), Box<dyn Error>> {
        let config = CoordinatorConfig::default();
        let first = to_pretty_json(&config)?;
        let second = to_pretty_json(&config)?;
        assert_eq!(first, second);
        assert!(first.contains("\"coalesceDelayMs\": 100"));

        let toml = to_pretty_toml(&config)?;
        assert!(toml.contains("cacheTtlMs = 1000"));
        Ok(())
    }
}
