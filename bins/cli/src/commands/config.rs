//! Config command handlers.

use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, pretty_json};
use crate::{CliOutput, format_error_output};
use clap::ValueEnum;
use provider_settings_config::{load_coordinator_config_std_env, to_pretty_json, to_pretty_toml};
use std::path::Path;

/// Serialization used by `config show` in text mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFileFormat {
    /// Pretty JSON.
    Json,
    /// Pretty TOML.
    Toml,
}

/// Print the effective coordinator config (defaults, then file, then env).
pub fn run_config_show(
    mode: OutputMode,
    config_path: Option<&Path>,
    format: ConfigFileFormat,
) -> Result<CliOutput, CliError> {
    let config = match load_coordinator_config_std_env(config_path) {
        Ok(config) => config.into_inner(),
        Err(error) => return Ok(format_error_output(mode, &error)),
    };

    let stdout = if mode.is_json() {
        pretty_json(&serde_json::json!({
            "status": "ok",
            "config": serde_json::to_value(&config)?,
        }))?
    } else {
        let rendered = match format {
            ConfigFileFormat::Json => to_pretty_json(&config),
            ConfigFileFormat::Toml => to_pretty_toml(&config),
        };
        match rendered {
            Ok(rendered) => rendered,
            Err(error) => return Ok(format_error_output(mode, &error)),
        }
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
