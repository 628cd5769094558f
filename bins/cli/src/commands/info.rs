//! Info command handler.

use crate::CliOutput;
use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, pretty_json};
use provider_settings_adapters::adapters_crate_version;
use provider_settings_app::app_crate_version;
use provider_settings_config::config_crate_version;
use provider_settings_domain::domain_crate_version;

/// Run the info command.
pub fn run_info(mode: OutputMode) -> Result<CliOutput, CliError> {
    let name = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let stdout = if mode.is_json() {
        pretty_json(&serde_json::json!({
            "status": "ok",
            "build": {
                "name": name,
                "version": version,
                "domainVersion": domain_crate_version(),
                "configVersion": config_crate_version(),
                "appVersion": app_crate_version(),
                "adaptersVersion": adapters_crate_version(),
            }
        }))?
    } else {
        format!(
            "status: ok\nname: {name}\nversion: {version}\ndomain: {}\nconfig: {}\napp: {}\nadapters: {}\n",
            domain_crate_version(),
            config_crate_version(),
            app_crate_version(),
            adapters_crate_version(),
        )
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}
