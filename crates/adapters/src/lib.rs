//! # provider-settings-adapters
//!
//! Adapter implementations for ports: the rule-based settings validator and
//! the JSON-lines logger with its sinks.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod log_sink;
pub mod logger;
pub mod settings_validator;

pub use log_sink::{LogSink, MemorySink, StderrLogSink};
pub use logger::JsonLogger;
pub use settings_validator::RuleBasedSettingsValidator;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_settings_ports::ports_crate_version;
    use provider_settings_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                continue;
            }
            if in_deps && line.starts_with("provider-settings-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    #[test]
    fn adapters_do_not_depend_on_app_or_config() {
        let deps = workspace_deps();
        let forbidden = ["provider-settings-app", "provider-settings-config"];

        for dep in &deps {
            assert!(
                !forbidden.contains(&dep.as_str()),
                "forbidden dependency found: {dep}"
            );
        }
        assert!(deps.iter().any(|dep| dep == "provider-settings-ports"));
    }

    #[test]
    fn adapters_crate_compiles() {
        assert!(!adapters_crate_version().is_empty());
        assert!(!ports_crate_version().is_empty());
        assert!(!shared_crate_version().is_empty());
    }
}
