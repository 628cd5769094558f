//! # provider-settings-config
//!
//! Coordinator configuration schema, env overrides, and file loading for
//! coordinator configs and settings snapshots.
//! This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config and snapshot loading helpers (env + file).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use schema::{
    CURRENT_CONFIG_VERSION, ConfigSchemaError, CoordinatorConfig, DEFAULT_CACHE_TTL_MS,
    DEFAULT_COALESCE_DELAY_MS, ValidatedCoordinatorConfig, parse_coordinator_config_json,
    parse_coordinator_config_toml,
};

pub use env::{
    CoordinatorEnv, ENV_CACHE_TTL_MS, ENV_COALESCE_DELAY_MS, ENV_TRACKED_SOURCES, EnvParseError,
    apply_env_overrides,
};
pub use load::{
    load_coordinator_config_from_path, load_coordinator_config_std_env, load_settings_snapshot,
    parse_settings_snapshot_json, to_pretty_json, to_pretty_toml,
};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
