//! CLI command handlers.

pub mod config;
pub mod info;
pub mod validate;

pub use config::{ConfigFileFormat, run_config_show};
pub use info::run_info;
pub use validate::{ValidateCommandInput, run_validate};
