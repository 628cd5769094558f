//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand};
use commands::{ConfigFileFormat, ValidateCommandInput, run_config_show, run_info, run_validate};
use error::{CliError, ExitCode};
use format::{OutputArgs, OutputMode};
use provider_settings_shared::{ErrorEnvelope, redact_if_secret};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "psv",
    version,
    about = "Deferred, cached validation of AI provider settings",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show build and version details.
    Info,
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Validate a settings snapshot through the deferred coordinator.
    Validate {
        /// Settings snapshot file (JSON/TOML).
        #[arg(long)]
        settings: PathBuf,
        /// Optional coordinator config file (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Issue the same validation this many times.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=1_000))]
        repeat: u32,
        /// Write coordinator log events (JSON lines) to stderr.
        #[arg(long)]
        events: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective coordinator config after file and env overrides.
    Show {
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Serialization used in text mode.
        #[arg(long, value_enum, default_value = "json")]
        format: ConfigFileFormat,
    },
}

pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    init_tracing();
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);

    match run(&cli.command, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

/// Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands, mode: OutputMode) -> Result<CliOutput, CliError> {
    match command {
        Commands::Info => run_info(mode),
        Commands::Config { command } => match command {
            ConfigCommands::Show { config, format } => {
                run_config_show(mode, config.as_deref(), *format)
            },
        },
        Commands::Validate {
            settings,
            config,
            repeat,
            events,
        } => run_validate(
            mode,
            ValidateCommandInput {
                settings,
                config: config.as_deref(),
                repeat: *repeat,
                events: *events,
            },
        ),
    }
}

pub(crate) fn format_error_output(mode: OutputMode, error: &ErrorEnvelope) -> CliOutput {
    let metadata: BTreeMap<&str, String> = error
        .metadata
        .iter()
        .map(|(key, value)| (key.as_str(), redact_if_secret(key, value)))
        .collect();

    let stdout = if mode.is_json() {
        let payload = serde_json::json!({
            "status": "error",
            "error": {
                "code": error.code.to_string(),
                "kind": error.kind.to_string(),
                "class": error.class.to_string(),
                "message": error.message,
                "metadata": metadata,
            },
        });

        // This is a CLI boundary, so JSON serialization errors are internal.
        let mut output = serde_json::to_string_pretty(&payload).unwrap_or_else(|_| {
            "{\"status\":\"error\",\"error\":{\"code\":\"core:internal\",\"message\":\"internal error\"}}".to_string()
        });
        output.push('\n');
        output
    } else {
        let mut output = format!(
            "status: error\ncode: {}\nmessage: {}\n",
            error.code, error.message
        );
        for (key, value) in &metadata {
            let _ = writeln!(output, "{key}: {value}");
        }
        output
    };

    CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Error,
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}
