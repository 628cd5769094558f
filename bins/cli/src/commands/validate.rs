//! Validate command handler.
//!
//! Runs a settings snapshot through the deferred coordinator the same way a
//! settings screen would: the request is issued while the sources are still
//! loading, the sources then settle, and any repeats hit the report cache.

use crate::error::{CliError, ExitCode};
use crate::format::{OutputMode, pretty_json};
use crate::{CliOutput, format_error_output};
use provider_settings_adapters::{JsonLogger, MemorySink, RuleBasedSettingsValidator};
use provider_settings_app::{DeferredValidator, DeferredValidatorDeps, DeferredValidatorOptions};
use provider_settings_config::{
    ValidatedCoordinatorConfig, load_coordinator_config_std_env, load_settings_snapshot,
};
use provider_settings_domain::{
    ConfigFingerprint, ValidationParams, ValidationReport, update_all,
};
use provider_settings_ports::{LogLevel, LoggerPort, SettingsValidatorPort};
use provider_settings_shared::Result;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Inputs for `psv validate`.
#[derive(Debug, Clone, Copy)]
pub struct ValidateCommandInput<'a> {
    /// Settings snapshot file (JSON or TOML).
    pub settings: &'a Path,
    /// Optional coordinator config file.
    pub config: Option<&'a Path>,
    /// Number of identical validations to issue.
    pub repeat: u32,
    /// Copy coordinator log events to stderr.
    pub events: bool,
}

#[derive(Debug)]
struct ValidationSummary {
    report: ValidationReport,
    fingerprint: ConfigFingerprint,
    requests: u32,
    validator_calls: usize,
}

/// Counts calls so the output can show how many were served from cache.
struct CountingValidator<V> {
    inner: V,
    calls: AtomicUsize,
}

impl<V: SettingsValidatorPort> SettingsValidatorPort for CountingValidator<V> {
    fn validate(&self, params: &ValidationParams) -> Result<ValidationReport> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.validate(params)
    }
}

/// Run the validate command.
pub fn run_validate(
    mode: OutputMode,
    input: ValidateCommandInput<'_>,
) -> std::result::Result<CliOutput, CliError> {
    let config = match load_coordinator_config_std_env(input.config) {
        Ok(config) => config,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };
    let params = match load_settings_snapshot(input.settings) {
        Ok(params) => params,
        Err(error) => return Ok(format_error_output(mode, &error)),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let sink = Arc::new(MemorySink::default());
    let logger: Option<Arc<dyn LoggerPort>> = input.events.then(|| {
        Arc::new(JsonLogger::new(sink.clone()).with_min_level(LogLevel::Debug))
            as Arc<dyn LoggerPort>
    });

    let outcome = runtime.block_on(validate_repeatedly(
        &config,
        params,
        input.repeat.max(1),
        logger,
    ));
    let events = sink.take().concat();

    let mut output = match outcome {
        Ok(summary) => format_validate_output(mode, &summary)?,
        Err(error) => format_error_output(mode, &error),
    };
    output.stderr.push_str(&events);
    Ok(output)
}

fn coordinator_options(config: &ValidatedCoordinatorConfig) -> DeferredValidatorOptions {
    DeferredValidatorOptions {
        coalesce_delay: config.coalesce_delay(),
        cache_ttl: config.cache_ttl(),
        tracked_sources: config.tracked_sources().to_vec(),
    }
}

async fn validate_repeatedly(
    config: &ValidatedCoordinatorConfig,
    params: ValidationParams,
    repeat: u32,
    logger: Option<Arc<dyn LoggerPort>>,
) -> Result<ValidationSummary> {
    let counter = Arc::new(CountingValidator {
        inner: RuleBasedSettingsValidator::new(),
        calls: AtomicUsize::new(0),
    });
    let options = coordinator_options(config);
    let tracked = options.tracked_sources.clone();
    let coordinator = DeferredValidator::with_options(
        DeferredValidatorDeps {
            validator: counter.clone(),
            logger,
        },
        options,
    );
    let fingerprint = ConfigFingerprint::of(&params);

    coordinator.update_loading_state(&update_all(tracked.iter().copied(), true));
    let (first, ()) = tokio::join!(coordinator.validate(params.clone()), async {
        coordinator.update_loading_state(&update_all(tracked.iter().copied(), false));
    });
    let mut report = first?;
    for _ in 1..repeat {
        report = coordinator.validate(params.clone()).await?;
    }
    tracing::debug!(
        fingerprint = %fingerprint,
        requests = repeat,
        validator_calls = counter.calls.load(Ordering::Relaxed),
        "validate command finished"
    );

    Ok(ValidationSummary {
        report,
        fingerprint,
        requests: repeat,
        validator_calls: counter.calls.load(Ordering::Relaxed),
    })
}

fn format_validate_output(
    mode: OutputMode,
    summary: &ValidationSummary,
) -> std::result::Result<CliOutput, CliError> {
    let report = &summary.report;
    let status = if report.is_valid { "valid" } else { "invalid" };

    let stdout = if mode.is_json() {
        pretty_json(&serde_json::json!({
            "status": status,
            "fingerprint": summary.fingerprint.digest(),
            "requests": summary.requests,
            "validatorCalls": summary.validator_calls,
            "report": report,
        }))?
    } else {
        let mut out = format!(
            "status: {status}\nfingerprint: {}\nrequests: {}\nvalidatorCalls: {}\nerrors: {}\nwarnings: {}\n",
            summary.fingerprint,
            summary.requests,
            summary.validator_calls,
            report.errors.len(),
            report.warnings.len(),
        );
        for issue in report.issues() {
            let _ = write!(out, "- {} {}: {}", issue.severity, issue.field, issue.message);
            if let Some(suggestion) = &issue.suggestion {
                let _ = write!(out, " (suggestion: {suggestion})");
            }
            out.push('\n');
        }
        out
    };

    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: if report.is_valid {
            ExitCode::Ok
        } else {
            ExitCode::InvalidSettings
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;
    use std::error::Error;
    use std::path::PathBuf;

    fn fixture(relative: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../fixtures")
            .join(relative)
    }

    #[test]
    fn repeats_within_ttl_hit_the_cache() -> std::result::Result<(), Box<dyn Error>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let params = load_settings_snapshot(&fixture("settings/valid.json"))?;
        let config = ValidatedCoordinatorConfig::default();

        let summary = runtime.block_on(validate_repeatedly(&config, params, 3, None))?;
        assert!(summary.report.is_valid);
        assert_eq!(summary.requests, 3);
        assert_eq!(summary.validator_calls, 1);
        Ok(())
    }

    #[test]
    fn invalid_settings_exit_with_invalid_code() -> std::result::Result<(), Box<dyn Error>> {
        let mode = OutputMode {
            format: OutputFormat::Text,
        };
        let output = run_validate(
            mode,
            ValidateCommandInput {
                settings: &fixture("settings/invalid.json"),
                config: Some(&fixture("config/coordinator.valid.json")),
                repeat: 1,
                events: true,
            },
        )?;

        assert_eq!(output.exit_code, ExitCode::InvalidSettings);
        assert!(output.stdout.starts_with("status: invalid\n"));
        assert!(output.stdout.contains("- error vectorConfig.baseUrl:"));
        assert!(output.stderr.contains("\"event\":\"validation.batch.start\""));
        Ok(())
    }
}
