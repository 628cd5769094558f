//! Rule-based settings validator.
//!
//! Checks a settings snapshot against static rules: provider registry
//! presence, vector search URL, embedding and text-generation selections, and
//! sampling parameter ranges.

use provider_settings_domain::{ModelRef, ValidationIssue, ValidationParams, ValidationReport};
use provider_settings_ports::SettingsValidatorPort;
use provider_settings_shared::Result;
use url::Url;

/// Temperature range accepted by every supported provider.
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);
/// Temperatures above this are allowed but flagged.
pub const TEMPERATURE_WARN_ABOVE: f64 = 1.5;
/// Accepted `topP` range.
pub const TOP_P_RANGE: (f64, f64) = (0.0, 1.0);

/// Which selection a `ModelRef` belongs to, for field paths and messages.
#[derive(Debug, Clone, Copy)]
struct Selection {
    prefix: &'static str,
    label: &'static str,
}

const EMBEDDING: Selection = Selection {
    prefix: "embeddingConfig",
    label: "embedding",
};

const TEXT_GENERATION: Selection = Selection {
    prefix: "modelSelection.textGeneration",
    label: "text generation",
};

/// Stateless validator applying the built-in rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSettingsValidator;

impl RuleBasedSettingsValidator {
    /// Create a validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Run every rule and collect the findings.
    #[must_use]
    pub fn check(&self, params: &ValidationParams) -> ValidationReport {
        let mut issues = Vec::new();
        check_providers(params, &mut issues);
        check_vector_config(params, &mut issues);
        check_selection(params, &params.embedding_config, EMBEDDING, &mut issues);
        check_selection(
            params,
            &params.model_selection.text_generation,
            TEXT_GENERATION,
            &mut issues,
        );
        check_model_parameters(params, &mut issues);
        ValidationReport::from_issues(issues)
    }
}

impl SettingsValidatorPort for RuleBasedSettingsValidator {
    fn validate(&self, params: &ValidationParams) -> Result<ValidationReport> {
        Ok(self.check(params))
    }
}

fn check_providers(params: &ValidationParams, issues: &mut Vec<ValidationIssue>) {
    if !params.has_providers() {
        issues.push(
            ValidationIssue::error("providers", "No AI providers are configured")
                .with_suggestion("Add at least one provider in the provider settings"),
        );
    }
}

fn check_vector_config(params: &ValidationParams, issues: &mut Vec<ValidationIssue>) {
    const FIELD: &str = "vectorConfig.baseUrl";
    let config = &params.vector_config;
    let base_url = config.base_url.as_deref().map(str::trim).unwrap_or_default();

    if base_url.is_empty() {
        if config.enabled {
            issues.push(
                ValidationIssue::error(FIELD, "Vector search is enabled but has no base URL")
                    .with_suggestion("Set the vector search service URL or disable vector search"),
            );
        }
        return;
    }

    match Url::parse(base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {},
        Ok(url) => issues.push(
            ValidationIssue::error(FIELD, format!("Unsupported URL scheme '{}'", url.scheme()))
                .with_suggestion("Use an http:// or https:// URL"),
        ),
        Err(error) => issues.push(
            ValidationIssue::error(FIELD, format!("Invalid URL: {error}"))
                .with_suggestion("Use an absolute URL such as http://localhost:6333"),
        ),
    }
}

fn check_selection(
    params: &ValidationParams,
    selection: &ModelRef,
    kind: Selection,
    issues: &mut Vec<ValidationIssue>,
) {
    let provider_field = format!("{}.provider", kind.prefix);
    match selection.provider.as_deref().map(str::trim) {
        None | Some("") => issues.push(ValidationIssue::error(
            provider_field,
            format!("No {} provider selected", kind.label),
        )),
        Some(provider) => match params.provider(provider) {
            None if params.has_providers() => issues.push(
                ValidationIssue::error(
                    provider_field,
                    format!("Unknown {} provider '{provider}'", kind.label),
                )
                .with_suggestion("Select one of the configured providers"),
            ),
            None => {},
            Some(record) if !record.status.is_connected() => issues.push(
                ValidationIssue::warning(
                    provider_field,
                    format!("Provider '{provider}' is {}", record.status.as_str()),
                )
                .with_suggestion("Test the provider connection before saving"),
            ),
            Some(_) => {},
        },
    }

    if selection.model.as_deref().map(str::trim).unwrap_or_default().is_empty() {
        issues.push(ValidationIssue::error(
            format!("{}.model", kind.prefix),
            format!("No {} model selected", kind.label),
        ));
    }
}

fn check_model_parameters(params: &ValidationParams, issues: &mut Vec<ValidationIssue>) {
    let parameters = &params.model_parameters;

    if let Some(temperature) = parameters.temperature {
        let (min, max) = TEMPERATURE_RANGE;
        if !(min..=max).contains(&temperature) {
            issues.push(ValidationIssue::error(
                "modelParameters.temperature",
                format!("Temperature must be between {min} and {max}"),
            ));
        } else if temperature > TEMPERATURE_WARN_ABOVE {
            issues.push(
                ValidationIssue::warning(
                    "modelParameters.temperature",
                    "High temperature may produce unpredictable output",
                )
                .with_suggestion("Values between 0.2 and 1.0 suit most tasks"),
            );
        }
    }

    if let Some(top_p) = parameters.top_p {
        let (min, max) = TOP_P_RANGE;
        if !(min..=max).contains(&top_p) {
            issues.push(ValidationIssue::error(
                "modelParameters.topP",
                format!("topP must be between {min} and {max}"),
            ));
        }
    }

    if parameters.max_tokens == Some(0) {
        issues.push(ValidationIssue::error(
            "modelParameters.maxTokens",
            "maxTokens must be greater than zero",
        ));
    }
}
