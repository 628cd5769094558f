//! Validation report types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field name carried by the synthetic "data unavailable" warning.
pub const DATA_UNAVAILABLE_FIELD: &str = "_dataUnavailable";

/// Field name carried by the synthetic loading notice.
pub const LOADING_FIELD: &str = "_loading";

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks saving the configuration.
    Error,
    /// Worth surfacing but not blocking.
    Warning,
    /// Informational only.
    Info,
}

impl Severity {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single finding attached to a settings field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Dotted path of the offending field (e.g. `vectorConfig.baseUrl`).
    pub field: Box<str>,
    /// Human-readable description.
    pub message: Box<str>,
    /// Severity of the finding.
    pub severity: Severity,
    /// Optional remediation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Box<str>>,
}

impl ValidationIssue {
    /// Build an issue with an explicit severity.
    pub fn new(
        field: impl Into<Box<str>>,
        message: impl Into<Box<str>>,
        severity: Severity,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity,
            suggestion: None,
        }
    }

    /// Build an error-severity issue.
    pub fn error(field: impl Into<Box<str>>, message: impl Into<Box<str>>) -> Self {
        Self::new(field, message, Severity::Error)
    }

    /// Build a warning-severity issue.
    pub fn warning(field: impl Into<Box<str>>, message: impl Into<Box<str>>) -> Self {
        Self::new(field, message, Severity::Warning)
    }

    /// Build an info-severity issue.
    pub fn info(field: impl Into<Box<str>>, message: impl Into<Box<str>>) -> Self {
        Self::new(field, message, Severity::Info)
    }

    /// Attach a remediation hint.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<Box<str>>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Outcome of validating a settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when `errors` is empty.
    pub is_valid: bool,
    /// Blocking findings.
    #[serde(default)]
    pub errors: Vec<ValidationIssue>,
    /// Non-blocking findings.
    #[serde(default)]
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Split issues by severity and derive `is_valid`.
    ///
    /// Error-severity issues land in `errors`; everything else lands in
    /// `warnings`.
    #[must_use]
    pub fn from_issues(issues: impl IntoIterator<Item = ValidationIssue>) -> Self {
        let (errors, warnings): (Vec<_>, Vec<_>) = issues
            .into_iter()
            .partition(|issue| issue.severity == Severity::Error);
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Interim result while settings are still loading.
    #[must_use]
    pub const fn loading() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Interim result carrying a single informational notice.
    #[must_use]
    pub fn loading_message() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: vec![ValidationIssue::info(
                LOADING_FIELD,
                "Loading configuration data...",
            )],
        }
    }

    /// Result used when the provider registry could not be read.
    #[must_use]
    pub fn data_unavailable() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: vec![
                ValidationIssue::warning(
                    DATA_UNAVAILABLE_FIELD,
                    "Provider data is unavailable; configuration cannot be fully validated",
                )
                .with_suggestion("Check the provider service connection and reload settings"),
            ],
        }
    }

    /// Returns true when this is the synthetic data-unavailable result.
    #[must_use]
    pub fn is_data_unavailable(&self) -> bool {
        self.warnings
            .iter()
            .any(|issue| issue.field.as_ref() == DATA_UNAVAILABLE_FIELD)
    }

    /// All issues, errors first.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }
}
