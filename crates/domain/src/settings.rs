//! Provider settings snapshot submitted for validation.
//!
//! The snapshot mirrors what the settings screens load from their backing
//! stores: the provider registry, vector search settings, the embedding
//! selection, the text-generation model selection and sampling parameters.

use crate::primitives::{ProviderId, ProviderStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A provider entry as reported by the provider registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProviderRecord {
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Box<str>>,
    /// Last known connection status.
    pub status: ProviderStatus,
}

impl ProviderRecord {
    /// Build a record with only a status.
    #[must_use]
    pub const fn with_status(status: ProviderStatus) -> Self {
        Self { name: None, status }
    }
}

/// Providers keyed by id.
pub type ProviderSet = BTreeMap<ProviderId, ProviderRecord>;

/// Vector search settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct VectorSearchConfig {
    /// Whether vector search is turned on.
    pub enabled: bool,
    /// Base URL of the vector search service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<Box<str>>,
}

/// A `(provider, model)` selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ModelRef {
    /// Selected provider id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Box<str>>,
    /// Selected model id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Box<str>>,
}

impl ModelRef {
    /// Build a selection from provider and model ids.
    pub fn new(provider: impl Into<Box<str>>, model: impl Into<Box<str>>) -> Self {
        Self {
            provider: Some(provider.into()),
            model: Some(model.into()),
        }
    }

    fn provider_str(&self) -> &str {
        self.provider.as_deref().unwrap_or_default()
    }

    fn model_str(&self) -> &str {
        self.model.as_deref().unwrap_or_default()
    }
}

/// Model selection per capability.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ModelSelection {
    /// Model used for text generation.
    pub text_generation: ModelRef,
}

/// Sampling parameters for text generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ModelParameters {
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling probability mass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Everything a validation pass looks at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ValidationParams {
    /// Vector search settings.
    pub vector_config: VectorSearchConfig,
    /// Embedding provider/model selection.
    pub embedding_config: ModelRef,
    /// Text generation selection.
    pub model_selection: ModelSelection,
    /// Sampling parameters.
    pub model_parameters: ModelParameters,
    /// Provider registry; `None` when the registry was never fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub providers: Option<ProviderSet>,
}

impl ValidationParams {
    /// Returns true when at least one provider entry is present.
    ///
    /// An empty or absent registry is read as "the fetch did not complete",
    /// not as "nothing is configured".
    #[must_use]
    pub fn has_providers(&self) -> bool {
        self.providers
            .as_ref()
            .is_some_and(|providers| !providers.is_empty())
    }

    /// Look up a provider by raw id.
    #[must_use]
    pub fn provider(&self, id: &str) -> Option<&ProviderRecord> {
        let id = ProviderId::parse(id).ok()?;
        self.providers.as_ref()?.get(&id)
    }

    pub(crate) fn embedding_provider(&self) -> &str {
        self.embedding_config.provider_str()
    }

    pub(crate) fn embedding_model(&self) -> &str {
        self.embedding_config.model_str()
    }

    pub(crate) fn text_provider(&self) -> &str {
        self.model_selection.text_generation.provider_str()
    }

    pub(crate) fn text_model(&self) -> &str {
        self.model_selection.text_generation.model_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn snapshot_parses_camel_case_json() -> Result<(), Box<dyn Error>> {
        let params: ValidationParams = serde_json::from_value(serde_json::json!({
            "vectorConfig": { "enabled": true, "baseUrl": "http://localhost:6333" },
            "embeddingConfig": { "provider": "openai", "model": "text-embedding-3-small" },
            "modelSelection": { "textGeneration": { "provider": "openai", "model": "gpt-4o" } },
            "modelParameters": { "temperature": 0.7, "maxTokens": 1024 },
            "providers": { "openai": { "status": "connected" } }
        }))?;

        assert!(params.vector_config.enabled);
        assert!(params.has_providers());
        assert_eq!(
            params.provider("openai").map(|record| record.status),
            Some(ProviderStatus::Connected)
        );
        assert_eq!(params.model_parameters.max_tokens, Some(1024));
        Ok(())
    }

    #[test]
    fn empty_and_absent_registries_report_no_providers() {
        let absent = ValidationParams::default();
        assert!(!absent.has_providers());

        let empty = ValidationParams {
            providers: Some(ProviderSet::new()),
            ..ValidationParams::default()
        };
        assert!(!empty.has_providers());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<ValidationParams, _> =
            serde_json::from_value(serde_json::json!({ "vectorConfig": { "url": "x" } }));
        assert!(result.is_err());
    }
}
