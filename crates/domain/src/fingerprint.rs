//! Cache key derived from the validation-relevant parts of a snapshot.

use crate::settings::ValidationParams;
use sha2::{Digest, Sha256};
use std::fmt::{self, Write as _};

/// Composite comparison key for a settings snapshot.
///
/// Two snapshots with equal fingerprints are treated as the same input by the
/// result cache. Provider order does not matter; model parameters are not part
/// of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigFingerprint(Box<str>);

impl ConfigFingerprint {
    /// Derive the fingerprint of a snapshot.
    #[must_use]
    pub fn of(params: &ValidationParams) -> Self {
        let providers = params.providers.as_ref();
        // BTreeMap iteration is already sorted by id.
        let provider_ids: Vec<&str> = providers
            .into_iter()
            .flat_map(|set| set.keys().map(|id| id.as_str()))
            .collect();
        let mut provider_statuses: Vec<String> = providers
            .into_iter()
            .flat_map(|set| {
                set.iter()
                    .map(|(id, record)| format!("{id}:{}", record.status.as_str()))
            })
            .collect();
        provider_statuses.sort_unstable();

        let key = serde_json::json!([
            provider_ids,
            provider_statuses,
            params.vector_config.enabled,
            params.vector_config.base_url.as_deref().unwrap_or_default(),
            params.embedding_provider(),
            params.embedding_model(),
            params.text_provider(),
            params.text_model(),
        ]);
        Self(key.to_string().into_boxed_str())
    }

    /// The raw composite key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short hex digest suitable for log fields.
    #[must_use]
    pub fn digest(&self) -> String {
        let hash = Sha256::digest(self.0.as_bytes());
        hash.iter().take(8).fold(String::with_capacity(16), |mut out, byte| {
            let _ = write!(out, "{byte:02x}");
            out
        })
    }
}

impl fmt::Display for ConfigFingerprint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.digest())
    }
}
