//! Loading flags for the data sources a validation pass depends on.

use crate::primitives::PrimitiveError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A data source whose fetch must settle before validation may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadingSource {
    /// Provider registry.
    Providers,
    /// Vector search settings.
    VectorConfig,
    /// Embedding selection.
    EmbeddingConfig,
    /// Text generation selection.
    ModelSelection,
    /// Sampling parameters.
    ModelParameters,
}

impl LoadingSource {
    /// Every known source.
    pub const ALL: [Self; 5] = [
        Self::Providers,
        Self::VectorConfig,
        Self::EmbeddingConfig,
        Self::ModelSelection,
        Self::ModelParameters,
    ];

    /// Stable camelCase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Providers => "providers",
            Self::VectorConfig => "vectorConfig",
            Self::EmbeddingConfig => "embeddingConfig",
            Self::ModelSelection => "modelSelection",
            Self::ModelParameters => "modelParameters",
        }
    }

    /// Parse a source name. Matching ignores ASCII case.
    pub fn parse(input: &str) -> Result<Self, PrimitiveError> {
        let trimmed = input.trim();
        Self::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PrimitiveError::UnknownLoadingSource {
                input: input.to_owned(),
            })
    }
}

impl fmt::Display for LoadingSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Partial flag update; sources not mentioned keep their value.
pub type LoadingUpdate = BTreeMap<LoadingSource, bool>;

/// Merged loading flags for the tracked sources.
///
/// A source counts as settled only once it was explicitly reported `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingState {
    tracked: BTreeSet<LoadingSource>,
    flags: BTreeMap<LoadingSource, bool>,
}

impl LoadingState {
    /// Track every known source.
    #[must_use]
    pub fn new() -> Self {
        Self::tracking(LoadingSource::ALL)
    }

    /// Track the given sources. An empty set falls back to every source.
    #[must_use]
    pub fn tracking(sources: impl IntoIterator<Item = LoadingSource>) -> Self {
        let mut tracked: BTreeSet<_> = sources.into_iter().collect();
        if tracked.is_empty() {
            tracked.extend(LoadingSource::ALL);
        }
        Self {
            tracked,
            flags: BTreeMap::new(),
        }
    }

    /// Merge a partial update.
    pub fn merge(&mut self, update: &LoadingUpdate) {
        self.flags
            .extend(update.iter().map(|(source, loading)| (*source, *loading)));
    }

    /// Returns true when every tracked source is explicitly `false`.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.tracked
            .iter()
            .all(|source| self.flags.get(source) == Some(&false))
    }

    /// Tracked sources that are still loading or never reported.
    #[must_use]
    pub fn blocking_sources(&self) -> Vec<LoadingSource> {
        self.tracked
            .iter()
            .copied()
            .filter(|source| self.flags.get(source) != Some(&false))
            .collect()
    }
}

impl Default for LoadingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an update that marks every listed source with the same flag.
#[must_use]
pub fn update_all(sources: impl IntoIterator<Item = LoadingSource>, loading: bool) -> LoadingUpdate {
    sources.into_iter().map(|source| (source, loading)).collect()
}
