//! Integration coverage for settings snapshots, reports, and fingerprints.

use proptest::prelude::*;
use provider_settings_domain::{
    ConfigFingerprint, LoadingSource, PrimitiveError, ProviderId, ProviderRecord, ProviderSet,
    ProviderStatus, ValidationParams, ValidationReport,
};
use provider_settings_shared::ErrorEnvelope;

fn status_strategy() -> impl Strategy<Value = ProviderStatus> {
    prop_oneof![
        Just(ProviderStatus::Connected),
        Just(ProviderStatus::Disconnected),
        Just(ProviderStatus::Testing),
        Just(ProviderStatus::Error),
    ]
}

fn provider_entries() -> impl Strategy<Value = Vec<(String, ProviderStatus)>> {
    prop::collection::btree_map("[a-z][a-z0-9_-]{0,11}", status_strategy(), 1..6)
        .prop_map(|entries| entries.into_iter().collect())
}

fn params_from(entries: &[(String, ProviderStatus)]) -> Result<ValidationParams, PrimitiveError> {
    let mut providers = ProviderSet::new();
    for (id, status) in entries {
        providers.insert(ProviderId::parse(id)?, ProviderRecord::with_status(*status));
    }
    Ok(ValidationParams {
        providers: Some(providers),
        ..ValidationParams::default()
    })
}

proptest! {
    #[test]
    fn fingerprint_ignores_provider_order(
        (entries, shuffled) in provider_entries()
            .prop_flat_map(|entries| (Just(entries.clone()), Just(entries).prop_shuffle()))
    ) {
        let original = params_from(&entries);
        let reordered = params_from(&shuffled);
        prop_assert!(original.is_ok() && reordered.is_ok());
        if let (Ok(original), Ok(reordered)) = (original, reordered) {
            prop_assert_eq!(
                ConfigFingerprint::of(&original),
                ConfigFingerprint::of(&reordered)
            );
        }
    }
}

#[test]
fn json_key_order_does_not_change_the_fingerprint() -> Result<(), Box<dyn std::error::Error>> {
    let first: ValidationParams = serde_json::from_str(
        r#"{"providers":{"openai":{"status":"connected"},"ollama":{"status":"error"}}}"#,
    )?;
    let second: ValidationParams = serde_json::from_str(
        r#"{"providers":{"ollama":{"status":"error"},"openai":{"status":"connected"}}}"#,
    )?;

    assert_eq!(ConfigFingerprint::of(&first), ConfigFingerprint::of(&second));
    Ok(())
}

#[test]
fn embedding_selection_changes_the_fingerprint() -> Result<(), Box<dyn std::error::Error>> {
    let first: ValidationParams = serde_json::from_str(
        r#"{"embeddingConfig":{"provider":"openai","model":"text-embedding-3-small"}}"#,
    )?;
    let second: ValidationParams = serde_json::from_str(
        r#"{"embeddingConfig":{"provider":"openai","model":"text-embedding-3-large"}}"#,
    )?;

    assert_ne!(ConfigFingerprint::of(&first), ConfigFingerprint::of(&second));
    Ok(())
}

#[test]
fn primitive_errors_map_into_error_envelopes() -> Result<(), PrimitiveError> {
    let Err(error) = LoadingSource::parse("vectors") else {
        return Err(PrimitiveError::UnknownLoadingSource {
            input: "vectors".to_string(),
        });
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(envelope.code.namespace(), "domain");
    assert_eq!(envelope.code.code(), "unknown_loading_source");
    assert_eq!(envelope.metadata.get("input"), Some(&"vectors".to_string()));
    Ok(())
}

#[test]
fn report_round_trips_through_json() -> Result<(), serde_json::Error> {
    let report = ValidationReport::data_unavailable();
    let json = serde_json::to_string(&report)?;
    let parsed: ValidationReport = serde_json::from_str(&json)?;

    assert!(parsed.is_data_unavailable());
    assert_eq!(parsed, report);
    Ok(())
}
