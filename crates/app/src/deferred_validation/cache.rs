//! Single-slot report cache keyed by configuration fingerprint.

use provider_settings_domain::{ConfigFingerprint, ValidationReport};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: ConfigFingerprint,
    report: ValidationReport,
    stored_at: Instant,
}

/// Most recent report. Storing a new entry replaces the previous one.
#[derive(Debug, Clone)]
pub(super) struct ReportCache {
    ttl: Duration,
    slot: Option<CacheEntry>,
}

impl ReportCache {
    pub(super) const fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    /// Returns the cached report when the fingerprint matches and the entry
    /// is younger than the TTL.
    pub(super) fn lookup(
        &self,
        fingerprint: &ConfigFingerprint,
        now: Instant,
    ) -> Option<ValidationReport> {
        let entry = self.slot.as_ref()?;
        let fresh = now.saturating_duration_since(entry.stored_at) < self.ttl;
        (fresh && entry.fingerprint == *fingerprint).then(|| entry.report.clone())
    }

    pub(super) fn store(
        &mut self,
        fingerprint: ConfigFingerprint,
        report: ValidationReport,
        now: Instant,
    ) {
        self.slot = Some(CacheEntry {
            fingerprint,
            report,
            stored_at: now,
        });
    }

    /// Drops the slot. Returns true when an entry was present.
    pub(super) fn clear(&mut self) -> bool {
        self.slot.take().is_some()
    }
}
