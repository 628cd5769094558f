//! Pending request bookkeeping.

use provider_settings_domain::{ConfigFingerprint, ValidationParams, ValidationReport};
use provider_settings_shared::{RequestId, Result};
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Completion handle for one queued `validate` call.
pub(super) type Completion = oneshot::Sender<Result<ValidationReport>>;

/// A `validate` call waiting for the next batch.
#[derive(Debug)]
pub(super) struct PendingRequest {
    pub(super) id: RequestId,
    pub(super) enqueued_at: Instant,
    pub(super) params: ValidationParams,
    pub(super) fingerprint: ConfigFingerprint,
    completion: Completion,
}

impl PendingRequest {
    pub(super) fn new(
        params: ValidationParams,
        fingerprint: ConfigFingerprint,
    ) -> (Self, oneshot::Receiver<Result<ValidationReport>>) {
        let (completion, receiver) = oneshot::channel();
        let request = Self {
            id: RequestId::next(),
            enqueued_at: Instant::now(),
            params,
            fingerprint,
            completion,
        };
        (request, receiver)
    }

    /// Resolve the caller. Returns false when the caller stopped waiting.
    pub(super) fn complete(self, outcome: Result<ValidationReport>) -> bool {
        self.completion.send(outcome).is_ok()
    }
}
