//! Deferred validation coordinator.
//!
//! `DeferredValidator` sits between settings screens and a
//! [`SettingsValidatorPort`]. It holds requests until every tracked loading
//! source has settled, coalesces bursts into one batch after a short delay,
//! and serves repeated identical requests from a single-slot TTL cache.
//!
//! Phases:
//!
//! - `Blocked`: some tracked source is still loading or never reported.
//! - `Ready`: every tracked source settled and no batch is armed.
//! - `Processing`: a batch timer is armed or a batch is draining.
//!
//! The state lock is never held across an `.await` or a validator call.

mod cache;
mod queue;

use cache::ReportCache;
use provider_settings_domain::{
    ConfigFingerprint, LoadingSource, LoadingState, LoadingUpdate, ValidationParams,
    ValidationReport,
};
use provider_settings_ports::{LoggerPort, SettingsValidatorPort, log_fields};
use provider_settings_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use queue::PendingRequest;
use serde_json::Value;
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default delay between readiness and batch processing.
pub const DEFAULT_COALESCE_DELAY: Duration = Duration::from_millis(100);
/// Default lifetime of a cached report.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(1_000);

/// Coordinator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinatorPhase {
    /// At least one tracked source is loading or unset.
    Blocked,
    /// All tracked sources settled; nothing scheduled.
    Ready,
    /// A batch timer is armed or a batch is draining.
    Processing,
}

impl CoordinatorPhase {
    /// Stable lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::Ready => "ready",
            Self::Processing => "processing",
        }
    }
}

/// Tuning knobs for the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredValidatorOptions {
    /// Delay between the last source settling and the batch running.
    pub coalesce_delay: Duration,
    /// How long a cached report stays usable.
    pub cache_ttl: Duration,
    /// Sources that gate validation. Empty means every source.
    pub tracked_sources: Vec<LoadingSource>,
}

impl Default for DeferredValidatorOptions {
    fn default() -> Self {
        Self {
            coalesce_delay: DEFAULT_COALESCE_DELAY,
            cache_ttl: DEFAULT_CACHE_TTL,
            tracked_sources: LoadingSource::ALL.to_vec(),
        }
    }
}

/// Dependencies required by the coordinator.
#[derive(Clone)]
pub struct DeferredValidatorDeps {
    /// The validation function being deferred.
    pub validator: Arc<dyn SettingsValidatorPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// Cheaply clonable handle to one coordinator instance.
#[derive(Clone)]
pub struct DeferredValidator {
    inner: Arc<Inner>,
}

struct Inner {
    deps: DeferredValidatorDeps,
    coalesce_delay: Duration,
    state: Mutex<State>,
}

struct State {
    loading: LoadingState,
    queue: VecDeque<PendingRequest>,
    cache: ReportCache,
    timer: Option<ArmedTimer>,
    next_epoch: u64,
    draining: bool,
}

struct ArmedTimer {
    epoch: u64,
    handle: JoinHandle<()>,
}

impl DeferredValidator {
    /// Build a coordinator with default options.
    #[must_use]
    pub fn new(deps: DeferredValidatorDeps) -> Self {
        Self::with_options(deps, DeferredValidatorOptions::default())
    }

    /// Build a coordinator with explicit options.
    #[must_use]
    pub fn with_options(deps: DeferredValidatorDeps, options: DeferredValidatorOptions) -> Self {
        let state = State {
            loading: LoadingState::tracking(options.tracked_sources),
            queue: VecDeque::new(),
            cache: ReportCache::new(options.cache_ttl),
            timer: None,
            next_epoch: 0,
            draining: false,
        };
        Self {
            inner: Arc::new(Inner {
                deps,
                coalesce_delay: options.coalesce_delay,
                state: Mutex::new(state),
            }),
        }
    }

    /// Merge loading flags. Schedules a batch once every tracked source is
    /// `false` and requests are waiting.
    pub fn update_loading_state(&self, update: &LoadingUpdate) {
        let mut state = self.inner.lock_state();
        state.loading.merge(update);
        if state.loading.is_ready() {
            if !state.queue.is_empty() {
                self.inner.schedule(&mut state);
            }
        } else {
            tracing::debug!(
                blocking = ?state.loading.blocking_sources(),
                pending = state.queue.len(),
                "validation blocked on loading sources"
            );
        }
    }

    /// Validate a settings snapshot.
    ///
    /// Resolves immediately from cache when every source has settled and a
    /// fresh report for the same fingerprint exists. Otherwise the request is
    /// queued until the next batch. Resolves exactly once: a report, a
    /// `validation:validator_failed` error, or a `core:cancelled` error when
    /// the queue is cleared first.
    pub async fn validate(&self, params: ValidationParams) -> Result<ValidationReport> {
        let fingerprint = ConfigFingerprint::of(&params);
        let receiver = {
            let mut state = self.inner.lock_state();
            let ready = state.loading.is_ready();
            if ready && let Some(report) = state.cache.lookup(&fingerprint, Instant::now()) {
                tracing::debug!(fingerprint = %fingerprint, "validation served from cache");
                return Ok(report);
            }

            let (request, receiver) = PendingRequest::new(params, fingerprint);
            tracing::debug!(
                request_id = %request.id,
                fingerprint = %request.fingerprint,
                ready,
                "validation request queued"
            );
            state.queue.push_back(request);
            if ready {
                self.inner.schedule(&mut state);
            }
            receiver
        };

        receiver.await.map_err(|_| coordinator_closed())?
    }

    /// Drop the cached report.
    pub fn invalidate_cache(&self) {
        let had_entry = self.inner.lock_state().cache.clear();
        if let Some(logger) = self.inner.deps.logger.as_ref() {
            logger.debug(
                "validation.cache.invalidated",
                "Validation cache invalidated",
                Some(log_fields([("hadEntry", Value::Bool(had_entry))])),
            );
        }
    }

    /// Reject every pending request with a cancellation error and disarm the
    /// batch timer. Safe to call repeatedly.
    pub fn clear_queue(&self) {
        let (drained, timer) = {
            let mut state = self.inner.lock_state();
            (std::mem::take(&mut state.queue), state.timer.take())
        };
        if let Some(timer) = timer {
            timer.handle.abort();
        }
        if drained.is_empty() {
            return;
        }

        let cancelled = drained.len();
        for request in drained {
            let error = ErrorEnvelope::cancelled("validation queue cleared")
                .with_metadata("request_id", request.id.as_str());
            request.complete(Err(error));
        }
        if let Some(logger) = self.inner.deps.logger.as_ref() {
            logger.info(
                "validation.queue.cleared",
                "Pending validation requests cancelled",
                Some(log_fields([("cancelled", Value::from(cancelled))])),
            );
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> CoordinatorPhase {
        let state = self.inner.lock_state();
        if state.timer.is_some() || state.draining {
            CoordinatorPhase::Processing
        } else if state.loading.is_ready() {
            CoordinatorPhase::Ready
        } else {
            CoordinatorPhase::Blocked
        }
    }

    /// Number of requests waiting for a batch.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.lock_state().queue.len()
    }

    /// Tracked sources that still block validation.
    #[must_use]
    pub fn blocking_sources(&self) -> Vec<LoadingSource> {
        self.inner.lock_state().loading.blocking_sources()
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Arm the batch timer unless one is already armed or a batch is
    /// draining. A draining batch re-arms on exit if requests queued up.
    fn schedule(self: &Arc<Self>, state: &mut State) {
        if state.timer.is_some() || state.draining {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no tokio runtime; validation batch not scheduled");
            return;
        };

        let epoch = state.next_epoch;
        state.next_epoch = state.next_epoch.wrapping_add(1);
        let delay = self.coalesce_delay;
        let weak: Weak<Self> = Arc::downgrade(self);
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.run_batch(epoch);
            }
        });
        tracing::debug!(epoch, delay_ms = duration_ms(delay), "validation batch armed");
        state.timer = Some(ArmedTimer { epoch, handle });
    }

    fn run_batch(self: &Arc<Self>, epoch: u64) {
        let batch = {
            let mut state = self.lock_state();
            if state.timer.as_ref().is_none_or(|timer| timer.epoch != epoch) {
                // Disarmed by `clear_queue` after the sleep completed.
                return;
            }
            state.timer = None;
            if !state.loading.is_ready() {
                tracing::debug!(
                    pending = state.queue.len(),
                    "loading resumed before batch fired; batch deferred"
                );
                return;
            }
            if state.queue.is_empty() {
                return;
            }
            state.draining = true;
            std::mem::take(&mut state.queue)
        };

        let started_at = Instant::now();
        let size = batch.len();
        if let Some(logger) = self.deps.logger.as_ref() {
            logger.info(
                "validation.batch.start",
                "Validation batch started",
                Some(log_fields([("requests", Value::from(size))])),
            );
        }

        let mut failed = 0_usize;
        for request in batch {
            let outcome = self.resolve(&request);
            if let Err(error) = &outcome {
                failed += 1;
                self.log_request_failed(&request, error);
            }
            let request_id = request.id.clone();
            if !request.complete(outcome) {
                tracing::debug!(request_id = %request_id, "validation caller went away");
            }
        }

        {
            let mut state = self.lock_state();
            state.draining = false;
            if state.loading.is_ready() && !state.queue.is_empty() {
                self.schedule(&mut state);
            }
        }

        if let Some(logger) = self.deps.logger.as_ref() {
            logger.info(
                "validation.batch.completed",
                "Validation batch completed",
                Some(log_fields([
                    ("requests", Value::from(size)),
                    ("failed", Value::from(failed)),
                    ("durationMs", Value::from(duration_ms(started_at.elapsed()))),
                ])),
            );
        }
    }

    fn resolve(&self, request: &PendingRequest) -> Result<ValidationReport> {
        let fingerprint = &request.fingerprint;
        if let Some(report) = self.lock_state().cache.lookup(fingerprint, Instant::now()) {
            tracing::debug!(request_id = %request.id, "batch request served from cache");
            return Ok(report);
        }

        if !request.params.has_providers() {
            let report = ValidationReport::data_unavailable();
            self.store(fingerprint, &report);
            return Ok(report);
        }

        let validator = Arc::clone(&self.deps.validator);
        let outcome = catch_unwind(AssertUnwindSafe(|| validator.validate(&request.params)));
        match outcome {
            Ok(Ok(report)) => {
                self.store(fingerprint, &report);
                Ok(report)
            },
            Ok(Err(error)) => Err(validator_failed(&error.message)
                .with_metadata("cause_code", error.code.to_string())),
            Err(payload) => Err(validator_failed(&panic_message(payload.as_ref()))),
        }
        .map_err(|error| error.with_metadata("request_id", request.id.as_str()))
    }

    fn store(&self, fingerprint: &ConfigFingerprint, report: &ValidationReport) {
        self.lock_state()
            .cache
            .store(fingerprint.clone(), report.clone(), Instant::now());
    }

    fn log_request_failed(&self, request: &PendingRequest, error: &ErrorEnvelope) {
        let Some(logger) = self.deps.logger.as_ref() else {
            return;
        };
        logger.warn(
            "validation.request.failed",
            "Validation request failed",
            Some(log_fields([
                ("requestId", Value::String(request.id.as_str().to_owned())),
                ("fingerprint", Value::String(request.fingerprint.digest())),
                (
                    "queuedMs",
                    Value::from(duration_ms(request.enqueued_at.elapsed())),
                ),
                ("errorCode", Value::String(error.code.to_string())),
            ])),
        );
    }
}

fn validator_failed(message: &str) -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("validation", "validator_failed"),
        format!("settings validator failed: {message}"),
        ErrorClass::NonRetriable,
    )
}

fn coordinator_closed() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("validation", "coordinator_closed"),
        "validation coordinator dropped the request",
        ErrorClass::Retriable,
    )
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "validator panicked".to_owned())
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
