//! Deadline-scoped batch probe runner
//!
//! Every probe runs as its own task and retries until it sees its expected
//! status or the shared [`CancelSignal`] fires. Outcomes come back in input
//! order regardless of which task finishes first.

use super::spec::{BatchResult, ProbeError, ProbeOutcome, ProbeSpec, DEFAULT_RETRY_BACKOFF};
use super::transport::HttpTransport;
use crate::cancel::CancelSignal;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Runs probe batches against a shared transport
#[derive(Clone)]
pub struct ProbeRunner {
    transport: Arc<dyn HttpTransport>,
    backoff: Duration,
}

impl ProbeRunner {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Fixed wait between attempts of the same probe
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Run every probe in `batch` within one shared `deadline`
    ///
    /// The deadline starts now. The call returns once every probe has either
    /// succeeded or been cut off by the deadline.
    pub async fn run(&self, batch: Vec<ProbeSpec>, deadline: Duration) -> BatchResult {
        self.run_until(batch, CancelSignal::at(Instant::now() + deadline))
            .await
    }

    /// Run every probe in `batch` until `cancel` fires
    ///
    /// `cancel` usually carries the batch deadline and, in the binary, an
    /// external abort trigger. Probes that have not succeeded when it fires
    /// are reported as failed with their last observed status and error.
    pub async fn run_until(&self, batch: Vec<ProbeSpec>, cancel: CancelSignal) -> BatchResult {
        if batch.is_empty() {
            warn!("Empty probe batch - nothing to verify");
            return BatchResult::new(Vec::new());
        }

        info!(
            probes = batch.len(),
            backoff_ms = self.backoff.as_millis() as u64,
            "Running probe batch"
        );

        let handles: Vec<_> = batch
            .iter()
            .cloned()
            .map(|spec| {
                let transport = Arc::clone(&self.transport);
                let cancel = cancel.clone();
                let backoff = self.backoff;
                tokio::spawn(probe_until(spec, transport, backoff, cancel))
            })
            .collect();

        let outcomes = join_all(handles)
            .await
            .into_iter()
            .zip(batch)
            .map(|(joined, spec)| match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(url = %spec.url, error = %e, "Probe task did not complete");
                    ProbeOutcome {
                        last_error: Some(ProbeError::Aborted {
                            message: e.to_string(),
                        }),
                        ..ProbeOutcome::pending(spec)
                    }
                }
            })
            .collect();

        let result = BatchResult::new(outcomes);
        info!(
            probes = result.outcomes.len(),
            failed = result.failures().count(),
            overall_succeeded = result.overall_succeeded,
            "Probe batch finished"
        );
        result
    }
}

/// Retry one probe until it matches or `cancel` fires
///
/// Pending → (InFlight ⇄ WaitingBeforeRetry) → Succeeded | Failed. A response
/// with the expected status is the only way to succeed; the probe fails on
/// cancellation or on a non-retryable error.
async fn probe_until(
    spec: ProbeSpec,
    transport: Arc<dyn HttpTransport>,
    backoff: Duration,
    mut cancel: CancelSignal,
) -> ProbeOutcome {
    let started = Instant::now();
    let mut outcome = ProbeOutcome::pending(spec);

    loop {
        if cancel.is_cancelled() {
            break;
        }

        outcome.attempts += 1;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = transport.send(&outcome.spec) => result,
        };

        match result {
            Ok(status) if status == outcome.spec.expected_status => {
                outcome.succeeded = true;
                outcome.last_observed_status = Some(status);
                outcome.last_error = None;
                outcome.elapsed = started.elapsed();
                debug!(
                    url = %outcome.spec.url,
                    status,
                    attempts = outcome.attempts,
                    "Probe matched expected status"
                );
                return outcome;
            }
            Ok(status) => {
                debug!(
                    url = %outcome.spec.url,
                    status,
                    expected = outcome.spec.expected_status,
                    "Unexpected status, will retry"
                );
                outcome.last_observed_status = Some(status);
                outcome.last_error = Some(ProbeError::StatusMismatch {
                    expected: outcome.spec.expected_status,
                    actual: status,
                });
            }
            Err(e) if e.is_network() && outcome.spec.treat_network_errors_as_retryable => {
                debug!(url = %outcome.spec.url, error = %e, "Network error, will retry");
                outcome.last_error = Some(ProbeError::Network {
                    message: e.to_string(),
                });
            }
            Err(e) => {
                warn!(url = %outcome.spec.url, error = %e, "Probe failed without retry");
                outcome.last_error = Some(if e.is_network() {
                    ProbeError::Network {
                        message: e.to_string(),
                    }
                } else {
                    ProbeError::InvalidRequest {
                        message: e.to_string(),
                    }
                });
                outcome.elapsed = started.elapsed();
                return outcome;
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(backoff) => {}
        }
    }

    if outcome.last_error.is_none() {
        outcome.last_error = Some(ProbeError::DeadlineExceeded);
    }
    outcome.elapsed = started.elapsed();
    warn!(
        url = %outcome.spec.url,
        attempts = outcome.attempts,
        last_status = ?outcome.last_observed_status,
        last_error = ?outcome.last_error,
        "Probe did not meet its expected response before the deadline"
    );
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Tests can use unwrap/expect for brevity
#[path = "runner_test.rs"]
mod tests;
