//! Readiness polling for control-plane objects
//!
//! Repeatedly invokes a [`StatusQuery`] until it reports an address or the
//! poll timeout elapses. Only "not ready" answers are retried; a fetch error
//! ends the wait immediately.
//!
//! The poller is silent: callers decide what to log.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep_until, Instant};

/// Boxed error returned by a status query that cannot be resolved by waiting
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of fetching an object's status once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness<A> {
    /// The object exists but has no usable address yet
    NotReady { detail: String },
    /// The object exposes an address
    Ready(A),
}

impl<A> Readiness<A> {
    pub fn not_ready(detail: impl Into<String>) -> Self {
        Readiness::NotReady {
            detail: detail.into(),
        }
    }
}

/// Trait for reading the current state of one external object
///
/// Production code uses `RouteHostQuery` which reads a Route from the cluster.
/// Tests use scripted queries that return canned answers.
#[async_trait]
pub trait StatusQuery: Send + Sync {
    /// The resolved address type (usually a host name)
    type Address: Send;

    /// Fetch the object once
    async fn fetch(&self) -> Result<Readiness<Self::Address>, FetchError>;
}

/// How often and for how long to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSpec {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    #[error("not ready after {attempts} attempt(s) in {elapsed:?}{}", detail_suffix(.last_detail))]
    Timeout {
        attempts: u32,
        elapsed: Duration,
        last_detail: Option<String>,
    },

    #[error("status query failed on attempt {attempts}: {source}")]
    Fetch {
        attempts: u32,
        #[source]
        source: FetchError,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

impl PollError {
    /// Number of query invocations made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            PollError::Timeout { attempts, .. } | PollError::Fetch { attempts, .. } => *attempts,
        }
    }
}

/// Poll `query` until it reports ready, fails, or `spec.timeout` elapses
///
/// The first query runs immediately. Between attempts the poller sleeps for
/// `spec.interval`, clamped so it never sleeps past the timeout; one final
/// query runs at the timeout boundary before giving up. Elapsed time is
/// measured against the clock, so a slow query shortens the remaining budget.
///
/// # Returns
/// * `Ok(address)` - the query reported ready
/// * `Err(PollError::Fetch)` - the query failed; no further attempts were made
/// * `Err(PollError::Timeout)` - still not ready when the timeout elapsed
pub async fn wait_until_ready<Q>(query: &Q, spec: PollSpec) -> Result<Q::Address, PollError>
where
    Q: StatusQuery + ?Sized,
{
    let started = Instant::now();
    let deadline = started + spec.timeout;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let last_detail = match query.fetch().await {
            Ok(Readiness::Ready(address)) => return Ok(address),
            Ok(Readiness::NotReady { detail }) => detail,
            Err(source) => return Err(PollError::Fetch { attempts, source }),
        };

        let now = Instant::now();
        if now >= deadline {
            return Err(PollError::Timeout {
                attempts,
                elapsed: now.duration_since(started),
                last_detail: Some(last_detail),
            });
        }

        sleep_until(std::cmp::min(now + spec.interval, deadline)).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Tests can use unwrap/expect for brevity
#[path = "readiness_test.rs"]
mod tests;
