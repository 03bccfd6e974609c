use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Backoff between attempts of a single probe
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// One HTTP check: `method url` must answer `expected_status`
///
/// Built with [`ProbeSpec::expect`] and the chained setters:
/// ```ignore
/// let spec = ProbeSpec::expect("GET", "https://console.example")
///     .skip_tls_verification()
///     .has_status_code(200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSpec {
    pub method: String,
    pub url: String,
    pub skip_tls_verify: bool,
    pub expected_status: u16,
    pub treat_network_errors_as_retryable: bool,
}

impl ProbeSpec {
    /// A probe expecting 200 OK, with certificate checks on and network
    /// errors retried
    pub fn expect(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            skip_tls_verify: false,
            expected_status: 200,
            treat_network_errors_as_retryable: true,
        }
    }

    pub fn skip_tls_verification(mut self) -> Self {
        self.skip_tls_verify = true;
        self
    }

    pub fn has_status_code(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// Control whether connection-level failures are retried or fail the probe
    pub fn with_error_passthrough(mut self, retryable: bool) -> Self {
        self.treat_network_errors_as_retryable = retryable;
        self
    }
}

impl fmt::Display for ProbeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} (expect {})",
            self.method, self.url, self.expected_status
        )
    }
}

/// Why a probe attempt (and possibly the probe) failed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProbeError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("expected status {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("deadline elapsed before any response arrived")]
    DeadlineExceeded,

    #[error("probe task aborted: {message}")]
    Aborted { message: String },
}

/// Final state of one probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeOutcome {
    pub spec: ProbeSpec,
    pub succeeded: bool,
    /// Status code of the most recent response, if any response arrived
    pub last_observed_status: Option<u16>,
    /// Error from the most recent failed attempt
    pub last_error: Option<ProbeError>,
    /// Requests issued, including one abandoned in flight at the deadline
    pub attempts: u32,
    pub elapsed: Duration,
}

impl ProbeOutcome {
    pub(crate) fn pending(spec: ProbeSpec) -> Self {
        Self {
            spec,
            succeeded: false,
            last_observed_status: None,
            last_error: None,
            attempts: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Outcomes of one batch, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub outcomes: Vec<ProbeOutcome>,
    pub overall_succeeded: bool,
}

impl BatchResult {
    pub fn new(outcomes: Vec<ProbeOutcome>) -> Self {
        let overall_succeeded = outcomes.iter().all(|o| o.succeeded);
        Self {
            outcomes,
            overall_succeeded,
        }
    }

    /// Outcomes that did not meet their expected response
    pub fn failures(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }
}
