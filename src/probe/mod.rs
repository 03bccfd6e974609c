//! Endpoint probes
//!
//! - `spec`: probe descriptions and results
//! - `transport`: the HTTP seam (`HttpTransport`) and its reqwest implementation
//! - `runner`: concurrent, deadline-scoped batch execution

pub mod runner;
pub mod spec;
pub mod transport;

pub use runner::ProbeRunner;
pub use spec::{BatchResult, ProbeError, ProbeOutcome, ProbeSpec, DEFAULT_RETRY_BACKOFF};
pub use transport::{HttpTransport, ReqwestTransport, TransportError, DEFAULT_REQUEST_TIMEOUT};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "transport_test.rs"]
mod transport_tests;
