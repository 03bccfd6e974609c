//! HTTP transport for probes
//!
//! Production code uses `ReqwestTransport`. Tests use `MockTransport`, which
//! replays scripted responses per URL.

use super::spec::ProbeSpec;
use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Method;
use std::time::Duration;
use thiserror::Error;

/// Timeout for a single probe request (connect + response headers)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Io(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Connection-level failures that may clear up by retrying
    pub fn is_network(&self) -> bool {
        !matches!(self, TransportError::InvalidRequest(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            TransportError::InvalidRequest(e.to_string())
        } else if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Io(e.to_string())
        }
    }
}

/// Trait for issuing one probe request
///
/// Must be safe for concurrent use: every probe task in a batch shares one
/// transport.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request described by `spec` and return the response status
    async fn send(&self, spec: &ProbeSpec) -> Result<u16, TransportError>;
}

/// Production transport backed by reqwest
///
/// Holds two connection pools so a probe that skips certificate checks never
/// shares a connection with one that verifies them. Redirects are not
/// followed: a probe sees the status of the URL it asked for.
#[derive(Clone)]
pub struct ReqwestTransport {
    verifying: reqwest::Client,
    insecure: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self, TransportError> {
        let verifying = reqwest::Client::builder()
            .timeout(request_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let insecure = reqwest::Client::builder()
            .timeout(request_timeout)
            .redirect(Policy::none())
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(Self {
            verifying,
            insecure,
        })
    }

    fn client_for(&self, spec: &ProbeSpec) -> &reqwest::Client {
        if spec.skip_tls_verify {
            &self.insecure
        } else {
            &self.verifying
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, spec: &ProbeSpec) -> Result<u16, TransportError> {
        let method = Method::from_bytes(spec.method.as_bytes()).map_err(|e| {
            TransportError::InvalidRequest(format!("method {:?}: {}", spec.method, e))
        })?;
        let url = reqwest::Url::parse(&spec.url)
            .map_err(|e| TransportError::InvalidRequest(format!("url {:?}: {}", spec.url, e)))?;

        let response = self.client_for(spec).request(method, url).send().await?;

        Ok(response.status().as_u16())
    }
}

/// Mock transport for testing - replays a script of results per URL
///
/// Each URL has a queue of results; the last result repeats once the queue
/// is down to one entry. Unknown URLs fail with a connection error.
#[cfg(test)]
pub struct MockTransport {
    scripts: std::sync::Mutex<std::collections::HashMap<String, Vec<MockReply>>>,
    requests: std::sync::Mutex<Vec<(String, tokio::time::Instant)>>,
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockReply {
    Status(u16),
    Fail(TransportError),
    /// Respond with `status` after holding the request open
    Delayed(u16, Duration),
}

#[cfg(test)]
impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            scripts: std::sync::Mutex::new(std::collections::HashMap::new()),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn script(self, url: &str, replies: Vec<MockReply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), replies);
        self
    }

    pub fn always(self, url: &str, status: u16) -> Self {
        self.script(url, vec![MockReply::Status(status)])
    }

    /// Number of requests sent to `url`
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == url)
            .count()
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, spec: &ProbeSpec) -> Result<u16, TransportError> {
        #[allow(clippy::unwrap_used)]
        self.requests
            .lock()
            .unwrap()
            .push((spec.url.clone(), tokio::time::Instant::now()));

        let reply = {
            #[allow(clippy::unwrap_used)]
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(&spec.url) {
                Some(queue) if queue.len() > 1 => queue.remove(0),
                Some(queue) => queue
                    .first()
                    .cloned()
                    .unwrap_or(MockReply::Fail(TransportError::Connect("empty".into()))),
                None => MockReply::Fail(TransportError::Connect(format!(
                    "no route to {}",
                    spec.url
                ))),
            }
        };

        match reply {
            MockReply::Status(status) => Ok(status),
            MockReply::Fail(e) => Err(e),
            MockReply::Delayed(status, delay) => {
                tokio::time::sleep(delay).await;
                Ok(status)
            }
        }
    }
}
