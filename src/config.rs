//! Environment configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `ROUTABLE_ROUTE_HOST_WAIT_SECS` | 30 |
//! | `ROUTABLE_POLL_INTERVAL_SECS` | 1 |
//! | `ROUTABLE_ENDPOINT_WAIT_SECS` | 180 |
//! | `ROUTABLE_RETRY_BACKOFF_MS` | 1000 |
//! | `ROUTABLE_REQUEST_TIMEOUT_SECS` | 10 |
//! | `ROUTABLE_ROUTER_NAMESPACE` | `openshift-ingress` |
//! | `ROUTABLE_ROUTER_SERVICE` | `router-default` |
//! | `ROUTABLE_TARGETS` | console and prometheus-k8s routes (JSON array) |

use crate::cluster::{DEFAULT_ROUTER_NAMESPACE, DEFAULT_ROUTER_SERVICE};
use crate::probe::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_BACKOFF};
use crate::readiness::PollSpec;
use crate::scenario::{default_targets, RouteTarget};
use std::time::Duration;
use thiserror::Error;

/// How long to wait for routes to be assigned a host
pub const DEFAULT_ROUTE_HOST_WAIT: Duration = Duration::from_secs(30);

/// Interval between Route status reads
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long to wait for endpoints to be reachable
pub const DEFAULT_ENDPOINT_WAIT: Duration = Duration::from_secs(180);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} is not a valid target list: {reason}")]
    InvalidTargets { name: &'static str, reason: String },

    #[error("poll interval {interval:?} is longer than the route host wait {timeout:?}")]
    IntervalExceedsTimeout {
        interval: Duration,
        timeout: Duration,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutableConfig {
    pub route_host_wait: Duration,
    pub poll_interval: Duration,
    pub endpoint_wait: Duration,
    pub retry_backoff: Duration,
    pub request_timeout: Duration,
    pub router_namespace: String,
    pub router_service: String,
    pub targets: Vec<RouteTarget>,
}

impl Default for RoutableConfig {
    fn default() -> Self {
        Self {
            route_host_wait: DEFAULT_ROUTE_HOST_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            endpoint_wait: DEFAULT_ENDPOINT_WAIT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            router_namespace: DEFAULT_ROUTER_NAMESPACE.to_string(),
            router_service: DEFAULT_ROUTER_SERVICE.to_string(),
            targets: default_targets(),
        }
    }
}

impl RoutableConfig {
    /// Load configuration from `ROUTABLE_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            route_host_wait: duration_var(
                &lookup,
                "ROUTABLE_ROUTE_HOST_WAIT_SECS",
                Duration::from_secs,
                defaults.route_host_wait,
            )?,
            poll_interval: duration_var(
                &lookup,
                "ROUTABLE_POLL_INTERVAL_SECS",
                Duration::from_secs,
                defaults.poll_interval,
            )?,
            endpoint_wait: duration_var(
                &lookup,
                "ROUTABLE_ENDPOINT_WAIT_SECS",
                Duration::from_secs,
                defaults.endpoint_wait,
            )?,
            retry_backoff: duration_var(
                &lookup,
                "ROUTABLE_RETRY_BACKOFF_MS",
                Duration::from_millis,
                defaults.retry_backoff,
            )?,
            request_timeout: duration_var(
                &lookup,
                "ROUTABLE_REQUEST_TIMEOUT_SECS",
                Duration::from_secs,
                defaults.request_timeout,
            )?,
            router_namespace: lookup("ROUTABLE_ROUTER_NAMESPACE")
                .unwrap_or(defaults.router_namespace),
            router_service: lookup("ROUTABLE_ROUTER_SERVICE").unwrap_or(defaults.router_service),
            targets: match lookup("ROUTABLE_TARGETS") {
                Some(raw) => parse_targets(&raw)?,
                None => defaults.targets,
            },
        };

        if config.poll_interval > config.route_host_wait {
            return Err(ConfigError::IntervalExceedsTimeout {
                interval: config.poll_interval,
                timeout: config.route_host_wait,
            });
        }

        Ok(config)
    }

    /// Poll settings for Route host resolution
    pub fn route_poll(&self) -> PollSpec {
        PollSpec::new(self.poll_interval, self.route_host_wait)
    }
}

fn duration_var<F>(
    lookup: &F,
    name: &'static str,
    unit: fn(u64) -> Duration,
    default: Duration,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };

    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(unit(value)),
        _ => Err(ConfigError::InvalidNumber { name, value: raw }),
    }
}

fn parse_targets(raw: &str) -> Result<Vec<RouteTarget>, ConfigError> {
    let targets: Vec<RouteTarget> =
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidTargets {
            name: "ROUTABLE_TARGETS",
            reason: e.to_string(),
        })?;

    if targets.is_empty() {
        return Err(ConfigError::InvalidTargets {
            name: "ROUTABLE_TARGETS",
            reason: "at least one target is required".to_string(),
        });
    }

    Ok(targets)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "config_test.rs"]
mod tests;
