//! Route reachability scenario
//!
//! For each [`RouteTarget`]: wait for the Route to be assigned an ingress host,
//! build a probe against it, then run every probe as one batch under the
//! endpoint wait.

use crate::cancel::CancelSignal;
use crate::clock::Clock;
use crate::probe::{BatchResult, ProbeRunner, ProbeSpec};
use crate::readiness::{wait_until_ready, PollError, PollSpec, StatusQuery};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// A Route whose host should serve `expected_status` at `path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTarget {
    pub namespace: String,
    pub name: String,
    pub scheme: String,
    #[serde(default)]
    pub path: String,
    pub expected_status: u16,
}

impl RouteTarget {
    pub fn new(namespace: &str, name: &str, scheme: &str, path: &str, expected_status: u16) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            scheme: scheme.to_string(),
            path: path.to_string(),
            expected_status,
        }
    }

    /// GET against the resolved host; certificates are not verified and
    /// network errors are retried
    pub fn probe(&self, host: &str) -> ProbeSpec {
        ProbeSpec::expect("GET", build_url(&self.scheme, host, &self.path))
            .skip_tls_verification()
            .has_status_code(self.expected_status)
            .with_error_passthrough(true)
    }
}

impl std::fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Cluster services that must be reachable from outside the cluster
pub fn default_targets() -> Vec<RouteTarget> {
    vec![
        RouteTarget::new("openshift-console", "console", "https", "", 200),
        RouteTarget::new(
            "openshift-monitoring",
            "prometheus-k8s",
            "https",
            "api/v1/targets",
            403,
        ),
    ]
}

/// `scheme://host` for an empty path, `scheme://host/path` otherwise
pub fn build_url(scheme: &str, host: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        format!("{}://{}", scheme, host)
    } else {
        format!("{}://{}/{}", scheme, host, path)
    }
}

/// Probe results of a completed scenario
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub endpoint_wait: Duration,
    pub result: BatchResult,
}

impl ScenarioReport {
    /// One line, plus one line per failed probe
    pub fn summary(&self) -> String {
        let total = self.result.outcomes.len();
        if self.result.overall_succeeded {
            return format!("all {} probes met their expected response", total);
        }

        let failures: Vec<String> = self
            .result
            .failures()
            .map(|o| {
                let status = o
                    .last_observed_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string());
                let error = o
                    .last_error
                    .as_ref()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "none".to_string());
                format!(
                    "  {}: last status {}, last error {}, {} attempt(s)",
                    o.spec, status, error, o.attempts
                )
            })
            .collect();

        format!(
            "{} of {} probes did not meet their expected response within {:?}\n{}",
            failures.len(),
            total,
            self.endpoint_wait,
            failures.join("\n")
        )
    }
}

#[derive(Debug)]
pub enum ScenarioOutcome {
    /// Preconditions not met; nothing was probed
    Skipped { reason: String },
    /// A Route never got a host, or could not be read
    NotReady {
        target: RouteTarget,
        error: PollError,
    },
    /// Every Route resolved and the batch ran
    Probed(ScenarioReport),
    /// Cancelled externally; carries the partial report when probes had started
    Aborted { report: Option<ScenarioReport> },
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        match self {
            ScenarioOutcome::Skipped { .. } => true,
            ScenarioOutcome::Probed(report) => report.result.overall_succeeded,
            ScenarioOutcome::NotReady { .. } | ScenarioOutcome::Aborted { .. } => false,
        }
    }

    /// 0 pass/skip, 1 probe failure, 2 route never ready, 130 aborted
    pub fn exit_code(&self) -> i32 {
        match self {
            ScenarioOutcome::Skipped { .. } => 0,
            ScenarioOutcome::Probed(report) if report.result.overall_succeeded => 0,
            ScenarioOutcome::Probed(_) => 1,
            ScenarioOutcome::NotReady { .. } => 2,
            ScenarioOutcome::Aborted { .. } => 130,
        }
    }

    /// Machine-readable report for CI
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ScenarioOutcome::Skipped { reason } => json!({
                "verdict": "skipped",
                "reason": reason,
            }),
            ScenarioOutcome::NotReady { target, error } => json!({
                "verdict": "notReady",
                "target": target,
                "attempts": error.attempts(),
                "error": error.to_string(),
            }),
            ScenarioOutcome::Probed(report) => {
                let verdict = if report.result.overall_succeeded {
                    "passed"
                } else {
                    "failed"
                };
                json!({
                    "verdict": verdict,
                    "report": report,
                })
            }
            ScenarioOutcome::Aborted { report } => json!({
                "verdict": "aborted",
                "report": report,
            }),
        }
    }
}

/// Resolves targets, then probes them as one batch
pub struct Scenario {
    targets: Vec<RouteTarget>,
    poll: PollSpec,
    endpoint_wait: Duration,
    runner: ProbeRunner,
    clock: Arc<dyn Clock>,
}

impl Scenario {
    pub fn new(
        targets: Vec<RouteTarget>,
        poll: PollSpec,
        endpoint_wait: Duration,
        runner: ProbeRunner,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            targets,
            poll,
            endpoint_wait,
            runner,
            clock,
        }
    }

    /// Run the scenario
    ///
    /// `resolve` builds the status query for each target. Targets are resolved
    /// one at a time; the first poll error ends the scenario as `NotReady`.
    /// `cancel` aborts host resolution and, narrowed to the endpoint wait,
    /// bounds the probe batch. A batch that fails because `cancel` fired
    /// (rather than the endpoint wait running out) is reported as `Aborted`.
    pub async fn run<Q, F>(&self, resolve: F, mut cancel: CancelSignal) -> ScenarioOutcome
    where
        Q: StatusQuery<Address = String>,
        F: Fn(&RouteTarget) -> Q,
    {
        let started_at = self.clock.now();
        let mut batch = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            info!(target = %target, "Verifying the route has an ingress host");
            let query = resolve(target);

            let resolved = tokio::select! {
                _ = cancel.cancelled() => return ScenarioOutcome::Aborted { report: None },
                resolved = wait_until_ready(&query, self.poll) => resolved,
            };

            match resolved {
                Ok(host) => {
                    let probe = target.probe(&host);
                    info!(
                        target = %target,
                        url = %probe.url,
                        expected_status = probe.expected_status,
                        "Verifying the route serves the expected status"
                    );
                    batch.push(probe);
                }
                Err(error) => {
                    warn!(target = %target, error = %error, "Route did not become ready");
                    return ScenarioOutcome::NotReady {
                        target: target.clone(),
                        error,
                    };
                }
            }
        }

        let abort = cancel.clone();
        let result = self
            .runner
            .run_until(batch, cancel.with_deadline(Instant::now() + self.endpoint_wait))
            .await;

        let report = ScenarioReport {
            started_at,
            finished_at: self.clock.now(),
            endpoint_wait: self.endpoint_wait,
            result,
        };

        if !report.result.overall_succeeded && abort.is_triggered() {
            warn!("Probe batch cut short by cancellation");
            return ScenarioOutcome::Aborted {
                report: Some(report),
            };
        }
        ScenarioOutcome::Probed(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "scenario_test.rs"]
mod tests;
