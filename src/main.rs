use kube::Client;
use routable::cancel::{cancel_channel, wait_for_signal};
use routable::clock::SystemClock;
use routable::cluster::{router_exposure, ClusterError, RouteHostQuery, RouterExposure};
use routable::config::RoutableConfig;
use routable::probe::{ProbeRunner, ReqwestTransport};
use routable::scenario::{Scenario, ScenarioOutcome};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Log the outcome and print the JSON report to stdout
fn report(outcome: &ScenarioOutcome) -> anyhow::Result<()> {
    match outcome {
        ScenarioOutcome::Skipped { reason } => info!(reason = %reason, "Scenario skipped"),
        ScenarioOutcome::NotReady { target, error } => {
            error!(target = %target, error = %error, "Route never became ready")
        }
        ScenarioOutcome::Probed(report) if report.result.overall_succeeded => {
            info!(summary = %report.summary(), "Routes are reachable")
        }
        ScenarioOutcome::Probed(report) => {
            error!("Routes are not reachable: {}", report.summary())
        }
        ScenarioOutcome::Aborted { report: None } => warn!("Scenario aborted before probing"),
        ScenarioOutcome::Aborted {
            report: Some(report),
        } => warn!("Scenario aborted while probing: {}", report.summary()),
    }

    println!("{}", serde_json::to_string_pretty(&outcome.to_json())?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = RoutableConfig::from_env()?;
    info!(
        targets = config.targets.len(),
        route_host_wait = ?config.route_host_wait,
        endpoint_wait = ?config.endpoint_wait,
        "Starting route reachability check"
    );

    let client = Client::try_default().await.map_err(ClusterError::Client)?;
    info!("Connected to Kubernetes cluster");

    let exposure = router_exposure(
        client.clone(),
        &config.router_namespace,
        &config.router_service,
    )
    .await?;

    let outcome = match exposure {
        RouterExposure::Skip(reason) => ScenarioOutcome::Skipped { reason },
        RouterExposure::LoadBalancer => {
            let transport = ReqwestTransport::new(config.request_timeout)?;
            let runner = ProbeRunner::new(Arc::new(transport)).with_backoff(config.retry_backoff);
            let scenario = Scenario::new(
                config.targets.clone(),
                config.route_poll(),
                config.endpoint_wait,
                runner,
                Arc::new(SystemClock),
            );

            // Abort in-flight probes on SIGTERM/SIGINT, but still report
            let (cancel_controller, cancel_signal) = cancel_channel();
            let signal_handle = tokio::spawn(async move {
                match wait_for_signal().await {
                    Ok(signal) => {
                        info!(signal = signal, "Aborting route reachability check");
                        cancel_controller.cancel();
                    }
                    Err(e) => {
                        warn!(error = %e, "Signal handlers unavailable, run cannot be aborted");
                        // A dropped controller reads as a cancel
                        let _controller = cancel_controller;
                        std::future::pending::<()>().await;
                    }
                }
            });

            let outcome = scenario
                .run(
                    |target| RouteHostQuery::new(client.clone(), &target.namespace, &target.name),
                    cancel_signal,
                )
                .await;

            signal_handle.abort();
            outcome
        }
    };

    report(&outcome)?;
    std::process::exit(outcome.exit_code());
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
