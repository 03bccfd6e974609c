use super::*;
use routable::scenario::RouteTarget;

#[test]
fn test_report_accepts_every_outcome() {
    let target = RouteTarget::new("openshift-console", "console", "https", "", 200);
    let not_ready = ScenarioOutcome::NotReady {
        target,
        error: routable::readiness::PollError::Timeout {
            attempts: 31,
            elapsed: std::time::Duration::from_secs(30),
            last_detail: None,
        },
    };

    assert!(report(&not_ready).is_ok());
    assert!(report(&ScenarioOutcome::Aborted { report: None }).is_ok());
    assert!(report(&ScenarioOutcome::Skipped {
        reason: "default router is not exposed by a load balancer service".to_string(),
    })
    .is_ok());
}
