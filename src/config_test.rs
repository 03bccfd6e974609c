//! Tests for environment configuration
//!
//! Uses `from_lookup` with in-memory maps; mutating the real environment
//! races with parallel tests.

use super::*;
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_defaults_when_nothing_set() {
    let config = RoutableConfig::from_lookup(lookup(&[])).unwrap();

    assert_eq!(config, RoutableConfig::default());
    assert_eq!(config.route_host_wait, Duration::from_secs(30));
    assert_eq!(config.endpoint_wait, Duration::from_secs(180));
    assert_eq!(config.retry_backoff, Duration::from_secs(1));
    assert_eq!(config.router_namespace, "openshift-ingress");
    assert_eq!(config.router_service, "router-default");
    assert_eq!(config.targets.len(), 2);
}

#[test]
fn test_overrides_are_applied() {
    let config = RoutableConfig::from_lookup(lookup(&[
        ("ROUTABLE_ROUTE_HOST_WAIT_SECS", "60"),
        ("ROUTABLE_POLL_INTERVAL_SECS", "2"),
        ("ROUTABLE_ENDPOINT_WAIT_SECS", "300"),
        ("ROUTABLE_RETRY_BACKOFF_MS", "250"),
        ("ROUTABLE_REQUEST_TIMEOUT_SECS", "5"),
        ("ROUTABLE_ROUTER_NAMESPACE", "custom-ingress"),
        ("ROUTABLE_ROUTER_SERVICE", "router-internal"),
    ]))
    .unwrap();

    assert_eq!(
        config.route_poll(),
        PollSpec::new(Duration::from_secs(2), Duration::from_secs(60))
    );
    assert_eq!(config.endpoint_wait, Duration::from_secs(300));
    assert_eq!(config.retry_backoff, Duration::from_millis(250));
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    assert_eq!(config.router_namespace, "custom-ingress");
    assert_eq!(config.router_service, "router-internal");
}

#[test]
fn test_invalid_number_is_rejected() {
    let err = RoutableConfig::from_lookup(lookup(&[("ROUTABLE_ENDPOINT_WAIT_SECS", "3m")]))
        .unwrap_err();

    assert_eq!(
        err,
        ConfigError::InvalidNumber {
            name: "ROUTABLE_ENDPOINT_WAIT_SECS",
            value: "3m".to_string()
        }
    );
}

#[test]
fn test_zero_duration_is_rejected() {
    let err =
        RoutableConfig::from_lookup(lookup(&[("ROUTABLE_POLL_INTERVAL_SECS", "0")])).unwrap_err();

    assert!(matches!(err, ConfigError::InvalidNumber { .. }));
}

#[test]
fn test_interval_longer_than_timeout_is_rejected() {
    let err = RoutableConfig::from_lookup(lookup(&[
        ("ROUTABLE_ROUTE_HOST_WAIT_SECS", "5"),
        ("ROUTABLE_POLL_INTERVAL_SECS", "10"),
    ]))
    .unwrap_err();

    assert!(matches!(err, ConfigError::IntervalExceedsTimeout { .. }));
}

#[test]
fn test_targets_from_json() {
    let config = RoutableConfig::from_lookup(lookup(&[(
        "ROUTABLE_TARGETS",
        r#"[{"namespace":"openshift-authentication","name":"oauth-openshift","scheme":"https","path":"healthz","expectedStatus":200}]"#,
    )]))
    .unwrap();

    assert_eq!(
        config.targets,
        vec![RouteTarget::new(
            "openshift-authentication",
            "oauth-openshift",
            "https",
            "healthz",
            200
        )]
    );
}

#[test]
fn test_target_path_defaults_to_root() {
    let config = RoutableConfig::from_lookup(lookup(&[(
        "ROUTABLE_TARGETS",
        r#"[{"namespace":"ns","name":"web","scheme":"http","expectedStatus":200}]"#,
    )]))
    .unwrap();

    assert_eq!(config.targets[0].path, "");
}

#[test]
fn test_malformed_targets_are_rejected() {
    let err = RoutableConfig::from_lookup(lookup(&[("ROUTABLE_TARGETS", "console")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTargets { .. }));

    let err = RoutableConfig::from_lookup(lookup(&[("ROUTABLE_TARGETS", "[]")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidTargets { .. }));
}
