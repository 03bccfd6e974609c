//! Tests for Route host extraction and router exposure classification

use super::*;
use k8s_openapi::api::core::v1::{Service, ServiceSpec};
use kube::core::DynamicObject;
use serde_json::json;

fn route_with_status(status: serde_json::Value) -> DynamicObject {
    DynamicObject::new("console", &route_api_resource()).data(json!({
        "spec": { "host": "", "to": { "kind": "Service", "name": "console" } },
        "status": status,
    }))
}

fn service_of_type(type_: Option<&str>) -> Service {
    Service {
        spec: Some(ServiceSpec {
            type_: type_.map(str::to_string),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[test]
fn test_route_api_resource_targets_openshift_routes() {
    let ar = route_api_resource();

    assert_eq!(ar.api_version, "route.openshift.io/v1");
    assert_eq!(ar.kind, "Route");
    assert_eq!(ar.plural, "routes");
}

#[test]
fn test_ingress_host_from_admitted_route() {
    let route = route_with_status(json!({
        "ingress": [
            { "host": "console-openshift-console.apps.example.com", "routerName": "default" },
            { "host": "ignored.example.com" }
        ]
    }));

    assert_eq!(
        ingress_host(&route).as_deref(),
        Some("console-openshift-console.apps.example.com")
    );
}

#[test]
fn test_ingress_host_missing_when_no_ingress() {
    assert_eq!(ingress_host(&route_with_status(json!({}))), None);
    assert_eq!(
        ingress_host(&route_with_status(json!({ "ingress": [] }))),
        None
    );
}

#[test]
fn test_ingress_host_missing_when_host_empty() {
    let route = route_with_status(json!({ "ingress": [{ "host": "" }] }));

    assert_eq!(ingress_host(&route), None);
}

#[test]
fn test_ingress_host_missing_without_status() {
    let route = DynamicObject::new("console", &route_api_resource()).data(json!({ "spec": {} }));

    assert_eq!(ingress_host(&route), None);
}

#[test]
fn test_load_balancer_service_is_exposed() {
    let service = service_of_type(Some("LoadBalancer"));

    assert_eq!(
        classify_router_service(Some(&service)),
        RouterExposure::LoadBalancer
    );
}

#[test]
fn test_cluster_ip_service_is_skipped() {
    let service = service_of_type(Some("ClusterIP"));

    assert!(matches!(
        classify_router_service(Some(&service)),
        RouterExposure::Skip(reason) if reason.contains("not exposed by a load balancer")
    ));
}

#[test]
fn test_missing_service_is_skipped() {
    assert!(matches!(
        classify_router_service(None),
        RouterExposure::Skip(_)
    ));
}

#[test]
fn test_service_without_type_is_skipped() {
    assert!(matches!(
        classify_router_service(Some(&service_of_type(None))),
        RouterExposure::Skip(_)
    ));
}
