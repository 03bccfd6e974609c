use super::ClusterError;
use k8s_openapi::api::core::v1::Service;
use kube::api::Api;
use kube::Client;
use tracing::info;

pub const DEFAULT_ROUTER_NAMESPACE: &str = "openshift-ingress";
pub const DEFAULT_ROUTER_SERVICE: &str = "router-default";

const NOT_EXPOSED: &str = "default router is not exposed by a load balancer service";

/// Whether routes are reachable from outside the cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterExposure {
    /// The default router sits behind a LoadBalancer Service
    LoadBalancer,
    /// Routes are not externally reachable; the scenario should be skipped
    Skip(String),
}

/// Classify the default router Service (None when it does not exist)
pub fn classify_router_service(service: Option<&Service>) -> RouterExposure {
    let service_type = service
        .and_then(|s| s.spec.as_ref())
        .and_then(|spec| spec.type_.as_deref());

    match service_type {
        Some("LoadBalancer") => RouterExposure::LoadBalancer,
        _ => RouterExposure::Skip(NOT_EXPOSED.to_string()),
    }
}

/// Look up the default router Service and decide whether to run
///
/// A missing Service is a skip; any other API error is returned.
pub async fn router_exposure(
    client: Client,
    namespace: &str,
    name: &str,
) -> Result<RouterExposure, ClusterError> {
    let services: Api<Service> = Api::namespaced(client, namespace);

    let service = services
        .get_opt(name)
        .await
        .map_err(|source| ClusterError::RouterLookup {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source,
        })?;

    let exposure = classify_router_service(service.as_ref());
    info!(
        namespace = %namespace,
        service = %name,
        exposure = ?exposure,
        "Checked default router exposure"
    );
    Ok(exposure)
}
