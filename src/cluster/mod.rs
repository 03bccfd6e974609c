//! Cluster-side collaborators
//!
//! - `route`: `RouteHostQuery`, a status query over OpenShift Routes
//! - `router`: decides whether the default router is externally exposed

pub mod route;
pub mod router;

pub use route::{ingress_host, route_api_resource, RouteHostQuery};
pub use router::{
    classify_router_service, router_exposure, RouterExposure, DEFAULT_ROUTER_NAMESPACE,
    DEFAULT_ROUTER_SERVICE,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("Failed to create Kubernetes client: {0}")]
    Client(#[source] kube::Error),

    #[error("Failed to get router service {namespace}/{name}: {source}")]
    RouterLookup {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "cluster_test.rs"]
mod tests;
