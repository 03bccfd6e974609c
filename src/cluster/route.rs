use crate::readiness::{FetchError, Readiness, StatusQuery};
use async_trait::async_trait;
use kube::api::Api;
use kube::core::DynamicObject;
use kube::discovery::ApiResource;
use kube::Client;

/// `route.openshift.io/v1` Route, read as a dynamic object
pub fn route_api_resource() -> ApiResource {
    ApiResource {
        group: "route.openshift.io".to_string(),
        version: "v1".to_string(),
        api_version: "route.openshift.io/v1".to_string(),
        kind: "Route".to_string(),
        plural: "routes".to_string(),
    }
}

/// Extract the host the router admitted for a Route
///
/// Returns `status.ingress[0].host` when it is a non-empty string.
pub fn ingress_host(route: &DynamicObject) -> Option<String> {
    route
        .data
        .get("status")?
        .get("ingress")?
        .get(0)?
        .get("host")?
        .as_str()
        .filter(|host| !host.is_empty())
        .map(str::to_string)
}

/// Reports ready once a Route has been assigned an ingress host
pub struct RouteHostQuery {
    api: Api<DynamicObject>,
    namespace: String,
    name: String,
}

impl RouteHostQuery {
    pub fn new(client: Client, namespace: &str, name: &str) -> Self {
        Self {
            api: Api::namespaced_with(client, namespace, &route_api_resource()),
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl StatusQuery for RouteHostQuery {
    type Address = String;

    /// Any API error is fatal, including 404: a missing Route will not appear
    /// by waiting.
    async fn fetch(&self) -> Result<Readiness<String>, FetchError> {
        let route = self.api.get(&self.name).await?;

        Ok(match ingress_host(&route) {
            Some(host) => Readiness::Ready(host),
            None => Readiness::not_ready(format!(
                "route {}/{} has no ingress host",
                self.namespace, self.name
            )),
        })
    }
}
