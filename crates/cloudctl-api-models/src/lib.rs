#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the cloud API.
//!
//! Every resource shares the same envelope (`id`, `type`, `href`, `metadata`,
//! `properties`); only the property block differs, so resources are expressed as
//! [`Resource<P>`] with one property struct per kind. Field names follow the API's
//! camelCase wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle metadata attached to every resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Provisioning state such as `BUSY`, `AVAILABLE` or `ACTIVE`.
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Creation timestamp.
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Entity tag of the current revision.
    pub etag: Option<String>,
}

/// Generic resource envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource<P> {
    /// Resource identifier.
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    /// Resource type label.
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Canonical URL of the resource.
    pub href: Option<String>,
    #[serde(default)]
    /// Lifecycle metadata.
    pub metadata: Metadata,
    /// Kind-specific properties.
    pub properties: P,
}

impl<P> Resource<P> {
    /// Reported provisioning state, or `UNKNOWN` when the API omitted it.
    #[must_use]
    pub fn state(&self) -> &str {
        self.metadata.state.as_deref().unwrap_or("UNKNOWN")
    }
}

/// List response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Collection<T> {
    #[serde(default)]
    /// Collection identifier (e.g. `datacenters`).
    pub id: String,
    #[serde(default = "Vec::new")]
    /// Contained items.
    pub items: Vec<T>,
}

/// Datacenter properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Display name.
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Physical location, e.g. `de/fra`. Immutable after creation.
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Free-form description.
    pub description: Option<String>,
}

/// Kubernetes cluster properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct K8sClusterProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Display name.
    pub name: Option<String>,
    #[serde(rename = "k8sVersion", default, skip_serializing_if = "Option::is_none")]
    /// Kubernetes version.
    pub k8s_version: Option<String>,
}

/// Kubernetes node pool properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodePoolProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Display name.
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Datacenter the nodes are placed in.
    pub datacenter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Number of worker nodes.
    pub node_count: Option<u32>,
    #[serde(rename = "k8sVersion", default, skip_serializing_if = "Option::is_none")]
    /// Kubernetes version of the nodes.
    pub k8s_version: Option<String>,
}

/// NAT gateway properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NatGatewayProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Display name.
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    /// Reserved public IPs assigned to the gateway.
    pub public_ips: Vec<String>,
}

/// Datacenter resource.
pub type Datacenter = Resource<DatacenterProperties>;
/// Kubernetes cluster resource.
pub type K8sCluster = Resource<K8sClusterProperties>;
/// Kubernetes node pool resource.
pub type NodePool = Resource<NodePoolProperties>;
/// NAT gateway resource.
pub type NatGateway = Resource<NatGatewayProperties>;

/// Body for create and update calls: only the property block is sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertiesPayload<P> {
    /// Properties to create or change.
    pub properties: P,
}

impl<P> PropertiesPayload<P> {
    /// Wrap a property block.
    pub const fn new(properties: P) -> Self {
        Self { properties }
    }
}

/// Status block of an asynchronous request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestStatusMetadata {
    /// `QUEUED`, `RUNNING`, `DONE` or `FAILED`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Remote-supplied detail, mostly set on failure.
    pub message: Option<String>,
}

/// Response of `GET /requests/{id}/status`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Status document identifier.
    pub id: Option<String>,
    /// Status block.
    pub metadata: RequestStatusMetadata,
}

/// Request metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// When the request was accepted.
    pub created_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Embedded status, present when the API was asked for depth.
    pub request_status: Option<RequestStatus>,
}

/// What the request did.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestProperties {
    #[serde(default)]
    /// HTTP method of the original call.
    pub method: String,
    #[serde(default)]
    /// URL of the original call.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Body of the original call.
    pub body: Option<String>,
}

/// Asynchronous request resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    /// Request identifier.
    pub id: String,
    #[serde(default)]
    /// Request metadata.
    pub metadata: RequestMetadata,
    #[serde(default)]
    /// Request properties.
    pub properties: RequestProperties,
}

impl Request {
    /// Embedded status string, if the API returned one.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.metadata
            .request_status
            .as_ref()
            .map(|status| status.metadata.status.as_str())
    }
}

/// One entry of an API error body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Numeric error code as a string.
    pub error_code: Option<String>,
    /// Human-readable message.
    pub message: String,
}

/// Error document returned for non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// HTTP status echoed by the API.
    pub http_status: u16,
    #[serde(default)]
    /// Individual error messages.
    pub messages: Vec<ApiErrorMessage>,
}

impl ApiErrorBody {
    /// All messages joined into one line, each prefixed by its code when present.
    #[must_use]
    pub fn summary(&self) -> String {
        self.messages
            .iter()
            .map(|entry| match &entry.error_code {
                Some(code) => format!("[{code}] {}", entry.message),
                None => entry.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudctl_test_support::fixtures;
    use serde_json::json;

    #[test]
    fn datacenter_decodes_from_wire_shape() {
        let value = fixtures::datacenter("dc-1", "edge", "AVAILABLE");
        let datacenter: Datacenter = serde_json::from_value(value).expect("decode");
        assert_eq!(datacenter.id, "dc-1");
        assert_eq!(datacenter.state(), "AVAILABLE");
        assert_eq!(datacenter.properties.name.as_deref(), Some("edge"));
        assert_eq!(datacenter.properties.location.as_deref(), Some("de/fra"));
        assert!(datacenter.metadata.created_date.is_some());
    }

    #[test]
    fn collection_of_clusters_decodes() {
        let value = fixtures::collection(
            "k8s",
            vec![
                fixtures::k8s_cluster("c-1", "prod", "ACTIVE"),
                fixtures::k8s_cluster("c-2", "stage", "DEPLOYING"),
            ],
        );
        let clusters: Collection<K8sCluster> = serde_json::from_value(value).expect("decode");
        assert_eq!(clusters.items.len(), 2);
        assert_eq!(clusters.items[1].state(), "DEPLOYING");
        assert_eq!(
            clusters.items[0].properties.k8s_version.as_deref(),
            Some("1.30.2")
        );
    }

    #[test]
    fn request_exposes_embedded_status() {
        let value = fixtures::request("r-1", "POST", "/datacenters", "RUNNING");
        let request: Request = serde_json::from_value(value).expect("decode");
        assert_eq!(request.status(), Some("RUNNING"));
        assert_eq!(request.properties.method, "POST");
    }

    #[test]
    fn create_payload_omits_unset_properties() {
        let payload = PropertiesPayload::new(NatGatewayProperties {
            name: Some("gw".into()),
            public_ips: Vec::new(),
        });
        let encoded = serde_json::to_value(&payload).expect("encode");
        assert_eq!(encoded, json!({ "properties": { "name": "gw" } }));
    }

    #[test]
    fn error_body_summary_keeps_codes() {
        let body: ApiErrorBody =
            serde_json::from_value(fixtures::api_error(422, "100", "name is required"))
                .expect("decode");
        assert_eq!(body.http_status, 422);
        assert_eq!(body.summary(), "[100] name is required");
    }
}
