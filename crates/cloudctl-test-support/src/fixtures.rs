//! JSON payload builders mirroring the cloud API's response shapes.

use serde_json::{Value, json};

/// Single datacenter resource.
#[must_use]
pub fn datacenter(id: &str, name: &str, state: &str) -> Value {
    json!({
        "id": id,
        "type": "datacenter",
        "href": format!("/datacenters/{id}"),
        "metadata": { "state": state, "createdDate": "2026-01-01T00:00:00Z" },
        "properties": { "name": name, "location": "de/fra", "description": null }
    })
}

/// Status document of an asynchronous request.
#[must_use]
pub fn request_status(id: &str, status: &str, message: Option<&str>) -> Value {
    json!({
        "id": format!("{id}/status"),
        "type": "request-status",
        "href": format!("/requests/{id}/status"),
        "metadata": { "status": status, "message": message, "etag": "e1" }
    })
}

/// Request resource with embedded status.
#[must_use]
pub fn request(id: &str, method: &str, url: &str, status: &str) -> Value {
    json!({
        "id": id,
        "type": "request",
        "href": format!("/requests/{id}"),
        "metadata": {
            "createdDate": "2026-01-01T00:00:00Z",
            "requestStatus": { "metadata": { "status": status, "message": null } }
        },
        "properties": { "method": method, "url": url, "body": null }
    })
}

/// Kubernetes cluster resource.
#[must_use]
pub fn k8s_cluster(id: &str, name: &str, state: &str) -> Value {
    json!({
        "id": id,
        "type": "k8s",
        "href": format!("/k8s/{id}"),
        "metadata": { "state": state, "createdDate": "2026-01-01T00:00:00Z" },
        "properties": { "name": name, "k8sVersion": "1.30.2" }
    })
}

/// Kubernetes node pool resource.
#[must_use]
pub fn nodepool(cluster_id: &str, id: &str, name: &str, state: &str) -> Value {
    json!({
        "id": id,
        "type": "nodepool",
        "href": format!("/k8s/{cluster_id}/nodepools/{id}"),
        "metadata": { "state": state, "createdDate": "2026-01-01T00:00:00Z" },
        "properties": {
            "name": name,
            "datacenterId": "dc-1",
            "nodeCount": 2,
            "k8sVersion": "1.30.2"
        }
    })
}

/// NAT gateway resource.
#[must_use]
pub fn nat_gateway(datacenter_id: &str, id: &str, name: &str, state: &str) -> Value {
    json!({
        "id": id,
        "type": "natgateway",
        "href": format!("/datacenters/{datacenter_id}/natgateways/{id}"),
        "metadata": { "state": state, "createdDate": "2026-01-01T00:00:00Z" },
        "properties": { "name": name, "publicIps": ["203.0.113.10"] }
    })
}

/// Collection wrapper around `items`.
#[must_use]
pub fn collection(kind: &str, items: Vec<Value>) -> Value {
    json!({ "id": kind, "type": "collection", "items": items })
}

/// Error body as returned by the API for non-2xx responses.
#[must_use]
pub fn api_error(status: u16, code: &str, message: &str) -> Value {
    json!({
        "httpStatus": status,
        "messages": [{ "errorCode": code, "message": message }]
    })
}
