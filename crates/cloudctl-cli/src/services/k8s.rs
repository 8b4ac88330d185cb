use std::sync::Arc;

use cloudctl_api_models::{
    Collection, K8sCluster, K8sClusterProperties, NodePool, NodePoolProperties, PropertiesPayload,
};
use cloudctl_waiter::{RemoteStatus, ResponseEnvelope};
use reqwest::Method;

use crate::client::{ApiClient, ApiError};

/// Kubernetes clusters and their node pools. These resources report progress through
/// `metadata.state` instead of request status documents.
#[derive(Debug, Clone)]
pub(crate) struct K8sService {
    client: Arc<ApiClient>,
}

impl K8sService {
    pub(crate) const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub(crate) async fn list_clusters(&self) -> Result<Collection<K8sCluster>, ApiError> {
        let (collection, _) = self.client.get_json("k8s?depth=1").await?;
        Ok(collection)
    }

    pub(crate) async fn get_cluster(&self, id: &str) -> Result<K8sCluster, ApiError> {
        let (cluster, _) = self.client.get_json(&cluster_path(id)).await?;
        Ok(cluster)
    }

    pub(crate) async fn create_cluster(
        &self,
        properties: K8sClusterProperties,
    ) -> Result<(K8sCluster, ResponseEnvelope), ApiError> {
        self.client
            .send_json(Method::POST, "k8s", &PropertiesPayload::new(properties))
            .await
    }

    pub(crate) async fn delete_cluster(&self, id: &str) -> Result<ResponseEnvelope, ApiError> {
        self.client.delete(&cluster_path(id)).await
    }

    pub(crate) async fn cluster_state(&self, id: &str) -> Result<RemoteStatus, ApiError> {
        let cluster = self.get_cluster(id).await?;
        Ok(RemoteStatus::new(cluster.state()))
    }

    /// `None` once the cluster is gone.
    pub(crate) async fn find_cluster_state(
        &self,
        id: &str,
    ) -> Result<Option<RemoteStatus>, ApiError> {
        let cluster: Option<K8sCluster> = self.client.find_json(&cluster_path(id)).await?;
        Ok(cluster.map(|cluster| RemoteStatus::new(cluster.state())))
    }

    pub(crate) async fn list_nodepools(
        &self,
        cluster_id: &str,
    ) -> Result<Collection<NodePool>, ApiError> {
        let (collection, _) = self
            .client
            .get_json(&format!("k8s/{cluster_id}/nodepools?depth=1"))
            .await?;
        Ok(collection)
    }

    pub(crate) async fn get_nodepool(
        &self,
        cluster_id: &str,
        id: &str,
    ) -> Result<NodePool, ApiError> {
        let (nodepool, _) = self
            .client
            .get_json(&nodepool_path(cluster_id, id))
            .await?;
        Ok(nodepool)
    }

    pub(crate) async fn create_nodepool(
        &self,
        cluster_id: &str,
        properties: NodePoolProperties,
    ) -> Result<(NodePool, ResponseEnvelope), ApiError> {
        self.client
            .send_json(
                Method::POST,
                &format!("k8s/{cluster_id}/nodepools"),
                &PropertiesPayload::new(properties),
            )
            .await
    }

    pub(crate) async fn delete_nodepool(
        &self,
        cluster_id: &str,
        id: &str,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.client.delete(&nodepool_path(cluster_id, id)).await
    }

    pub(crate) async fn nodepool_state(
        &self,
        cluster_id: &str,
        id: &str,
    ) -> Result<RemoteStatus, ApiError> {
        let nodepool = self.get_nodepool(cluster_id, id).await?;
        Ok(RemoteStatus::new(nodepool.state()))
    }

    pub(crate) async fn find_nodepool_state(
        &self,
        cluster_id: &str,
        id: &str,
    ) -> Result<Option<RemoteStatus>, ApiError> {
        let nodepool: Option<NodePool> = self
            .client
            .find_json(&nodepool_path(cluster_id, id))
            .await?;
        Ok(nodepool.map(|nodepool| RemoteStatus::new(nodepool.state())))
    }
}

fn cluster_path(id: &str) -> String {
    format!("k8s/{id}")
}

fn nodepool_path(cluster_id: &str, id: &str) -> String {
    format!("k8s/{cluster_id}/nodepools/{id}")
}
