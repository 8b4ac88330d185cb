use std::sync::Arc;

use cloudctl_api_models::{Collection, NatGateway, NatGatewayProperties, PropertiesPayload};
use cloudctl_waiter::ResponseEnvelope;
use reqwest::Method;

use crate::client::{ApiClient, ApiError};

/// NAT gateways live below a datacenter; every call takes the parent id.
#[derive(Debug, Clone)]
pub(crate) struct NatGatewayService {
    client: Arc<ApiClient>,
}

impl NatGatewayService {
    pub(crate) const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub(crate) async fn list(&self, datacenter_id: &str) -> Result<Collection<NatGateway>, ApiError> {
        let (collection, _) = self
            .client
            .get_json(&format!("datacenters/{datacenter_id}/natgateways?depth=1"))
            .await?;
        Ok(collection)
    }

    pub(crate) async fn get(&self, datacenter_id: &str, id: &str) -> Result<NatGateway, ApiError> {
        let (gateway, _) = self
            .client
            .get_json(&format!("datacenters/{datacenter_id}/natgateways/{id}"))
            .await?;
        Ok(gateway)
    }

    pub(crate) async fn create(
        &self,
        datacenter_id: &str,
        properties: NatGatewayProperties,
    ) -> Result<(NatGateway, ResponseEnvelope), ApiError> {
        self.client
            .send_json(
                Method::POST,
                &format!("datacenters/{datacenter_id}/natgateways"),
                &PropertiesPayload::new(properties),
            )
            .await
    }

    pub(crate) async fn delete(
        &self,
        datacenter_id: &str,
        id: &str,
    ) -> Result<ResponseEnvelope, ApiError> {
        self.client
            .delete(&format!("datacenters/{datacenter_id}/natgateways/{id}"))
            .await
    }
}
