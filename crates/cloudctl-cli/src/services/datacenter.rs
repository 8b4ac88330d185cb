use std::sync::Arc;

use cloudctl_api_models::{Collection, Datacenter, DatacenterProperties, PropertiesPayload};
use cloudctl_waiter::ResponseEnvelope;
use reqwest::Method;

use crate::client::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub(crate) struct DatacenterService {
    client: Arc<ApiClient>,
}

impl DatacenterService {
    pub(crate) const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub(crate) async fn list(&self) -> Result<Collection<Datacenter>, ApiError> {
        let (collection, _) = self.client.get_json("datacenters?depth=1").await?;
        Ok(collection)
    }

    pub(crate) async fn get(&self, id: &str) -> Result<Datacenter, ApiError> {
        let (datacenter, _) = self.client.get_json(&format!("datacenters/{id}")).await?;
        Ok(datacenter)
    }

    pub(crate) async fn create(
        &self,
        properties: DatacenterProperties,
    ) -> Result<(Datacenter, ResponseEnvelope), ApiError> {
        self.client
            .send_json(
                Method::POST,
                "datacenters",
                &PropertiesPayload::new(properties),
            )
            .await
    }

    pub(crate) async fn update(
        &self,
        id: &str,
        properties: DatacenterProperties,
    ) -> Result<(Datacenter, ResponseEnvelope), ApiError> {
        self.client
            .send_json(
                Method::PATCH,
                &format!("datacenters/{id}"),
                &properties,
            )
            .await
    }

    pub(crate) async fn delete(&self, id: &str) -> Result<ResponseEnvelope, ApiError> {
        self.client.delete(&format!("datacenters/{id}")).await
    }
}
