use std::sync::Arc;

use async_trait::async_trait;
use cloudctl_api_models::{Collection, Request, RequestStatus};
use cloudctl_waiter::{BoxError, RemoteStatus, RequestStatusSource};

use crate::client::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub(crate) struct RequestService {
    client: Arc<ApiClient>,
}

impl RequestService {
    pub(crate) const fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub(crate) async fn list(&self) -> Result<Collection<Request>, ApiError> {
        let (collection, _) = self.client.get_json("requests?depth=2").await?;
        Ok(collection)
    }

    pub(crate) async fn get(&self, id: &str) -> Result<Request, ApiError> {
        let (request, _) = self
            .client
            .get_json(&format!("requests/{id}?depth=1"))
            .await?;
        Ok(request)
    }

    /// Fetch a status document; `path` may be relative or the absolute `Location` URL.
    pub(crate) async fn status(&self, path: &str) -> Result<RequestStatus, ApiError> {
        let (status, _) = self.client.get_json(path).await?;
        Ok(status)
    }
}

#[async_trait]
impl RequestStatusSource for RequestService {
    async fn request_status(&self, path: &str) -> Result<RemoteStatus, BoxError> {
        let status = self.status(path).await?;
        Ok(RemoteStatus {
            state: status.metadata.status,
            message: status.metadata.message,
        })
    }
}
