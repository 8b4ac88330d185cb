//! Resource client services. Each service is a cheap handle over the shared
//! [`ApiClient`](crate::client::ApiClient) and returns decoded resources together with the
//! response envelope of mutating calls.

pub(crate) mod datacenter;
pub(crate) mod k8s;
pub(crate) mod natgateway;
pub(crate) mod request;

pub(crate) use datacenter::DatacenterService;
pub(crate) use k8s::K8sService;
pub(crate) use natgateway::NatGatewayService;
pub(crate) use request::RequestService;
