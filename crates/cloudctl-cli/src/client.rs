//! Shared HTTP client, error types, and error classification for the CLI.

use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use anyhow::anyhow;
use cloudctl_api_models::ApiErrorBody;
use cloudctl_config::{ConfigError, Credentials, ValidationErrors};
use cloudctl_waiter::{ResponseEnvelope, WaitError};
use reqwest::header::{HeaderMap, HeaderValue, LOCATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation, timeout and operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Timeout(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::Timeout(_) => 4,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Timeout(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<ValidationErrors> for CliError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::Io { .. } => Self::Failure(error.into()),
            other => Self::Validation(format!("{:#}", anyhow::Error::from(other))),
        }
    }
}

impl From<WaitError> for CliError {
    fn from(error: WaitError) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else {
            Self::Failure(error.into())
        }
    }
}

impl From<ApiError> for CliError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Status { status, message }
                if matches!(
                    StatusCode::from_u16(status),
                    Ok(StatusCode::BAD_REQUEST
                        | StatusCode::CONFLICT
                        | StatusCode::UNPROCESSABLE_ENTITY)
                ) =>
            {
                Self::Validation(message)
            }
            other => Self::Failure(other.into()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        Self::Failure(anyhow!("failed to write output: {error}"))
    }
}

/// Errors raised by API calls. The remote text is kept unmodified.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("invalid request path '{path}': {source}")]
    InvalidPath {
        path: String,
        source: url::ParseError,
    },
    #[error("request to {url} failed: {source}")]
    Transport { url: Url, source: reqwest::Error },
    #[error("failed to decode response from {url}: {source}")]
    Decode { url: Url, source: reqwest::Error },
    #[error("{message} (status {status})")]
    Status { status: u16, message: String },
}

/// Thin JSON client over `reqwest` that attaches credentials and the trace header.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    http: Client,
    base_url: Url,
    credentials: Credentials,
}

impl ApiClient {
    pub(crate) fn new(
        base_url: Url,
        credentials: Credentials,
        timeout: Duration,
        trace_id: Option<&str>,
    ) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        if let Some(trace_id) = trace_id {
            let value = HeaderValue::from_str(trace_id).map_err(|_| {
                CliError::failure(anyhow!("trace identifier contains invalid characters"))
            })?;
            default_headers.insert(HEADER_REQUEST_ID, value);
        }

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url,
            credentials,
        })
    }

    /// Resolve a resource path against the base URL. Absolute URLs (as found in
    /// `Location` headers) are used as-is.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ApiError> {
        if let Ok(absolute) = Url::parse(path) {
            return Ok(absolute);
        }
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Credentials::Token(token) => builder.bearer_auth(token),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username, Some(password))
            }
        }
    }

    async fn send(&self, builder: RequestBuilder, url: &Url) -> Result<Response, ApiError> {
        tracing::debug!(url = %url, "sending request");
        let response = builder.send().await.map_err(|source| ApiError::Transport {
            url: url.clone(),
            source,
        })?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(classify_problem(response).await)
        }
    }

    /// `GET` a JSON document.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<(T, ResponseEnvelope), ApiError> {
        let url = self.url(path)?;
        let response = self.send(self.request(Method::GET, url.clone()), &url).await?;
        decode(response, url).await
    }

    /// `GET` a JSON document, mapping `404` to `None`.
    pub(crate) async fn find_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ApiError> {
        match self.get_json(path).await {
            Ok((value, _)) => Ok(Some(value)),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Send `body` with `method` and decode the JSON response.
    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(T, ResponseEnvelope), ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let builder = self.request(method, url.clone()).json(body);
        let response = self.send(builder, &url).await?;
        decode(response, url).await
    }

    /// `DELETE` a resource; only the envelope is returned.
    pub(crate) async fn delete(&self, path: &str) -> Result<ResponseEnvelope, ApiError> {
        let url = self.url(path)?;
        let response = self
            .send(self.request(Method::DELETE, url.clone()), &url)
            .await?;
        Ok(envelope(&response))
    }
}

async fn decode<T: DeserializeOwned>(
    response: Response,
    url: Url,
) -> Result<(T, ResponseEnvelope), ApiError> {
    let envelope = envelope(&response);
    let value = response
        .json::<T>()
        .await
        .map_err(|source| ApiError::Decode { url, source })?;
    Ok((value, envelope))
}

fn envelope(response: &Response) -> ResponseEnvelope {
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    ResponseEnvelope {
        status: response.status().as_u16(),
        location: header(LOCATION.as_str()),
        request_id: header(HEADER_REQUEST_ID),
    }
}

/// Turn a non-success response into an [`ApiError::Status`], keeping the remote text.
pub(crate) async fn classify_problem(response: Response) -> ApiError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let body_text = String::from_utf8_lossy(&bytes).trim().to_string();
    let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
        .ok()
        .map(|body| body.summary())
        .filter(|summary| !summary.is_empty())
        .unwrap_or_else(|| {
            if body_text.is_empty() {
                format!("request failed with status {status}")
            } else {
                body_text
            }
        });

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}
