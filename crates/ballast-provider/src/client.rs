//! Sidecar HTTP client.
//!
//! Talks to the capacity provider sidecar over HTTP/1.1 using a pooled
//! hyper client. Each attempt gets its own timeout; transport failures are
//! retried according to the [`RetryPolicy`].

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::{header, Method, Request, StatusCode, Uri};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::retry::RetryPolicy;
use crate::types::{ObservedCapacity, ResourceInstance};
use crate::CapacityProvider;

/// Where the sidecar listens when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:49750/resource/";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const CAPACITY_TO_BE_ADDED: &str = "capacityToBeAdded";
const CAPACITY_TO_BE_REMOVED: &str = "capacityToBeRemoved";

/// HTTP client for the capacity provider sidecar.
#[derive(Clone)]
pub struct SidecarClient {
    base_url: String,
    http: Client<HttpConnector, Full<Bytes>>,
    retry: RetryPolicy,
    request_timeout: Duration,
}

impl std::fmt::Debug for SidecarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SidecarClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl SidecarClient {
    /// Create a client for the sidecar at `base_url`.
    ///
    /// A trailing `/` is added if missing. Only `http://` is supported.
    pub fn new(base_url: &str) -> ProviderResult<Self> {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let uri: Uri = base_url
            .parse()
            .map_err(|e| ProviderError::InvalidUrl(format!("{base_url}: {e}")))?;
        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(ProviderError::InvalidUrl(format!(
                "{base_url}: expected an http:// url with a host"
            )));
        }

        Ok(Self {
            base_url,
            http: Client::builder(TokioExecutor::new()).build_http(),
            retry: RetryPolicy::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the per-attempt request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, resource_alias: &str, suffix: &str) -> ProviderResult<Uri> {
        let url = format!("{}{resource_alias}/{suffix}", self.base_url);
        url.parse()
            .map_err(|e| ProviderError::InvalidUrl(format!("{url}: {e}")))
    }

    /// Send a request, retrying transport failures, and decode a 2xx body.
    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        uri: Uri,
        body: Option<serde_json::Value>,
    ) -> ProviderResult<T> {
        let payload = match body {
            Some(value) => Bytes::from(
                serde_json::to_vec(&value).map_err(|e| ProviderError::Decode(e.to_string()))?,
            ),
            None => Bytes::new(),
        };

        let mut retry = 0;
        loop {
            let mut builder = Request::builder()
                .method(method.clone())
                .uri(uri.clone())
                .header(header::USER_AGENT, "ballast/0.1")
                .header(header::ACCEPT, "application/json");
            if !payload.is_empty() {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
            }
            let req = builder
                .body(Full::new(payload.clone()))
                .map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

            match self.attempt(req).await {
                Ok((status, body)) if status.is_success() => {
                    debug!(%method, %uri, %status, "provider call succeeded");
                    return serde_json::from_slice(&body)
                        .map_err(|e| ProviderError::Decode(e.to_string()));
                }
                Ok((status, body)) => {
                    return Err(ProviderError::Status {
                        status: status.as_u16(),
                        body: String::from_utf8_lossy(&body).trim().to_string(),
                    });
                }
                Err(message) if retry < self.retry.max_retries => {
                    let wait = self.retry.backoff(retry);
                    warn!(
                        %method,
                        %uri,
                        error = %message,
                        attempt = retry + 1,
                        wait_ms = wait.as_millis() as u64,
                        "provider call failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    retry += 1;
                }
                Err(message) => {
                    return Err(ProviderError::Transport {
                        attempts: retry + 1,
                        message,
                    });
                }
            }
        }
    }

    /// One request/response exchange bounded by the request timeout.
    ///
    /// `Err` means the exchange itself failed and may be retried.
    async fn attempt(&self, req: Request<Full<Bytes>>) -> Result<(StatusCode, Bytes), String> {
        let exchange = async {
            let resp = self.http.request(req).await.map_err(|e| error_chain(&e))?;
            let status = resp.status();
            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| error_chain(&e))?
                .to_bytes();
            Ok((status, body))
        };

        match tokio::time::timeout(self.request_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(format!(
                "request timed out after {}ms",
                self.request_timeout.as_millis()
            )),
        }
    }
}

#[async_trait]
impl CapacityProvider for SidecarClient {
    async fn get_current_capacity(&self, resource_alias: &str) -> ProviderResult<ObservedCapacity> {
        let uri = self.endpoint(resource_alias, "capacity")?;
        self.call(Method::GET, uri, None).await
    }

    async fn add_capacity(
        &self,
        resource_alias: &str,
        amount: u32,
    ) -> ProviderResult<ResourceInstance> {
        if amount == 0 {
            return Ok(ResourceInstance::for_alias(resource_alias));
        }
        let uri = self.endpoint(resource_alias, "capacity/add")?;
        let body = serde_json::json!({ CAPACITY_TO_BE_ADDED: amount });
        self.call(Method::POST, uri, Some(body)).await
    }

    async fn remove_capacity(
        &self,
        resource_alias: &str,
        amount: u32,
    ) -> ProviderResult<ResourceInstance> {
        if amount == 0 {
            return Ok(ResourceInstance::for_alias(resource_alias));
        }
        let uri = self.endpoint(resource_alias, "capacity/remove")?;
        let body = serde_json::json!({ CAPACITY_TO_BE_REMOVED: amount });
        self.call(Method::POST, uri, Some(body)).await
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
