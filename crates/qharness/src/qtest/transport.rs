//! HTTP client adapter for the qTest REST API.
//!
//! Every call is one request: no retries, explicit timeouts, and any
//! non-success status becomes [`QTestError::Status`] for the checked calls.

use super::error::QTestError;
use crate::config::QTestConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Raw status and body of a response whose status was not judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl TransportResponse {
    /// 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Authenticated access to project-scoped qTest endpoints.
///
/// `path` is relative to `{base_url}/projects/{project_id}` and carries its
/// own query string, e.g. `/test-suites?parentId=9&parentType=test-cycle`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET and parse the JSON body; non-2xx is an error.
    async fn get(&self, path: &str) -> Result<Value, QTestError>;

    /// POST a JSON body and parse the JSON reply; non-2xx is an error.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, QTestError>;

    /// POST a JSON body and hand back whatever status came back.
    async fn post_unchecked(&self, path: &str, body: &Value)
        -> Result<TransportResponse, QTestError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, path: &str) -> Result<Value, QTestError> {
        (**self).get(path).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, QTestError> {
        (**self).post(path, body).await
    }

    async fn post_unchecked(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<TransportResponse, QTestError> {
        (**self).post_unchecked(path, body).await
    }
}

/// [`Transport`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    project_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client with the bearer token and JSON content type baked in.
    pub fn new(config: &QTestConfig) -> Result<Self, QTestError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
            .map_err(|_| QTestError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            project_url: config.project_url(),
            client,
        })
    }

    /// `{base_url}/projects/{project_id}`
    pub fn project_url(&self) -> &str {
        &self.project_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.project_url)
    }

    async fn checked(resp: reqwest::Response) -> Result<Value, QTestError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(QTestError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value, QTestError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self.client.get(&url).send().await?;
        Self::checked(resp).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, QTestError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let resp = self.client.post(&url).json(body).send().await?;
        Self::checked(resp).await
    }

    async fn post_unchecked(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<TransportResponse, QTestError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}
