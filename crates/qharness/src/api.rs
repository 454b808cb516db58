//! HTTP API checks: a request context plus response-contract expectations.
//!
//! ```yaml
//! request:
//!   method: POST
//!   url: /posts
//!   json: { title: foo, body: bar, userId: 1 }
//! expect:
//!   status: 201
//!   json: { /title: foo }
//!   has_fields: [id]
//! ```

use crate::result::{HarnessError, HarnessResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// HTTP method of an API check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    #[default]
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Patch => Self::PATCH,
            HttpMethod::Delete => Self::DELETE,
        }
    }
}

/// A response captured by [`ApiContext`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lower-case names)
    pub headers: BTreeMap<String, String>,
    /// Raw body
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as JSON
    pub fn json(&self) -> HarnessResult<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// 2xx
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Request context shared by the API checks of one test session.
#[derive(Debug, Clone)]
pub struct ApiContext {
    base_url: Option<String>,
    client: reqwest::Client,
}

impl ApiContext {
    /// Create a context; relative check URLs are joined onto `base_url`.
    pub fn new(base_url: Option<&str>, timeout: Duration) -> HarnessResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarnessError::config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            client,
        })
    }

    /// Base URL, if any
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Absolute URL for `url`
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        match &self.base_url {
            Some(base) => format!("{base}/{}", url.trim_start_matches('/')),
            None => url.to_string(),
        }
    }

    /// Send a request and capture the whole response.
    pub async fn request(
        &self,
        method: HttpMethod,
        url: &str,
        json: Option<&Value>,
        headers: &BTreeMap<String, String>,
    ) -> HarnessResult<ApiResponse> {
        let url = self.resolve_url(url);
        let request_error = |message: String| HarnessError::Request {
            url: url.clone(),
            message,
        };

        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| request_error(format!("bad header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| request_error(format!("bad header value {value:?}: {e}")))?;
            header_map.insert(name, value);
        }

        let mut builder = self
            .client
            .request(method.into(), &url)
            .headers(header_map);
        if let Some(body) = json {
            builder = builder.json(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = resp
            .text()
            .await
            .map_err(|e| request_error(e.to_string()))?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    /// GET `url`
    pub async fn get(&self, url: &str) -> HarnessResult<ApiResponse> {
        self.request(HttpMethod::Get, url, None, &BTreeMap::new())
            .await
    }

    /// POST a JSON body to `url`
    pub async fn post(
        &self,
        url: &str,
        json: &Value,
        headers: &BTreeMap<String, String>,
    ) -> HarnessResult<ApiResponse> {
        self.request(HttpMethod::Post, url, Some(json), headers)
            .await
    }
}

/// The request half of an API check.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiRequest {
    /// HTTP method
    #[serde(default)]
    pub method: HttpMethod,
    /// Absolute URL, or a path relative to the context base URL
    pub url: String,
    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// JSON request body
    #[serde(default)]
    pub json: Option<Value>,
}

/// Outcome of one expectation.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Which expectation
    pub name: String,
    /// Whether it held
    pub passed: bool,
    /// What went wrong
    pub detail: Option<String>,
}

impl CheckResult {
    fn pass(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: None,
        }
    }

    fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: Some(detail.into()),
        }
    }
}

/// Response contract.
///
/// JSON field paths are JSON pointers (`/user/id`); a bare `userId` or
/// dotted `user.id` is accepted as shorthand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Expectation {
    /// Exact status code
    #[serde(default)]
    pub status: Option<u16>,
    /// Field path -> expected JSON value
    #[serde(default)]
    pub json: BTreeMap<String, Value>,
    /// Field paths that must be present
    #[serde(default)]
    pub has_fields: Vec<String>,
    /// Substring the raw body must contain
    #[serde(default)]
    pub body_contains: Option<String>,
    /// Regex the raw body must match
    #[serde(default)]
    pub body_matches: Option<String>,
}

impl Expectation {
    /// Evaluate every expectation against `resp`.
    #[must_use]
    pub fn evaluate(&self, resp: &ApiResponse) -> Vec<CheckResult> {
        let mut results = Vec::new();

        if let Some(expected) = self.status {
            results.push(if resp.status == expected {
                CheckResult::pass("status")
            } else {
                CheckResult::fail(
                    "status",
                    format!("expected status {expected}, got {}", resp.status),
                )
            });
        }

        if !self.json.is_empty() || !self.has_fields.is_empty() {
            match resp.json() {
                Ok(body) => {
                    for (path, expected) in &self.json {
                        let name = format!("json {path}");
                        results.push(match body.pointer(&to_pointer(path)) {
                            Some(actual) if actual == expected => CheckResult::pass(name),
                            Some(actual) => CheckResult::fail(
                                name,
                                format!("{path}: expected {expected}, got {actual}"),
                            ),
                            None => CheckResult::fail(name, format!("{path}: missing")),
                        });
                    }
                    for path in &self.has_fields {
                        let name = format!("has {path}");
                        results.push(if body.pointer(&to_pointer(path)).is_some() {
                            CheckResult::pass(name)
                        } else {
                            CheckResult::fail(name, format!("{path}: missing"))
                        });
                    }
                }
                Err(e) => results.push(CheckResult::fail("json", format!("body is not JSON: {e}"))),
            }
        }

        if let Some(needle) = &self.body_contains {
            results.push(if resp.body.contains(needle.as_str()) {
                CheckResult::pass("body_contains")
            } else {
                CheckResult::fail(
                    "body_contains",
                    format!("expected body to contain {needle:?}"),
                )
            });
        }

        if let Some(pattern) = &self.body_matches {
            results.push(match regex::Regex::new(pattern) {
                Ok(re) if re.is_match(&resp.body) => CheckResult::pass("body_matches"),
                Ok(_) => CheckResult::fail(
                    "body_matches",
                    format!("expected body to match /{pattern}/"),
                ),
                Err(e) => CheckResult::fail("body_matches", format!("invalid pattern: {e}")),
            });
        }

        results
    }
}

/// Convert a field path to a JSON pointer.
fn to_pointer(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path.replace('.', "/"))
    }
}

/// A request and the contract its response must satisfy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCheck {
    /// What to send
    pub request: ApiRequest,
    /// What must hold
    #[serde(default)]
    pub expect: Expectation,
}

impl ApiCheck {
    /// Send the request and verify the response.
    ///
    /// Every failed expectation is listed in the returned assertion error.
    pub async fn run(&self, ctx: &ApiContext) -> HarnessResult<ApiResponse> {
        let resp = ctx
            .request(
                self.request.method,
                &self.request.url,
                self.request.json.as_ref(),
                &self.request.headers,
            )
            .await?;

        let failures: Vec<String> = self
            .expect
            .evaluate(&resp)
            .into_iter()
            .filter(|r| !r.passed)
            .filter_map(|r| r.detail)
            .collect();

        if failures.is_empty() {
            Ok(resp)
        } else {
            Err(HarnessError::assertion(failures.join("; ")))
        }
    }
}
