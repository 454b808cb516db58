//! In-memory stand-ins for the qTest service, for unit tests.

use super::error::QTestError;
use super::transport::{Transport, TransportResponse};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

type Handler = Box<dyn Fn(&Call) -> TransportResponse + Send + Sync>;

/// Transport that answers from a closure and records every call in order.
pub(crate) struct MockTransport {
    handler: Handler,
    calls: Mutex<Vec<Call>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport").finish_non_exhaustive()
    }
}

impl MockTransport {
    pub(crate) fn new(handler: impl Fn(&Call) -> TransportResponse + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn reply(status: u16, body: Value) -> TransportResponse {
        TransportResponse {
            status,
            body: body.to_string(),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn dispatch(&self, call: Call) -> TransportResponse {
        let resp = (self.handler)(&call);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        resp
    }

    fn checked(resp: TransportResponse) -> Result<Value, QTestError> {
        if !resp.is_success() {
            return Err(QTestError::Status {
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(serde_json::from_str(&resp.body)?)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<Value, QTestError> {
        Self::checked(self.dispatch(Call {
            method: "GET",
            path: path.to_string(),
            body: None,
        }))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, QTestError> {
        Self::checked(self.dispatch(Call {
            method: "POST",
            path: path.to_string(),
            body: Some(body.clone()),
        }))
    }

    async fn post_unchecked(
        &self,
        path: &str,
        body: &Value,
    ) -> Result<TransportResponse, QTestError> {
        Ok(self.dispatch(Call {
            method: "POST",
            path: path.to_string(),
            body: Some(body.clone()),
        }))
    }
}

/// Scripted qTest project: cycle 42, suite 99, run 501, paged test cases.
#[derive(Debug, Clone)]
pub(crate) struct FakeQTest {
    pub pages: Vec<Value>,
    pub cycle_status: u16,
    pub listing_status: u16,
    pub log_status: u16,
}

impl Default for FakeQTest {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            cycle_status: 200,
            listing_status: 200,
            log_status: 200,
        }
    }
}

impl FakeQTest {
    pub(crate) fn with_pages(pages: Vec<Value>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }
}

/// Value of `name` in the query string of `path`.
pub(crate) fn query_param<'a>(path: &'a str, name: &str) -> Option<&'a str> {
    let query = path.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

pub(crate) fn qtest_service(fake: FakeQTest) -> MockTransport {
    MockTransport::new(move |call| {
        let route = call.path.split('?').next().unwrap_or_default();
        match (call.method, route) {
            ("POST", "/test-cycles") => MockTransport::reply(fake.cycle_status, json!({"id": 42})),
            ("POST", "/test-suites") => MockTransport::reply(200, json!({"id": 99})),
            ("GET", "/test-cases") => {
                let page: usize = query_param(&call.path, "page")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(1);
                let body = page
                    .checked_sub(1)
                    .and_then(|index| fake.pages.get(index))
                    .cloned()
                    .unwrap_or_else(|| json!([]));
                MockTransport::reply(fake.listing_status, body)
            }
            ("POST", "/test-runs") => MockTransport::reply(200, json!({"id": 501})),
            ("POST", r) if r.ends_with("/auto-test-logs") => {
                MockTransport::reply(fake.log_status, json!({}))
            }
            _ => MockTransport::reply(404, json!({"message": "no route"})),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_page_zero_is_empty() {
        let service = qtest_service(FakeQTest::with_pages(vec![json!([{"pid": "TC-1", "id": 7}])]));
        let page = service.get("/test-cases?page=0&size=50").await.unwrap();
        assert_eq!(page, json!([]));
        let page = service.get("/test-cases?page=1&size=50").await.unwrap();
        assert_eq!(page[0]["pid"], "TC-1");
    }
}
