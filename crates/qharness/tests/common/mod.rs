//! In-process stand-ins for qTest and the API under test.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PROJECT: &str = "101762";
pub const TOKEN: &str = "secret-token";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub route: String,
    pub query: String,
    pub auth: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Debug)]
pub struct MockQTest {
    pub calls: Mutex<Vec<Recorded>>,
    pub cycle_status: StatusCode,
    pub log_status: StatusCode,
    pub cases: Vec<Value>,
    /// Held before every response
    pub delay: Duration,
}

impl MockQTest {
    pub fn new(cases: Vec<Value>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            cycle_status: StatusCode::OK,
            log_status: StatusCode::CREATED,
            cases,
            delay: Duration::ZERO,
        }
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

async fn handle(
    State(state): State<Arc<MockQTest>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let prefix = format!("/projects/{PROJECT}");
    let route = uri
        .path()
        .strip_prefix(&prefix)
        .unwrap_or(uri.path())
        .to_string();
    let query = uri.query().unwrap_or_default().to_string();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.calls.lock().unwrap().push(Recorded {
        method: method.clone(),
        route: route.clone(),
        query: query.clone(),
        auth: header("authorization"),
        content_type: header("content-type"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    match (method.as_str(), route.as_str()) {
        ("POST", "/test-cycles") => (state.cycle_status, Json(json!({"id": 42}))),
        ("POST", "/test-suites") => (StatusCode::OK, Json(json!({"id": 99}))),
        ("GET", "/test-cases") => {
            let page: usize = param(&query, "page").and_then(|p| p.parse().ok()).unwrap_or(1);
            let size: usize = param(&query, "size").and_then(|s| s.parse().ok()).unwrap_or(50);
            let items: Vec<Value> = match page.checked_sub(1) {
                Some(index) => state.cases.iter().skip(index * size).take(size).cloned().collect(),
                None => Vec::new(),
            };
            (StatusCode::OK, Json(Value::Array(items)))
        }
        ("POST", "/test-runs") => (StatusCode::OK, Json(json!({"id": 501}))),
        ("POST", r) if r.ends_with("/auto-test-logs") => (state.log_status, Json(json!({}))),
        _ => (StatusCode::NOT_FOUND, Json(json!({"message": "no route"}))),
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Start a qTest stand-in and return its base URL.
pub async fn spawn_qtest(state: Arc<MockQTest>) -> String {
    serve(Router::new().fallback(handle).with_state(state)).await
}

async fn get_post(Path(id): Path<u64>) -> (StatusCode, Json<Value>) {
    if id == 1 {
        (
            StatusCode::OK,
            Json(json!({"userId": 1, "id": 1, "title": "sunt aut facere", "body": "quia et suscipit"})),
        )
    } else {
        (StatusCode::NOT_FOUND, Json(json!({})))
    }
}

async fn create_post(Json(mut post): Json<Value>) -> (StatusCode, Json<Value>) {
    post["id"] = json!(101);
    (StatusCode::CREATED, Json(post))
}

/// Start a small posts API: `GET /posts/{id}` and `POST /posts`.
pub async fn spawn_posts_api() -> String {
    let app = Router::new()
        .route("/posts", axum::routing::post(create_post))
        .route("/posts/{id}", get(get_post));
    serve(app).await
}
