//! Router test helpers: in-memory state and an in-process tool backend

use super::{router, AppState};
use axum::body::{Body, BodyDataStream};
use axum::extract::Path;
use axum::http::{Method, Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use inkwell_core::{EventBus, WorkflowStreamGateway, WorkflowTracker};
use inkwell_store::{MemoryWorkflowStore, WorkflowStore};
use inkwell_tools::{BackendEndpoint, BackendKind, DraftClient, ToolDispatcher};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

/// Backend answering `/tool` and `/drafts/:id` for every backend kind
fn backend_app() -> Router {
    Router::new()
        .route(
            "/tool",
            post(|Json(body): Json<Value>| async move {
                if body.get("fail").is_some() {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"error": "backend exploded"})),
                    );
                }
                let path = body["path"].as_str().unwrap_or("unnamed").to_string();
                (
                    StatusCode::OK,
                    Json(json!({"success": true, "url": format!("storage://uploads/{path}")})),
                )
            }),
        )
        .route(
            "/drafts/:id",
            get(|Path(id): Path<String>| async move {
                Json(json!({"id": id, "title": "Original title"}))
            })
            .patch(
                |Path(id): Path<String>, Json(patch): Json<Value>| async move {
                    Json(json!({"id": id, "title": patch["title"]}))
                },
            ),
        )
}

pub(crate) async fn spawn_backend() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, backend_app()).await.unwrap();
    });
    format!("http://{addr}")
}

/// State over an in-memory store with every backend at `backend_url`
pub(crate) fn test_state(backend_url: &str) -> AppState {
    let store: Arc<dyn WorkflowStore> = Arc::new(MemoryWorkflowStore::new());
    let bus = EventBus::new();
    let endpoint = |kind| BackendEndpoint::new(kind, backend_url);

    AppState {
        tracker: WorkflowTracker::new(store.clone(), bus.clone()),
        gateway: WorkflowStreamGateway::new(store.clone(), bus.clone()),
        store,
        bus,
        dispatcher: ToolDispatcher::from_endpoints(
            endpoint(BackendKind::Research),
            endpoint(BackendKind::Seo),
            endpoint(BackendKind::Storage),
        )
        .unwrap(),
        drafts: Arc::new(DraftClient::new(endpoint(BackendKind::Draft)).unwrap()),
        shutdown: CancellationToken::new(),
    }
}

/// Router plus the state behind it
pub(crate) async fn test_app() -> (Router, AppState) {
    let state = test_state(&spawn_backend().await);
    (router(state.clone()), state)
}

pub(crate) fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub(crate) fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send a request and decode the JSON body
pub(crate) async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Reads `data:` payloads from an SSE response body
pub(crate) struct SseReader {
    body: BodyDataStream,
    buffer: String,
}

impl SseReader {
    pub(crate) fn new(body: Body) -> Self {
        Self {
            body: body.into_data_stream(),
            buffer: String::new(),
        }
    }

    /// Next frame's JSON, or `None` once the body ends
    pub(crate) async fn next_frame(&mut self) -> Option<Value> {
        loop {
            while let Some(end) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..end + 2).collect();
                let data: String = block
                    .lines()
                    .filter_map(|line| line.strip_prefix("data:"))
                    .map(str::trim_start)
                    .collect();
                if !data.is_empty() {
                    return Some(serde_json::from_str(&data).unwrap());
                }
            }

            let chunk = tokio::time::timeout(Duration::from_secs(2), self.body.next())
                .await
                .expect("timed out waiting for SSE data")?
                .unwrap();
            self.buffer.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    }
}
