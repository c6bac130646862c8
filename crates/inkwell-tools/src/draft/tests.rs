use super::*;
use crate::testing::{unreachable_url, MockBackendServer};
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

fn draft_app() -> Router {
    Router::new().route(
        "/drafts/:id",
        get(|Path(id): Path<String>| async move {
            if id == "missing" {
                return (StatusCode::NOT_FOUND, Json(json!({"error": "draft not found"})));
            }
            (
                StatusCode::OK,
                Json(json!({"id": id, "title": "Launch notes", "body": "Draft body"})),
            )
        })
        .patch(
            |Path(id): Path<String>, headers: HeaderMap, Json(patch): Json<Value>| async move {
                Json(json!({
                    "id": id,
                    "title": patch["title"],
                    "authorized": headers.contains_key("authorization"),
                }))
            },
        ),
    )
}

async fn client() -> (MockBackendServer, DraftClient) {
    let server = MockBackendServer::start(draft_app()).await;
    let client = DraftClient::new(
        BackendEndpoint::new(BackendKind::Draft, server.base_url()).with_credential("draft-key"),
    )
    .unwrap();
    (server, client)
}

#[tokio::test]
async fn test_get_draft() {
    let (_server, client) = client().await;
    let draft = client.get_draft("post-42").await.unwrap();
    assert_eq!(draft["id"], "post-42");
    assert_eq!(draft["title"], "Launch notes");
}

#[tokio::test]
async fn test_get_draft_id_is_path_encoded() {
    let (_server, client) = client().await;
    let draft = client.get_draft("2024/launch notes").await.unwrap();
    assert_eq!(draft["id"], "2024/launch notes");
}

#[tokio::test]
async fn test_update_draft_sends_patch() {
    let (_server, client) = client().await;
    let updated = client
        .update_draft("post-42", json!({"title": "Launch notes v2"}))
        .await
        .unwrap();
    assert_eq!(updated["title"], "Launch notes v2");
    assert_eq!(updated["authorized"], true);
}

#[tokio::test]
async fn test_missing_draft_is_backend_error() {
    let (_server, client) = client().await;
    let err = client.get_draft("missing").await.unwrap_err();
    assert!(matches!(
        err,
        Error::BackendError { backend: BackendKind::Draft, status: 404, ref message }
            if message == "draft not found"
    ));
}

#[tokio::test]
async fn test_invalid_input_makes_no_call() {
    let client = DraftClient::new(BackendEndpoint::new(
        BackendKind::Draft,
        unreachable_url().await,
    ))
    .unwrap();

    assert!(matches!(
        client.get_draft("  ").await,
        Err(Error::InvalidPayload { .. })
    ));
    assert!(matches!(
        client.update_draft("post-42", json!(["not", "an", "object"])).await,
        Err(Error::InvalidPayload { .. })
    ));
}

#[test]
fn test_requires_draft_endpoint() {
    let err = tokio_test::assert_err!(DraftClient::new(BackendEndpoint::default_for(
        BackendKind::Storage
    )));
    assert!(matches!(err, Error::Configuration(_)));
    tokio_test::assert_ok!(DraftClient::new(BackendEndpoint::default_for(BackendKind::Draft)));
}
