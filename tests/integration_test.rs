//! Integration tests for Inkwell
//!
//! These tests verify the integration between the crates:
//! - inkwell-store: durable workflow and event log
//! - inkwell-core: bus, tracker, and streaming gateway
//! - inkwell-tools: dispatch to HTTP tool backends

use std::sync::Arc;
use std::time::Duration;

use axum::routing::post;
use axum::{Json, Router};
use inkwell_core::{
    BusNotification, EventBus, NotificationKind, StreamFrame, WorkflowStreamGateway,
    WorkflowTracker,
};
use inkwell_store::{SqliteWorkflowStore, Workflow, WorkflowStatus, WorkflowStore};
use inkwell_tools::{BackendEndpoint, BackendKind, ToolDispatcher};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

async fn storage_backend() -> String {
    let app = Router::new().route(
        "/tool",
        post(|Json(body): Json<Value>| async move {
            Json(json!({
                "success": true,
                "url": format!("storage://assets/{}", body["path"].as_str().unwrap_or_default()),
            }))
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

struct Harness {
    store: Arc<dyn WorkflowStore>,
    bus: EventBus,
    tracker: WorkflowTracker,
    gateway: WorkflowStreamGateway,
}

async fn harness() -> Harness {
    let store: Arc<dyn WorkflowStore> = Arc::new(SqliteWorkflowStore::in_memory().await.unwrap());
    let bus = EventBus::new();
    Harness {
        tracker: WorkflowTracker::new(store.clone(), bus.clone()),
        gateway: WorkflowStreamGateway::new(store.clone(), bus.clone()),
        store,
        bus,
    }
}

// ============================================================================
// Driver Flow
// ============================================================================

#[tokio::test]
async fn test_driver_flow_over_sqlite() {
    let h = harness().await;
    let storage_url = storage_backend().await;
    let dispatcher = ToolDispatcher::from_endpoints(
        BackendEndpoint::default_for(BackendKind::Research),
        BackendEndpoint::default_for(BackendKind::Seo),
        BackendEndpoint::new(BackendKind::Storage, storage_url),
    )
    .unwrap();

    h.tracker
        .create(Workflow::with_id("w1", "draft_review"))
        .await
        .unwrap();
    h.tracker
        .record("w1", "research_done", json!({"sources": 4}))
        .await
        .unwrap();

    let mut stream = h
        .gateway
        .open_stream("w1", CancellationToken::new())
        .await
        .unwrap();
    match stream.next_frame().await.unwrap() {
        StreamFrame::History { events } => {
            let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
            assert_eq!(types, vec!["created", "research_done"]);
        }
        other => panic!("expected history, got {other:?}"),
    }

    // The driver runs the workflow and records the tool result
    h.tracker.transition("w1", WorkflowStatus::Running).await.unwrap();
    let result = dispatcher
        .dispatch("storage:upload", json!({"path": "hero.png", "contentType": "image/png"}))
        .await
        .unwrap();
    h.tracker
        .record("w1", "asset_uploaded", result.clone())
        .await
        .unwrap();
    h.tracker.transition("w1", WorkflowStatus::Succeeded).await.unwrap();

    let mut live = Vec::new();
    for _ in 0..3 {
        let frame = timeout(Duration::from_secs(1), stream.next_frame())
            .await
            .unwrap()
            .unwrap();
        live.push(serde_json::to_value(frame).unwrap());
    }
    assert_eq!(live[0], json!({"type": "status", "status": "running"}));
    assert_eq!(live[1]["type"], "asset_uploaded");
    assert_eq!(live[1]["payload"]["url"], "storage://assets/hero.png");
    assert_eq!(live[2], json!({"type": "status", "status": "succeeded"}));

    // Everything the stream saw live is durable too
    let stored = h.store.list_events("w1").await.unwrap();
    let types: Vec<&str> = stored.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(
        types,
        vec!["created", "research_done", "status", "asset_uploaded", "status"]
    );
    assert_eq!(
        h.store.get_workflow("w1").await.unwrap().status,
        WorkflowStatus::Succeeded
    );

    drop(stream);
    assert_eq!(h.bus.subscriber_count(NotificationKind::WorkflowUpdated), 0);
    assert_eq!(h.bus.subscriber_count(NotificationKind::WorkflowEvent), 0);
}

#[tokio::test]
async fn test_late_stream_replays_everything() {
    let h = harness().await;
    h.tracker
        .create(Workflow::with_id("w1", "draft_review"))
        .await
        .unwrap();
    h.tracker.transition("w1", WorkflowStatus::Running).await.unwrap();
    h.tracker.transition("w1", WorkflowStatus::Failed).await.unwrap();

    let mut stream = h
        .gateway
        .open_stream("w1", CancellationToken::new())
        .await
        .unwrap();
    let history = serde_json::to_value(stream.next_frame().await.unwrap()).unwrap();
    assert_eq!(history["type"], "history");
    assert_eq!(history["events"].as_array().unwrap().len(), 3);
    assert_eq!(history["events"][2]["payload"]["status"], "failed");
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_streams_keep_publish_order() {
    let h = harness().await;
    for id in ["a", "b"] {
        h.tracker.create(Workflow::with_id(id, "k")).await.unwrap();
    }

    let shutdown = CancellationToken::new();
    let mut readers = Vec::new();
    for i in 0..8 {
        let id = if i % 2 == 0 { "a" } else { "b" };
        let mut stream = h.gateway.open_stream(id, shutdown.child_token()).await.unwrap();
        stream.next_frame().await.unwrap();
        readers.push(tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(frame) = stream.next_frame().await {
                if let StreamFrame::Event {
                    event_type,
                    payload,
                    ..
                } = frame
                {
                    if event_type == "done" {
                        break;
                    }
                    seen.push(payload["n"].as_u64().unwrap());
                }
            }
            seen
        }));
    }

    let bus = h.bus.clone();
    let publisher = tokio::spawn(async move {
        for n in 0..50u64 {
            bus.publish(BusNotification::event("a", "tick", json!({"n": n})));
            bus.publish(BusNotification::event("b", "tick", json!({"n": n})));
            bus.publish(BusNotification::event("c", "tick", json!({"n": n})));
        }
        for id in ["a", "b"] {
            bus.publish(BusNotification::event(id, "done", Value::Null));
        }
    });
    publisher.await.unwrap();

    for reader in readers {
        let seen = timeout(Duration::from_secs(2), reader).await.unwrap().unwrap();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }
    assert_eq!(h.bus.subscriber_count(NotificationKind::WorkflowEvent), 0);
}
