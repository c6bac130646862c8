//! Health check endpoints with component-level diagnostics.
//!
//! Provides:
//! - `/health` — simple "healthy" + version (for load balancers)
//! - `/health/detailed` — store reachability and bus subscriber counts

use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use inkwell_core::{EventBus, NotificationKind};
use inkwell_store::WorkflowStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Id that is never created; reading it proves the store answers
const PROBE_WORKFLOW_ID: &str = "__health_probe__";

/// Simple health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Detailed health response with per-component checks
#[derive(Debug, Serialize)]
pub struct DetailedHealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub store: ComponentHealth,
    pub event_bus: ComponentHealth,
}

/// Individual component health status
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ComponentHealth {
    fn healthy(latency_ms: Option<u64>, details: serde_json::Value) -> Self {
        Self {
            status: "healthy",
            latency_ms,
            error: None,
            details: Some(details),
        }
    }

    fn unhealthy(error: String, details: serde_json::Value) -> Self {
        Self {
            status: "unhealthy",
            latency_ms: None,
            error: Some(error),
            details: Some(details),
        }
    }
}

/// Simple health check (for load balancers)
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Detailed health check with component statuses
async fn detailed_health_check(
    Extension(store): Extension<Arc<dyn WorkflowStore>>,
    Extension(bus): Extension<EventBus>,
) -> Json<DetailedHealthResponse> {
    let store_health = check_store(store.as_ref()).await;
    let event_bus_health = check_event_bus(&bus);

    let status = if store_health.status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(DetailedHealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks: HealthChecks {
            store: store_health,
            event_bus: event_bus_health,
        },
    })
}

async fn check_store(store: &dyn WorkflowStore) -> ComponentHealth {
    let details = serde_json::json!({ "name": store.name() });
    let start = Instant::now();
    match store.get_workflow(PROBE_WORKFLOW_ID).await {
        Ok(_) => ComponentHealth::healthy(Some(start.elapsed().as_millis() as u64), details),
        Err(e) if e.is_not_found() => {
            ComponentHealth::healthy(Some(start.elapsed().as_millis() as u64), details)
        }
        Err(e) => ComponentHealth::unhealthy(e.to_string(), details),
    }
}

fn check_event_bus(bus: &EventBus) -> ComponentHealth {
    let subscribers: serde_json::Map<String, serde_json::Value> = NotificationKind::ALL
        .iter()
        .map(|kind| (kind.as_str().to_string(), bus.subscriber_count(*kind).into()))
        .collect();
    ComponentHealth::healthy(None, serde_json::json!({ "subscribers": subscribers }))
}

/// Create health routes
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
}
