//! Workflow API endpoints
//!
//! POST /api/v1/workflows - Create a workflow
//! GET  /api/v1/workflows/:id - Workflow with its event history
//! PUT  /api/v1/workflows/:id/status - Change status
//! POST /api/v1/workflows/:id/events - Append an event
//! GET  /api/v1/workflows/:id/stream - Server-Sent Events: history, then live updates

pub mod handlers;
pub mod types;


pub use handlers::{append_event, create_workflow, get_workflow, stream_workflow, update_status};
pub use types::{AppendEventRequest, CreateWorkflowRequest, UpdateStatusRequest, WorkflowDetail};

use axum::{
    routing::{get, post, put},
    Router,
};

/// Create workflow routes
pub fn workflows_routes() -> Router {
    Router::new()
        .route("/api/v1/workflows", post(create_workflow))
        .route("/api/v1/workflows/:id", get(get_workflow))
        .route("/api/v1/workflows/:id/status", put(update_status))
        .route("/api/v1/workflows/:id/events", post(append_event))
        .route("/api/v1/workflows/:id/stream", get(stream_workflow))
}
