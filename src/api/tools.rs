//! Tools API endpoints
//!
//! GET  /api/v1/tools - The fixed tool catalog
//! POST /api/v1/tools/dispatch - Invoke a tool on its backend

use axum::{
    extract::rejection::JsonRejection,
    response::{Json, Response},
    routing::{get, post},
    Extension, Router,
};
use inkwell_core::WorkflowTracker;
use inkwell_tools::{ToolDispatcher, ToolInfo};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::response::{tool_rejection, tool_reply, ApiResponse};

/// Event type recorded after a successful dispatch tied to a workflow
pub const EVENT_TOOL_RESULT: &str = "tool_result";
/// Event type recorded after a failed dispatch tied to a workflow
pub const EVENT_TOOL_ERROR: &str = "tool_error";

/// Body of `POST /api/v1/tools/dispatch`
#[derive(Debug, Deserialize)]
pub struct DispatchRequest {
    pub tool: String,
    #[serde(default)]
    pub payload: Value,
    /// When set, the outcome is recorded as an event on this workflow
    #[serde(default)]
    pub workflow_id: Option<String>,
}

/// List available tools
async fn list_tools() -> Json<ApiResponse<Vec<ToolInfo>>> {
    Json(ApiResponse::success(ToolDispatcher::catalog().to_vec()))
}

/// Dispatch a tool call
async fn dispatch_tool(
    Extension(dispatcher): Extension<ToolDispatcher>,
    Extension(tracker): Extension<WorkflowTracker>,
    request: Result<Json<DispatchRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return tool_rejection(rejection),
    };
    let result = dispatcher.dispatch(&request.tool, request.payload).await;

    if let Some(workflow_id) = &request.workflow_id {
        let (event_type, payload) = match &result {
            Ok(value) => (EVENT_TOOL_RESULT, json!({ "tool": request.tool, "result": value })),
            Err(e) => (
                EVENT_TOOL_ERROR,
                json!({ "tool": request.tool, "error": e.to_string() }),
            ),
        };
        if let Err(e) = tracker.record(workflow_id, event_type, payload).await {
            warn!(
                workflow_id = %workflow_id,
                tool = %request.tool,
                error = %e,
                "Failed to record tool outcome"
            );
        }
    }

    tool_reply(result)
}

/// Create tools routes
pub fn tools_routes() -> Router {
    Router::new()
        .route("/api/v1/tools", get(list_tools))
        .route("/api/v1/tools/dispatch", post(dispatch_tool))
}
