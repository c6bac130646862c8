use axum::{
    extract::Path,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Extension, Json,
};
use futures::StreamExt;
use inkwell_core::{Error as CoreError, WorkflowStreamGateway, WorkflowTracker};
use inkwell_store::{Workflow, WorkflowStatus, WorkflowStore};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::super::response::ApiResponse;
use super::types::{AppendEventRequest, CreateWorkflowRequest, UpdateStatusRequest, WorkflowDetail};

/// Interval between SSE keep-alive comments
const KEEP_ALIVE_SECS: u64 = 15;

fn error_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::WorkflowNotFound(_) => StatusCode::NOT_FOUND,
        CoreError::InvalidTransition { .. } | CoreError::WorkflowExists(_) => StatusCode::CONFLICT,
        CoreError::Store(inner) if inner.is_not_found() => StatusCode::NOT_FOUND,
        CoreError::StoreReadFailure(_) | CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: CoreError) -> Response {
    (
        error_status(&err),
        Json(ApiResponse::<()>::error(err.to_string())),
    )
        .into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error(message)),
    )
        .into_response()
}

/// Create a workflow (status `pending`) and record its `created` event
pub async fn create_workflow(
    Extension(tracker): Extension<WorkflowTracker>,
    Json(request): Json<CreateWorkflowRequest>,
) -> Response {
    if request.kind.trim().is_empty() {
        return bad_request("workflow kind must not be empty");
    }

    let mut workflow = match request.id {
        Some(id) if id.trim().is_empty() => return bad_request("workflow id must not be empty"),
        Some(id) => Workflow::with_id(id, request.kind),
        None => Workflow::new(request.kind),
    };
    if !request.metadata.is_null() {
        workflow = workflow.with_metadata(request.metadata);
    }

    match tracker.create(workflow).await {
        Ok(workflow) => (StatusCode::CREATED, Json(ApiResponse::success(workflow))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Get a workflow and its full event history
pub async fn get_workflow(
    Extension(store): Extension<Arc<dyn WorkflowStore>>,
    Path(id): Path<String>,
) -> Response {
    let workflow = match store.get_workflow(&id).await {
        Ok(w) => w,
        Err(e) => return error_response(CoreError::from_read(e)),
    };
    let events = match store.list_events(&id).await {
        Ok(events) => events,
        Err(e) => return error_response(CoreError::from_read(e)),
    };

    Json(WorkflowDetail { workflow, events }).into_response()
}

/// Move a workflow to a new status
pub async fn update_status(
    Extension(tracker): Extension<WorkflowTracker>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Response {
    let status: WorkflowStatus = match request.status.parse() {
        Ok(status) => status,
        Err(e) => return bad_request(e),
    };

    match tracker.transition(&id, status).await {
        Ok(workflow) => Json(ApiResponse::success(workflow)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Append a driver-defined event and publish it to live streams
pub async fn append_event(
    Extension(tracker): Extension<WorkflowTracker>,
    Path(id): Path<String>,
    Json(request): Json<AppendEventRequest>,
) -> Response {
    if request.event_type.trim().is_empty() {
        return bad_request("event type must not be empty");
    }

    match tracker
        .record(&id, &request.event_type, request.payload)
        .await
    {
        Ok(event) => (StatusCode::CREATED, Json(ApiResponse::success(event))).into_response(),
        Err(e) => error_response(e),
    }
}

/// Stream a workflow: one `history` frame, then live frames until disconnect
pub async fn stream_workflow(
    Extension(gateway): Extension<WorkflowStreamGateway>,
    Extension(shutdown): Extension<CancellationToken>,
    Path(id): Path<String>,
) -> Response {
    let stream = match gateway.open_stream(&id, shutdown.child_token()).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(workflow_id = %id, error = %e, "Workflow stream rejected");
            return error_response(e);
        }
    };

    let events = stream
        .into_stream()
        .map(|frame| Event::default().json_data(&frame));

    Sse::new(events)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS)))
        .into_response()
}
