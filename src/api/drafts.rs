//! Draft API endpoints
//!
//! GET   /api/v1/drafts/:id - Read a draft from the draft backend
//! PATCH /api/v1/drafts/:id - Update a draft

use axum::{
    extract::{rejection::JsonRejection, Path},
    response::{Json, Response},
    routing::get,
    Extension, Router,
};
use inkwell_tools::DraftClient;
use serde_json::Value;
use std::sync::Arc;

use super::response::{tool_rejection, tool_reply};

async fn get_draft(
    Extension(drafts): Extension<Arc<DraftClient>>,
    Path(id): Path<String>,
) -> Response {
    tool_reply(drafts.get_draft(&id).await)
}

async fn update_draft(
    Extension(drafts): Extension<Arc<DraftClient>>,
    Path(id): Path<String>,
    patch: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Json(patch) = match patch {
        Ok(patch) => patch,
        Err(rejection) => return tool_rejection(rejection),
    };
    tool_reply(drafts.update_draft(&id, patch).await)
}

/// Create draft routes
pub fn drafts_routes() -> Router {
    Router::new().route("/api/v1/drafts/:id", get(get_draft).patch(update_draft))
}
