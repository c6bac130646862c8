//! Web API module for Inkwell
//!
//! Provides REST API endpoints for:
//! - Workflow lookup, status changes, events, and live streaming (SSE)
//! - Tool listing and dispatch
//! - Draft read/update
//! - Health checks

pub mod drafts;
pub mod health;
pub mod response;
pub mod tools;
pub mod workflows;

use axum::{Extension, Router};
use inkwell_core::{EventBus, WorkflowStreamGateway, WorkflowTracker};
use inkwell_store::WorkflowStore;
use inkwell_tools::{DraftClient, ToolDispatcher};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub use drafts::drafts_routes;
pub use health::health_routes;
pub use response::ApiResponse;
pub use tools::tools_routes;
pub use workflows::workflows_routes;

/// Components shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WorkflowStore>,
    pub bus: EventBus,
    pub tracker: WorkflowTracker,
    pub gateway: WorkflowStreamGateway,
    pub dispatcher: ToolDispatcher,
    pub drafts: Arc<DraftClient>,
    /// Cancelled on server shutdown; streams hold child tokens
    pub shutdown: CancellationToken,
}

/// Create the router with all endpoints and their extensions
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(workflows_routes())
        .merge(tools_routes())
        .merge(drafts_routes())
        .layer(Extension(state.store))
        .layer(Extension(state.bus))
        .layer(Extension(state.tracker))
        .layer(Extension(state.gateway))
        .layer(Extension(state.dispatcher))
        .layer(Extension(state.drafts))
        .layer(Extension(state.shutdown))
}

#[cfg(test)]
pub(crate) mod testing;
