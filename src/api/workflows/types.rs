//! Request and response types for workflow endpoints

use inkwell_store::{Workflow, WorkflowEvent};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/workflows`
#[derive(Debug, Deserialize)]
pub struct CreateWorkflowRequest {
    /// Caller-chosen id; generated when absent
    #[serde(default)]
    pub id: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Body of `PUT /api/v1/workflows/:id/status`
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Body of `POST /api/v1/workflows/:id/events`
#[derive(Debug, Deserialize)]
pub struct AppendEventRequest {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// `GET /api/v1/workflows/:id`
#[derive(Debug, Serialize)]
pub struct WorkflowDetail {
    pub workflow: Workflow,
    pub events: Vec<WorkflowEvent>,
}
