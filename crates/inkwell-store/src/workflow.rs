//! Workflow - records, status taxonomy, and the append-only event log entries
//!
//! A workflow is a tracked unit of AI-assisted editorial work. Its events form
//! an immutable, append-only history that streaming clients replay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// Created, not yet started
    Pending,
    /// Driver is working on it
    Running,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed,
    /// Stopped before completion
    Cancelled,
}

impl WorkflowStatus {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Check if the workflow is terminal (succeeded, failed, or cancelled)
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Check whether moving from `self` to `next` is a legal lifecycle step.
    ///
    /// Terminal states have no outgoing transitions, and staying in the same
    /// state is not a transition.
    #[must_use]
    pub fn can_transition_to(&self, next: WorkflowStatus) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Running | Self::Cancelled | Self::Failed),
            Self::Running => matches!(next, Self::Succeeded | Self::Failed | Self::Cancelled),
            Self::Succeeded | Self::Failed | Self::Cancelled => false,
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("unknown workflow status: {s}")),
        }
    }
}

/// A workflow record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Opaque identifier
    pub id: String,

    /// Driver-defined workflow kind (e.g. "draft_review")
    pub kind: String,

    /// Current status
    pub status: WorkflowStatus,

    /// Driver-defined metadata
    pub metadata: serde_json::Value,

    /// When the workflow was created
    pub created_at: DateTime<Utc>,

    /// When the workflow was last updated
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    /// Create a new pending workflow with a generated id
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), kind)
    }

    /// Create a new pending workflow with a caller-chosen id
    #[must_use]
    pub fn with_id(id: impl Into<String>, kind: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            kind: kind.into(),
            status: WorkflowStatus::Pending,
            metadata: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// One entry of a workflow's append-only event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Unique event identifier
    pub id: Uuid,

    /// Owning workflow
    pub workflow_id: String,

    /// Free-form type tag (e.g. "status", "research_done")
    #[serde(rename = "type")]
    pub event_type: String,

    /// Arbitrary structured data
    pub payload: serde_json::Value,

    /// When the event was appended
    pub created_at: DateTime<Utc>,
}

impl WorkflowEvent {
    /// Create a new event with an empty payload
    #[must_use]
    pub fn new(workflow_id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            workflow_id: workflow_id.into(),
            event_type: event_type.into(),
            payload: serde_json::Value::Null,
            created_at: Utc::now(),
        }
    }

    /// Set the payload
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}
