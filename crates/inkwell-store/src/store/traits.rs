//! Trait for workflow storage backends

use crate::error::Result;
use crate::workflow::{Workflow, WorkflowEvent, WorkflowStatus};

/// Trait for workflow storage backends
///
/// Implementations must keep each workflow's events in append order and
/// reject events for workflows that do not exist.
#[async_trait::async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Create a workflow record (must be called before appending events)
    ///
    /// Fails with `WorkflowExists` if the id is taken.
    async fn create_workflow(&self, workflow: &Workflow) -> Result<()>;

    /// Move a workflow from `from` to `to` and append `event`, atomically.
    ///
    /// Fails with `StatusConflict` (and writes nothing) if the stored status
    /// is no longer `from`.
    async fn update_status(
        &self,
        id: &str,
        from: WorkflowStatus,
        to: WorkflowStatus,
        event: &WorkflowEvent,
    ) -> Result<()>;

    /// Append an event to a workflow's log
    async fn append_event(&self, event: &WorkflowEvent) -> Result<()>;

    /// Get a workflow by id
    async fn get_workflow(&self, id: &str) -> Result<Workflow>;

    /// List a workflow's events in chronological order
    async fn list_events(&self, workflow_id: &str) -> Result<Vec<WorkflowEvent>>;

    /// Get the store name (for logging)
    fn name(&self) -> &str;
}
