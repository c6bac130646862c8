//! MemoryWorkflowStore - process-local workflow storage

use super::traits::WorkflowStore;
use crate::error::{Error, Result};
use crate::workflow::{Workflow, WorkflowEvent, WorkflowStatus};
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Default)]
struct Tables {
    workflows: HashMap<String, Workflow>,
    events: HashMap<String, Vec<WorkflowEvent>>,
}

/// In-memory workflow store
///
/// Nothing survives a restart. Useful for tests and single-node demos.
#[derive(Default)]
pub struct MemoryWorkflowStore {
    tables: RwLock<Tables>,
}

impl MemoryWorkflowStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn create_workflow(&self, workflow: &Workflow) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.workflows.contains_key(&workflow.id) {
            return Err(Error::WorkflowExists(workflow.id.clone()));
        }
        tables
            .workflows
            .insert(workflow.id.clone(), workflow.clone());
        debug!("Created workflow {}", workflow.id);
        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        from: WorkflowStatus,
        to: WorkflowStatus,
        event: &WorkflowEvent,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let workflow = tables
            .workflows
            .get_mut(id)
            .ok_or_else(|| Error::WorkflowNotFound(id.to_string()))?;
        if workflow.status != from {
            return Err(Error::StatusConflict {
                id: id.to_string(),
                expected: from,
                actual: workflow.status,
            });
        }
        workflow.status = to;
        workflow.updated_at = Utc::now();
        tables
            .events
            .entry(id.to_string())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn append_event(&self, event: &WorkflowEvent) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.workflows.contains_key(&event.workflow_id) {
            return Err(Error::WorkflowNotFound(event.workflow_id.clone()));
        }
        tables
            .events
            .entry(event.workflow_id.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn get_workflow(&self, id: &str) -> Result<Workflow> {
        self.tables
            .read()
            .await
            .workflows
            .get(id)
            .cloned()
            .ok_or_else(|| Error::WorkflowNotFound(id.to_string()))
    }

    async fn list_events(&self, workflow_id: &str) -> Result<Vec<WorkflowEvent>> {
        Ok(self
            .tables
            .read()
            .await
            .events
            .get(workflow_id)
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
