//! Workflow tracker - store writes paired with bus notifications
//!
//! Drivers that run workflows use the tracker so that every durable change is
//! also announced on the bus. The store write always happens first, so a
//! stream that replays history afterwards already contains it.

use crate::error::{Error, Result};
use crate::event_bus::{BusNotification, EventBus};
use inkwell_store::{Workflow, WorkflowEvent, WorkflowStatus, WorkflowStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Event type recorded when a workflow is created
pub const EVENT_CREATED: &str = "created";
/// Event type recorded on every status change
pub const EVENT_STATUS: &str = "status";

/// Records workflow lifecycle changes and publishes the matching notifications
#[derive(Clone)]
pub struct WorkflowTracker {
    store: Arc<dyn WorkflowStore>,
    bus: EventBus,
}

impl WorkflowTracker {
    /// Create a tracker over a store and a bus
    #[must_use]
    pub fn new(store: Arc<dyn WorkflowStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// The underlying store
    #[must_use]
    pub fn store(&self) -> &Arc<dyn WorkflowStore> {
        &self.store
    }

    /// Persist a new workflow and record its `created` event
    #[instrument(skip(self, workflow), fields(workflow_id = %workflow.id))]
    pub async fn create(&self, workflow: Workflow) -> Result<Workflow> {
        self.store
            .create_workflow(&workflow)
            .await
            .map_err(|e| match e {
                inkwell_store::Error::WorkflowExists(id) => Error::WorkflowExists(id),
                other => Error::Store(other),
            })?;
        self.record(
            &workflow.id,
            EVENT_CREATED,
            serde_json::json!({ "kind": workflow.kind }),
        )
        .await?;

        info!(kind = %workflow.kind, "Workflow created");
        Ok(workflow)
    }

    /// Move a workflow to `status`.
    ///
    /// The store applies the change as a compare-and-set against the status
    /// read here, together with the `status` event. If another writer moved
    /// the workflow in between, the check is repeated against the new status.
    ///
    /// # Errors
    ///
    /// `WorkflowNotFound` for an unknown id, `InvalidTransition` when the
    /// lifecycle does not allow the step.
    #[instrument(skip(self))]
    pub async fn transition(&self, workflow_id: &str, status: WorkflowStatus) -> Result<Workflow> {
        let mut workflow = self
            .store
            .get_workflow(workflow_id)
            .await
            .map_err(Error::from_read)?;

        loop {
            let from = workflow.status;
            if !from.can_transition_to(status) {
                return Err(Error::InvalidTransition { from, to: status });
            }

            let event = WorkflowEvent::new(workflow_id, EVENT_STATUS)
                .with_payload(serde_json::json!({ "status": status.as_str() }));
            match self
                .store
                .update_status(workflow_id, from, status, &event)
                .await
            {
                Ok(()) => break,
                Err(inkwell_store::Error::StatusConflict { actual, .. }) => {
                    debug!(expected = %from, actual = %actual, "Status changed concurrently");
                    workflow.status = actual;
                }
                Err(inkwell_store::Error::WorkflowNotFound(id)) => {
                    return Err(Error::WorkflowNotFound(id));
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.bus
            .publish(BusNotification::updated(workflow_id, status.as_str()));

        info!(from = %workflow.status, to = %status, "Workflow status changed");
        workflow.status = status;
        Ok(workflow)
    }

    /// Append a driver-defined event and publish it
    #[instrument(skip(self, payload))]
    pub async fn record(
        &self,
        workflow_id: &str,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<WorkflowEvent> {
        let event = WorkflowEvent::new(workflow_id, event_type).with_payload(payload);
        self.store.append_event(&event).await.map_err(|e| match e {
            inkwell_store::Error::WorkflowNotFound(id) => Error::WorkflowNotFound(id),
            other => Error::Store(other),
        })?;

        self.bus.publish(BusNotification::event(
            workflow_id,
            event_type,
            event.payload.clone(),
        ));
        Ok(event)
    }
}

#[cfg(test)]
mod tests;
