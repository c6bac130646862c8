use serde::Serialize;

/// The two fixed bus channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NotificationKind {
    /// Status change of a workflow (`workflow:updated`)
    #[serde(rename = "workflow:updated")]
    WorkflowUpdated,
    /// Arbitrary typed workflow event (`workflow:event`)
    #[serde(rename = "workflow:event")]
    WorkflowEvent,
}

impl NotificationKind {
    /// Every kind, in a stable order.
    pub const ALL: [NotificationKind; 2] = [Self::WorkflowUpdated, Self::WorkflowEvent];

    /// Returns the channel name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkflowUpdated => "workflow:updated",
            Self::WorkflowEvent => "workflow:event",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transient notification carried over the bus.
///
/// Status is an opaque string here; the bus does not interpret it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BusNotification {
    /// A workflow's status changed
    WorkflowUpdated {
        /// Workflow identifier
        workflow_id: String,
        /// New status
        status: String,
    },
    /// A workflow event was recorded
    WorkflowEvent {
        /// Workflow identifier
        workflow_id: String,
        /// Driver-defined event type
        #[serde(rename = "type")]
        event_type: String,
        /// Event payload
        payload: serde_json::Value,
    },
}

impl BusNotification {
    /// Build a status-change notification
    #[must_use]
    pub fn updated(workflow_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self::WorkflowUpdated {
            workflow_id: workflow_id.into(),
            status: status.into(),
        }
    }

    /// Build a workflow-event notification
    #[must_use]
    pub fn event(
        workflow_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::WorkflowEvent {
            workflow_id: workflow_id.into(),
            event_type: event_type.into(),
            payload,
        }
    }

    /// The channel this notification is delivered on
    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::WorkflowUpdated { .. } => NotificationKind::WorkflowUpdated,
            Self::WorkflowEvent { .. } => NotificationKind::WorkflowEvent,
        }
    }

    /// Get the workflow_id from either variant.
    #[must_use]
    pub fn workflow_id(&self) -> &str {
        match self {
            Self::WorkflowUpdated { workflow_id, .. } | Self::WorkflowEvent { workflow_id, .. } => {
                workflow_id
            }
        }
    }
}
