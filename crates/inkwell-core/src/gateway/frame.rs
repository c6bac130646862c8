use crate::event_bus::BusNotification;
use chrono::{DateTime, Utc};
use inkwell_store::WorkflowEvent;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One record on a workflow stream.
///
/// Serialized as a flat JSON object whose `type` field is `history`, `status`,
/// or the driver-defined event type.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    /// The full stored event log, sent once when the stream opens
    History {
        /// Events in chronological order
        events: Vec<WorkflowEvent>,
    },
    /// A status change
    Status {
        /// New status
        status: String,
    },
    /// A live workflow event
    Event {
        /// Driver-defined type tag
        event_type: String,
        /// Event payload
        payload: serde_json::Value,
        /// When the frame was emitted
        created_at: DateTime<Utc>,
    },
}

impl StreamFrame {
    /// Convert a bus notification, stamping live events with the current time
    #[must_use]
    pub fn from_notification(notification: BusNotification) -> Self {
        match notification {
            BusNotification::WorkflowUpdated { status, .. } => Self::Status { status },
            BusNotification::WorkflowEvent {
                event_type,
                payload,
                ..
            } => Self::Event {
                event_type,
                payload,
                created_at: Utc::now(),
            },
        }
    }

    /// The value of the `type` discriminator
    #[must_use]
    pub fn frame_type(&self) -> &str {
        match self {
            Self::History { .. } => "history",
            Self::Status { .. } => "status",
            Self::Event { event_type, .. } => event_type,
        }
    }
}

impl Serialize for StreamFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::History { events } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "history")?;
                map.serialize_entry("events", events)?;
                map.end()
            }
            Self::Status { status } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "status")?;
                map.serialize_entry("status", status)?;
                map.end()
            }
            Self::Event {
                event_type,
                payload,
                created_at,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", event_type)?;
                map.serialize_entry("payload", payload)?;
                map.serialize_entry("created_at", created_at)?;
                map.end()
            }
        }
    }
}
