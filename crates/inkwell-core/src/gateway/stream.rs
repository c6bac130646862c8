use super::frame::StreamFrame;
use crate::error::{Error, Result};
use crate::event_bus::{BusNotification, EventBus, NotificationKind, Subscription};
use futures::Stream;
use inkwell_store::{WorkflowEvent, WorkflowStore};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Per-connection lifecycle: `Opening -> ReplayingHistory -> Live -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Subscribing and reading history
    Opening,
    /// History fetched, `history` frame not yet taken
    ReplayingHistory,
    /// Forwarding live notifications
    Live,
    /// Unsubscribed; no more frames
    Closed,
}

/// Opens workflow streams by composing the store (replay) and the bus (live).
#[derive(Clone)]
pub struct WorkflowStreamGateway {
    store: Arc<dyn WorkflowStore>,
    bus: EventBus,
}

impl WorkflowStreamGateway {
    /// Create a gateway over a store and a bus
    #[must_use]
    pub fn new(store: Arc<dyn WorkflowStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// The bus this gateway subscribes to
    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Open a stream for `workflow_id`.
    ///
    /// Both bus handlers are registered before history is read, so nothing
    /// published during the read is lost; notifications received meanwhile are
    /// buffered and emitted after the `history` frame. An event that is both
    /// written and published while history is being read therefore arrives
    /// twice: inside `history` and again as a live frame. Clients that need
    /// exactly-once delivery should skip live events already seen in history,
    /// matching on type and payload. The handlers are owned
    /// by the returned stream (or dropped with it on error) and unsubscribe
    /// when the stream closes, is cancelled via `cancel`, or is dropped.
    ///
    /// # Errors
    ///
    /// `WorkflowNotFound` if the workflow does not exist, `StoreReadFailure`
    /// if history cannot be read.
    pub async fn open_stream(
        &self,
        workflow_id: &str,
        cancel: CancellationToken,
    ) -> Result<WorkflowStream> {
        debug!(workflow_id = %workflow_id, "Opening workflow stream");

        let (tx, receiver) = mpsc::unbounded_channel();
        let subscriptions = NotificationKind::ALL
            .iter()
            .map(|kind| self.forward(*kind, workflow_id, tx.clone()))
            .collect::<Vec<_>>();

        // The subscription guards drop with this frame on any error below
        self.store
            .get_workflow(workflow_id)
            .await
            .map_err(Error::from_read)?;
        let history = self
            .store
            .list_events(workflow_id)
            .await
            .map_err(|e| {
                warn!(workflow_id = %workflow_id, error = %e, "History replay failed");
                Error::from_read(e)
            })?;

        info!(
            workflow_id = %workflow_id,
            history_len = history.len(),
            "Workflow stream opened"
        );

        Ok(WorkflowStream {
            workflow_id: workflow_id.to_string(),
            state: StreamState::ReplayingHistory,
            history: Some(history),
            receiver,
            cancel,
            subscriptions,
        })
    }

    /// Subscribe a handler that forwards notifications for `workflow_id` only.
    fn forward(
        &self,
        kind: NotificationKind,
        workflow_id: &str,
        tx: mpsc::UnboundedSender<BusNotification>,
    ) -> Subscription {
        let wanted = workflow_id.to_string();
        self.bus.subscribe_scoped(kind, move |notification| {
            if notification.workflow_id() != wanted {
                return Ok(());
            }
            if tx.send(notification.clone()).is_err() {
                debug!(workflow_id = %wanted, "Stream receiver already closed");
            }
            Ok(())
        })
    }
}

/// An open workflow stream bound to one client connection.
///
/// Dropping the stream releases its bus handlers.
pub struct WorkflowStream {
    workflow_id: String,
    state: StreamState,
    history: Option<Vec<WorkflowEvent>>,
    receiver: mpsc::UnboundedReceiver<BusNotification>,
    cancel: CancellationToken,
    subscriptions: Vec<Subscription>,
}

impl WorkflowStream {
    /// The workflow this stream follows
    #[must_use]
    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Wait for the next frame.
    ///
    /// The first call returns the `history` frame. Later calls wait for a
    /// matching bus notification and return `None` once the stream is closed
    /// or cancelled.
    pub async fn next_frame(&mut self) -> Option<StreamFrame> {
        if let Some(events) = self.history.take() {
            self.state = StreamState::Live;
            return Some(StreamFrame::History { events });
        }
        if self.state == StreamState::Closed {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                self.close();
                None
            }
            notification = self.receiver.recv() => match notification {
                Some(notification) => Some(StreamFrame::from_notification(notification)),
                None => {
                    self.close();
                    None
                }
            },
        }
    }

    /// Unsubscribe both handlers and stop producing frames. Idempotent.
    pub fn close(&mut self) {
        if self.state == StreamState::Closed {
            return;
        }
        self.subscriptions.clear();
        self.receiver.close();
        self.history = None;
        self.state = StreamState::Closed;
        info!(workflow_id = %self.workflow_id, "Workflow stream closed");
    }

    /// Adapt into a `Stream` of frames for transports such as SSE.
    pub fn into_stream(self) -> impl Stream<Item = StreamFrame> + Send + 'static {
        futures::stream::unfold(self, |mut stream| async move {
            let frame = stream.next_frame().await?;
            Some((frame, stream))
        })
    }
}

impl Drop for WorkflowStream {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for WorkflowStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowStream")
            .field("workflow_id", &self.workflow_id)
            .field("state", &self.state)
            .finish()
    }
}
