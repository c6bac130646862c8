use super::types::{BusNotification, NotificationKind};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error, warn};

/// Outcome of a single handler invocation. Errors are logged, never propagated.
pub type HandlerResult = anyhow::Result<()>;

type Handler = Arc<dyn Fn(&BusNotification) -> HandlerResult + Send + Sync>;

/// Identifies one registered handler; pass it to [`EventBus::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    kind: NotificationKind,
    id: u64,
}

impl SubscriptionHandle {
    /// The channel this handler listens on
    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        self.kind
    }
}

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: RwLock<HashMap<NotificationKind, Vec<(u64, Handler)>>>,
}

/// In-process publish/subscribe hub for workflow notifications.
///
/// Handlers are kept per [`NotificationKind`] in registration order. `publish`
/// snapshots the handler list under the lock, releases it, then invokes every
/// handler on the calling task. Handlers may therefore subscribe or
/// unsubscribe from inside a callback without deadlocking, and a handler that
/// has been unsubscribed is never part of a later snapshot.
///
/// Cloning is cheap; all clones share one registry.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field(
                "workflow_updated",
                &self.subscriber_count(NotificationKind::WorkflowUpdated),
            )
            .field(
                "workflow_event",
                &self.subscriber_count(NotificationKind::WorkflowEvent),
            )
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`.
    ///
    /// The handler stays registered until [`Self::unsubscribe`] is called with
    /// the returned handle.
    pub fn subscribe<F>(&self, kind: NotificationKind, handler: F) -> SubscriptionHandle
    where
        F: Fn(&BusNotification) -> HandlerResult + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));

        debug!(kind = %kind, subscription_id = id, "Bus handler subscribed");
        SubscriptionHandle { kind, id }
    }

    /// Register `handler` and return a guard that unsubscribes it on drop.
    #[must_use]
    pub fn subscribe_scoped<F>(&self, kind: NotificationKind, handler: F) -> Subscription
    where
        F: Fn(&BusNotification) -> HandlerResult + Send + Sync + 'static,
    {
        let handle = self.subscribe(kind, handler);
        Subscription {
            bus: self.clone(),
            handle: Some(handle),
        }
    }

    /// Remove a handler. Idempotent: removing twice is a no-op.
    ///
    /// Returns `true` if the handler was still registered.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        let mut listeners = self
            .registry
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(handlers) = listeners.get_mut(&handle.kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != handle.id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            listeners.remove(&handle.kind);
        }

        if removed {
            debug!(kind = %handle.kind, subscription_id = handle.id, "Bus handler unsubscribed");
        }
        removed
    }

    /// Deliver `notification` to every handler currently registered for its kind.
    ///
    /// Returns the number of handlers invoked. With no handlers the
    /// notification is dropped. A failing or panicking handler is logged and
    /// does not stop delivery to the rest.
    pub fn publish(&self, notification: BusNotification) -> usize {
        let kind = notification.kind();
        let snapshot: Vec<(u64, Handler)> = self
            .registry
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        debug!(
            kind = %kind,
            workflow_id = %notification.workflow_id(),
            listeners = snapshot.len(),
            "Publishing bus notification"
        );

        for (id, handler) in &snapshot {
            match catch_unwind(AssertUnwindSafe(|| handler(&notification))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(kind = %kind, subscription_id = id, error = %e, "Bus handler failed");
                }
                Err(panic) => {
                    error!(
                        kind = %kind,
                        subscription_id = id,
                        panic = %panic_message(panic.as_ref()),
                        "Bus handler panicked"
                    );
                }
            }
        }

        snapshot.len()
    }

    /// Number of handlers currently registered for `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: NotificationKind) -> usize {
        self.registry
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Guard returned by [`EventBus::subscribe_scoped`].
///
/// Unsubscribes on drop, so every exit path of the owner releases the handler.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    bus: EventBus,
    handle: Option<SubscriptionHandle>,
}

impl Subscription {
    /// The underlying handle
    #[must_use]
    pub fn handle(&self) -> Option<SubscriptionHandle> {
        self.handle
    }

    /// Unsubscribe now. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.bus.unsubscribe(handle);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("handle", &self.handle)
            .finish()
    }
}
