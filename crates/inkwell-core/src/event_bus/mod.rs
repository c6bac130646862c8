//! EventBus - in-process publish/subscribe hub for workflow notifications.
//!
//! Drivers publish `workflow:updated` and `workflow:event` notifications; the
//! streaming gateway and any internal listener subscribe with a handler.
//! Delivery is synchronous, best-effort, and only reaches handlers that are
//! registered at publish time.

/// Handler registry and dispatch.
pub mod bus;
/// Notification kinds and payloads.
pub mod types;

pub use bus::{EventBus, HandlerResult, Subscription, SubscriptionHandle};
pub use types::{BusNotification, NotificationKind};
