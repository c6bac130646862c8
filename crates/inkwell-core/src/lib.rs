//! Inkwell Core - Workflow Orchestration Core
//!
//! This crate provides the in-process half of workflow orchestration:
//! - EventBus: publish/subscribe hub for workflow notifications
//! - Tracker: store writes paired with matching bus notifications
//! - Gateway: per-connection history replay followed by live updates

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod event_bus;
pub mod gateway;
pub mod tracker;

pub use error::{Error, Result};
pub use event_bus::{
    BusNotification, EventBus, HandlerResult, NotificationKind, Subscription, SubscriptionHandle,
};
pub use gateway::{StreamFrame, StreamState, WorkflowStream, WorkflowStreamGateway};
pub use tracker::WorkflowTracker;

pub use inkwell_store::{Workflow, WorkflowEvent, WorkflowStatus, WorkflowStore};
