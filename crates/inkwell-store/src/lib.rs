//! Inkwell Store - Workflow records and event log
//!
//! This crate provides the durable side of workflow orchestration:
//! - Workflow: workflow records, status taxonomy, and events
//! - Store: the `WorkflowStore` trait with SQLite and in-memory backends

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
pub use store::{
    default_data_dir, default_db_path, MemoryWorkflowStore, SqliteWorkflowStore, WorkflowStore,
};
pub use workflow::{Workflow, WorkflowEvent, WorkflowStatus};
