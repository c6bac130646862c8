//! Error types for inkwell-core

use inkwell_store::WorkflowStatus;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Workflow does not exist in the store
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    /// A workflow with this id already exists
    #[error("workflow already exists: {0}")]
    WorkflowExists(String),

    /// Reading history from the store failed
    #[error("store read failure: {0}")]
    StoreReadFailure(String),

    /// Status change is not a legal lifecycle step
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Current status
        from: WorkflowStatus,
        /// Requested status
        to: WorkflowStatus,
    },

    /// Store write error
    #[error("store error: {0}")]
    Store(#[from] inkwell_store::Error),
}

impl Error {
    /// Classify a store error raised while reading
    #[must_use]
    pub fn from_read(err: inkwell_store::Error) -> Self {
        match err {
            inkwell_store::Error::WorkflowNotFound(id) => Self::WorkflowNotFound(id),
            other => Self::StoreReadFailure(other.to_string()),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
