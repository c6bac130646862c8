//! Error types for inkwell-store

use crate::workflow::WorkflowStatus;
use thiserror::Error;

/// Store error type
#[derive(Debug, Error)]
pub enum Error {
    /// Workflow does not exist
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    /// A workflow with this id already exists
    #[error("workflow already exists: {0}")]
    WorkflowExists(String),

    /// Compare-and-set on the status lost to a concurrent writer
    #[error("workflow {id} is {actual}, expected {expected}")]
    StatusConflict {
        /// Workflow id
        id: String,
        /// Status the caller read
        expected: WorkflowStatus,
        /// Status found in the store
        actual: WorkflowStatus,
    },

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this error means the workflow is absent (as opposed to a read failure)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::WorkflowNotFound(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
