//! Error types for inkwell-tools

use crate::backend::BackendKind;
use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Tool identifier is not in the dispatch table
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Backend could not be reached (connect, timeout, transport)
    #[error("{backend} backend unreachable: {message}")]
    BackendUnreachable {
        /// Backend that failed
        backend: BackendKind,
        /// Transport error
        message: String,
    },

    /// Backend answered with a failure status or an error payload
    #[error("{backend} backend error ({status}): {message}")]
    BackendError {
        /// Backend that failed
        backend: BackendKind,
        /// HTTP status returned by the backend
        status: u16,
        /// Message reported by the backend
        message: String,
    },

    /// Backend rejected the payload shape
    #[error("invalid payload for {backend} backend: {message}")]
    InvalidPayload {
        /// Backend that rejected the payload
        backend: BackendKind,
        /// Validation message from the backend
        message: String,
    },

    /// Client construction failed
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// HTTP status class to report this error with
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ToolNotFound(_) => 404,
            Self::BackendUnreachable { .. } | Self::BackendError { .. } => 502,
            Self::InvalidPayload { .. } => 400,
            Self::Configuration(_) => 500,
        }
    }

    /// Backend involved, if any
    #[must_use]
    pub fn backend(&self) -> Option<BackendKind> {
        match self {
            Self::BackendUnreachable { backend, .. }
            | Self::BackendError { backend, .. }
            | Self::InvalidPayload { backend, .. } => Some(*backend),
            Self::ToolNotFound(_) | Self::Configuration(_) => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
