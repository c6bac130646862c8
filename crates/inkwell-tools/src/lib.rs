//! Inkwell Tools - Tool dispatch to external backends
//!
//! This crate provides:
//! - Backend kinds and their independently configured endpoints
//! - `ToolBackend`: the single `invoke(payload)` capability every backend implements
//! - `HttpToolBackend`: the reqwest implementation of that capability
//! - `ToolDispatcher`: routes fixed tool identifiers to backends
//! - `DraftClient`: draft read/update against the draft backend

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod dispatcher;
pub mod draft;
pub mod error;

pub use backend::{BackendEndpoint, BackendKind, Credential, HttpToolBackend, ToolBackend};
pub use dispatcher::{ToolDispatcher, ToolInfo};
pub use draft::DraftClient;
pub use error::{Error, Result};

#[cfg(test)]
pub(crate) mod testing;
