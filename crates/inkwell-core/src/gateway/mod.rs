//! Workflow Streaming Gateway
//!
//! Turns one workflow id into one ordered frame sequence: a single `history`
//! frame with the stored event log, then every matching bus notification as
//! it is published. The transport (SSE in the server) only serializes frames.

mod frame;
mod stream;


pub use frame::StreamFrame;
pub use stream::{StreamState, WorkflowStream, WorkflowStreamGateway};
