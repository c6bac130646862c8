//! Server module for Inkwell
//!
//! - `config`: configuration structures
//! - `loader`: configuration loading from files and environment
//! - `init`: component wiring and the serve loop

pub mod config;
mod init;
mod loader;

pub use init::{build_state, run};
pub use loader::load_config;
