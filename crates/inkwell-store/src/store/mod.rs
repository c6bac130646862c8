//! Store - Workflow persistence
//!
//! The `WorkflowStore` trait is the narrow request/response surface the rest of
//! Inkwell uses. Two backends are provided: SQLite via sqlx (embedded, no
//! external database required) and a process-local in-memory map.

mod helpers;
mod memory;
mod sqlite;
mod traits;


pub use helpers::{default_data_dir, default_db_path};
pub use memory::MemoryWorkflowStore;
pub use sqlite::SqliteWorkflowStore;
pub use traits::WorkflowStore;
