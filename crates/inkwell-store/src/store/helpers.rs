//! Helper functions for store module

use crate::error::Error;
use crate::workflow::{Workflow, WorkflowEvent, WorkflowStatus};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Serialization(format!("invalid timestamp: {e}")))
}

fn parse_json(value: &str) -> Result<serde_json::Value, Error> {
    serde_json::from_str(value).map_err(|e| Error::Serialization(format!("invalid json: {e}")))
}

/// Convert a SQLite row to a Workflow
pub(crate) fn row_to_workflow(row: SqliteRow) -> Result<Workflow, Error> {
    let status_str: String = row.get("status");
    let metadata_str: String = row.get("metadata");
    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    let status: WorkflowStatus = status_str
        .parse()
        .map_err(|e: String| Error::Serialization(e))?;

    Ok(Workflow {
        id: row.get("id"),
        kind: row.get("kind"),
        status,
        metadata: parse_json(&metadata_str)?,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

/// Convert a SQLite row to a WorkflowEvent
pub(crate) fn row_to_event(row: SqliteRow) -> Result<WorkflowEvent, Error> {
    let id_str: String = row.get("id");
    let payload_str: String = row.get("payload");
    let created_at_str: String = row.get("created_at");

    let id =
        Uuid::parse_str(&id_str).map_err(|e| Error::Serialization(format!("invalid uuid: {e}")))?;

    Ok(WorkflowEvent {
        id,
        workflow_id: row.get("workflow_id"),
        event_type: row.get("event_type"),
        payload: parse_json(&payload_str)?,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

/// Get the default data directory for Inkwell
pub fn default_data_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".inkwell"))
        .unwrap_or_else(|| std::path::PathBuf::from(".inkwell"))
}

/// Get the default database path
pub fn default_db_path() -> std::path::PathBuf {
    default_data_dir().join("workflows.db")
}
