//! SqliteWorkflowStore - SQLite-based workflow storage

use super::helpers::{row_to_event, row_to_workflow};
use super::traits::WorkflowStore;
use crate::error::{Error, Result};
use crate::workflow::{Workflow, WorkflowEvent, WorkflowStatus};
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Workflow store persisting workflows and events to SQLite
#[derive(Clone)]
pub struct SqliteWorkflowStore {
    pool: SqlitePool,
}

impl SqliteWorkflowStore {
    /// Create a new store with the given connection pool
    ///
    /// The caller is responsible for the schema; prefer [`Self::from_path`].
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) the database at `db_path` and run migrations
    pub async fn from_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Database(format!("failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        info!("SQLite workflow store initialized at {}", db_path.display());
        Ok(store)
    }

    /// Create a new in-memory store (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        debug!("In-memory SQLite workflow store initialized");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                metadata TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        // seq gives a total append order; created_at strings are not reliably sortable
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflow_events (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                workflow_id TEXT NOT NULL,
                event_type TEXT NOT NULL,
                payload TEXT NOT NULL DEFAULT 'null',
                created_at TEXT NOT NULL,
                FOREIGN KEY (workflow_id) REFERENCES workflows(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_workflow_events_workflow
            ON workflow_events(workflow_id, seq)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!("Database migrations completed");
        Ok(())
    }

    /// Get a reference to the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl WorkflowStore for SqliteWorkflowStore {
    #[instrument(skip(self, workflow), fields(workflow_id = %workflow.id))]
    async fn create_workflow(&self, workflow: &Workflow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workflows (id, kind, status, metadata, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&workflow.id)
        .bind(&workflow.kind)
        .bind(workflow.status.as_str())
        .bind(workflow.metadata.to_string())
        .bind(workflow.created_at.to_rfc3339())
        .bind(workflow.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::WorkflowExists(workflow.id.clone())
            }
            other => Error::Database(other.to_string()),
        })?;

        debug!("Created workflow {}", workflow.id);
        Ok(())
    }

    #[instrument(skip(self, event), fields(event_id = %event.id))]
    async fn update_status(
        &self,
        id: &str,
        from: WorkflowStatus,
        to: WorkflowStatus,
        event: &WorkflowEvent,
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE workflows SET status = ?3, updated_at = ?4
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM workflows WHERE id = ?1")
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| Error::Database(e.to_string()))?;
            return Err(match current {
                None => Error::WorkflowNotFound(id.to_string()),
                Some(actual) => Error::StatusConflict {
                    id: id.to_string(),
                    expected: from,
                    actual: actual.parse().map_err(Error::Serialization)?,
                },
            });
        }

        sqlx::query(
            r#"
            INSERT INTO workflow_events (id, workflow_id, event_type, payload, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(event.id.to_string())
        .bind(id)
        .bind(&event.event_type)
        .bind(event.payload.to_string())
        .bind(event.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        debug!("Updated workflow {} status {} -> {}", id, from, to);
        Ok(())
    }

    #[instrument(skip(self, event), fields(event_id = %event.id, workflow_id = %event.workflow_id))]
    async fn append_event(&self, event: &WorkflowEvent) -> Result<()> {
        // The existence check and the insert are one statement
        let result = sqlx::query(
            r#"
            INSERT INTO workflow_events (id, workflow_id, event_type, payload, created_at)
            SELECT ?1, ?2, ?3, ?4, ?5
            WHERE EXISTS (SELECT 1 FROM workflows WHERE id = ?2)
            "#,
        )
        .bind(event.id.to_string())
        .bind(&event.workflow_id)
        .bind(&event.event_type)
        .bind(event.payload.to_string())
        .bind(event.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(Error::WorkflowNotFound(event.workflow_id.clone()));
        }

        debug!(
            "Appended {} event {} to workflow {}",
            event.event_type, event.id, event.workflow_id
        );
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_workflow(&self, id: &str) -> Result<Workflow> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, status, metadata, created_at, updated_at
            FROM workflows
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?
        .ok_or_else(|| Error::WorkflowNotFound(id.to_string()))?;

        row_to_workflow(row)
    }

    #[instrument(skip(self))]
    async fn list_events(&self, workflow_id: &str) -> Result<Vec<WorkflowEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, workflow_id, event_type, payload, created_at
            FROM workflow_events
            WHERE workflow_id = ?1
            ORDER BY seq ASC
            "#,
        )
        .bind(workflow_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(row_to_event).collect()
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
