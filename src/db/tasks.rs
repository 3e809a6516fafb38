//! Task storage: creation, reads, listings, soft delete.

use crate::error::{Error, Result};
use crate::model::*;
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use uuid::Uuid;

/// Column list shared by every task select. Kept in one place so row
/// decoding in `TaskRow` stays in sync with the queries.
pub(crate) const TASK_SELECT: &str = "SELECT id, public_id, created_by, title, content, task_kind, media_url, source_language, target_language, assignee_id, translator_id, result_content, status, created_at, updated_at, completed_at, is_deleted, deleted_at FROM tasks";

impl super::Db {
    /// Create a new pending task on behalf of a requester.
    ///
    /// Validates the payload against the per-kind rules before touching
    /// storage. The task starts `pending` with no assignee.
    pub async fn create_task(&self, created_by: WorkerId, new: NewTask) -> Result<Task> {
        new.validate()?;
        if !self.worker_exists(created_by).await? {
            return Err(Error::WorkerNotFound(created_by));
        }

        let now = chrono::Utc::now();
        let public_id = Uuid::new_v4();

        let row: (i64,) = sqlx::query_as(
            "INSERT INTO tasks (public_id, created_by, title, content, task_kind, media_url, source_language, target_language, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', $9)
             RETURNING id",
        )
        .bind(public_id)
        .bind(created_by.0)
        .bind(&new.title)
        .bind(&new.content)
        .bind(new.kind.as_str())
        .bind(&new.media_url)
        .bind(&new.source_language)
        .bind(&new.target_language)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        metrics::tasks_created().add(1, &[KeyValue::new("kind", new.kind.as_str())]);
        tracing::debug!(task = row.0, requester = %created_by, "task created");

        self.get_task(TaskId(row.0)).await
    }

    /// Get a task by ID. Soft-deleted tasks are not visible.
    pub async fn get_task(&self, id: TaskId) -> Result<Task> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("{TASK_SELECT} WHERE id = $1 AND NOT is_deleted"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or(Error::TaskNotFound(id))?.into_task()
    }

    /// List tasks within a scope, newest first. Thin pass-through with no
    /// business logic; the all-tasks scope is for superusers and that check
    /// belongs to the calling layer.
    pub async fn list_tasks(&self, scope: ListScope, limit: i64, offset: i64) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = match scope {
            ListScope::CreatedBy(worker) => {
                sqlx::query_as(&format!(
                    "{TASK_SELECT} WHERE created_by = $1 AND NOT is_deleted ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
                ))
                .bind(worker.0)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            ListScope::AssignedTo(worker) => {
                sqlx::query_as(&format!(
                    "{TASK_SELECT} WHERE assignee_id = $1 AND NOT is_deleted ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
                ))
                .bind(worker.0)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            ListScope::All => {
                sqlx::query_as(&format!(
                    "{TASK_SELECT} WHERE NOT is_deleted ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// Soft-delete a task. Permitted for the owner or a superuser,
    /// regardless of status; deleted tasks disappear from every read path
    /// including the claim queue.
    pub async fn soft_delete_task(&self, id: TaskId, actor: Actor) -> Result<()> {
        let task = self.get_task(id).await?;

        if !actor.is_superuser && task.created_by != actor.id {
            return Err(Error::Forbidden(
                "only the task owner or a superuser may delete a task",
            ));
        }

        let now = chrono::Utc::now();
        sqlx::query(
            "UPDATE tasks SET is_deleted = TRUE, deleted_at = $1, updated_at = $1 WHERE id = $2",
        )
        .bind(now)
        .bind(id.0)
        .execute(&self.pool)
        .await?;

        tracing::info!(task = %id, actor = %actor.id, "task soft-deleted");
        Ok(())
    }
}

/// Internal row type for sqlx::FromRow.
#[derive(sqlx::FromRow)]
pub(crate) struct TaskRow {
    id: i64,
    public_id: Uuid,
    created_by: i64,
    title: String,
    content: String,
    task_kind: String,
    media_url: Option<String>,
    source_language: String,
    target_language: Option<String>,
    assignee_id: Option<i64>,
    translator_id: Option<i64>,
    result_content: Option<String>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: Option<chrono::DateTime<chrono::Utc>>,
    completed_at: Option<chrono::DateTime<chrono::Utc>>,
    is_deleted: bool,
    deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TaskRow {
    pub(crate) fn into_task(self) -> Result<Task> {
        Ok(Task {
            id: TaskId(self.id),
            public_id: self.public_id,
            created_by: WorkerId(self.created_by),
            title: self.title,
            content: self.content,
            kind: self.task_kind.parse()?,
            media_url: self.media_url,
            source_language: self.source_language,
            target_language: self.target_language,
            assignee: self.assignee_id.map(WorkerId),
            translator: self.translator_id.map(WorkerId),
            result_content: self.result_content,
            status: self.status.parse()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
        })
    }
}
