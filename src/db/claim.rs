//! Atomic claim, completion, and admin override operations.
//!
//! The claim path selects the oldest pending candidate with
//! `FOR UPDATE SKIP LOCKED` and applies the validated transition inside the
//! same transaction. Which of two racing workers wins a contended row is
//! the storage engine's lock arbitration; the loser skips to the next
//! candidate instead of queuing behind the lock.

use crate::error::{Error, Result};
use crate::model::{Status, Task, TaskId, WorkerId};
use crate::telemetry::{metrics, tasks as task_spans};
use crate::transition::{self, Transition};
use opentelemetry::KeyValue;

use super::tasks::{TASK_SELECT, TaskRow};

impl super::Db {
    /// Claim the next available task for a worker.
    ///
    /// Candidates are pending tasks ordered oldest-created-first, filtered
    /// by the worker's language preferences when it has any. A filtered
    /// search that comes up empty is retried once without the filter, so a
    /// worker is never starved merely because nothing matches its stated
    /// preference. Rows locked by concurrent claimers are skipped, not
    /// waited on.
    pub async fn claim_next(&self, worker: WorkerId) -> Result<Task> {
        let started = std::time::Instant::now();
        let span = task_spans::start_claim_span(&worker);

        // Single-active-claim check: one in_progress task per worker, ever.
        if self.active_claim_count(worker).await? > 0 {
            record_claim_attempt("already_in_progress");
            return Err(Error::AlreadyInProgress(worker));
        }

        if !self.worker_exists(worker).await? {
            return Err(Error::WorkerNotFound(worker));
        }
        let languages = self.worker_languages(worker).await?;

        let mut tx = self.pool.begin().await?;

        let mut row: Option<TaskRow> = if languages.is_empty() {
            None
        } else {
            sqlx::query_as(&format!(
                "{TASK_SELECT} WHERE status = 'pending' AND NOT is_deleted AND source_language = ANY($1)
                 ORDER BY created_at, id LIMIT 1 FOR UPDATE SKIP LOCKED"
            ))
            .bind(&languages)
            .fetch_optional(&mut *tx)
            .await?
        };

        let fallback = row.is_none() && !languages.is_empty();
        if row.is_none() {
            // Unfiltered pass: the primary search for workers with no stated
            // preference, the fallback for everyone else.
            row = sqlx::query_as(&format!(
                "{TASK_SELECT} WHERE status = 'pending' AND NOT is_deleted
                 ORDER BY created_at, id LIMIT 1 FOR UPDATE SKIP LOCKED"
            ))
            .fetch_optional(&mut *tx)
            .await?;
        }

        let Some(row) = row else {
            record_claim_attempt("none");
            return Err(Error::NoAvailableTasks);
        };
        let task = row.into_task()?;

        let now = chrono::Utc::now();
        let changes = transition::validate(&task, &Transition::Claim { worker }, now)?;

        sqlx::query("UPDATE tasks SET status = $1, assignee_id = $2, updated_at = $3 WHERE id = $4")
            .bind(changes.status.as_str())
            .bind(changes.assignee.map(|w| w.0))
            .bind(now)
            .bind(task.id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        task_spans::record_claimed(&span, &task.id, fallback);
        record_claim_attempt(if fallback { "fallback" } else { "claimed" });
        metrics::task_state_transitions().add(
            1,
            &[KeyValue::new("from", "pending"), KeyValue::new("to", "in_progress")],
        );
        metrics::operation_duration_ms().record(
            started.elapsed().as_secs_f64() * 1000.0,
            &[KeyValue::new("operation", "task.claim")],
        );

        self.get_task(task.id).await
    }

    /// Submit the result for an in-progress task.
    ///
    /// Only the current assignee may submit; the task moves to `completed`
    /// with the translator, result, and completion timestamp set together.
    pub async fn submit_result(&self, id: TaskId, actor: WorkerId, result: &str) -> Result<Task> {
        let task = self.get_task(id).await?;

        let now = chrono::Utc::now();
        let changes = transition::validate(
            &task,
            &Transition::Complete {
                actor,
                result: result.to_string(),
            },
            now,
        )?;

        // Status and assignee guards in the WHERE clause keep the update
        // atomic against a concurrent writer: zero rows means the task
        // changed under us after validation.
        let rows_affected = sqlx::query(
            "UPDATE tasks SET status = $1, translator_id = $2, result_content = $3, completed_at = $4, updated_at = $4
             WHERE id = $5 AND status = 'in_progress' AND assignee_id = $6",
        )
        .bind(changes.status.as_str())
        .bind(changes.translator.map(|w| w.0))
        .bind(&changes.result_content)
        .bind(now)
        .bind(id.0)
        .bind(actor.0)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(Error::InvalidTransition {
                from: Status::InProgress,
                to: Status::Completed,
            });
        }

        tracing::info!(task = %id, translator = %actor, "result submitted");
        metrics::task_state_transitions().add(
            1,
            &[KeyValue::new("from", "in_progress"), KeyValue::new("to", "completed")],
        );

        self.get_task(id).await
    }

    /// Directly assign a specific pending task to a specific worker.
    ///
    /// The privileged escape hatch for manual load balancing: same
    /// transition as a claim, but bypassing queue ordering and language
    /// filtering. Superuser enforcement belongs to the calling layer; the
    /// admin id is taken for the audit trail.
    pub async fn admin_assign(
        &self,
        admin: WorkerId,
        task_id: TaskId,
        worker: WorkerId,
    ) -> Result<Task> {
        let mut tx = self.pool.begin().await?;

        // Plain FOR UPDATE here: the admin targets one row and should wait
        // out a concurrent claimer rather than skip.
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "{TASK_SELECT} WHERE id = $1 AND NOT is_deleted FOR UPDATE"
        ))
        .bind(task_id.0)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(Error::TaskNotFound(task_id));
        };
        let task = row.into_task()?;

        if task.status != Status::Pending {
            return Err(Error::InvalidTransition {
                from: task.status,
                to: Status::InProgress,
            });
        }
        if !self.worker_exists(worker).await? {
            return Err(Error::WorkerNotFound(worker));
        }
        if self.active_claim_count(worker).await? > 0 {
            return Err(Error::AlreadyInProgress(worker));
        }

        let now = chrono::Utc::now();
        let changes = transition::validate(&task, &Transition::Claim { worker }, now)?;

        sqlx::query("UPDATE tasks SET status = $1, assignee_id = $2, updated_at = $3 WHERE id = $4")
            .bind(changes.status.as_str())
            .bind(changes.assignee.map(|w| w.0))
            .bind(now)
            .bind(task_id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(admin = %admin, task = %task_id, worker = %worker, "task assigned by admin override");
        metrics::task_state_transitions().add(
            1,
            &[KeyValue::new("from", "pending"), KeyValue::new("to", "in_progress")],
        );

        self.get_task(task_id).await
    }

    /// Count of in-progress tasks held by a worker. Zero or one when the
    /// single-active-claim invariant holds.
    async fn active_claim_count(&self, worker: WorkerId) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE assignee_id = $1 AND status = 'in_progress' AND NOT is_deleted",
        )
        .bind(worker.0)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }
}

fn record_claim_attempt(result: &'static str) {
    metrics::claim_attempts().add(1, &[KeyValue::new("result", result)]);
}
