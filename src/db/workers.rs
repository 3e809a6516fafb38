//! Worker registry and language preference resolution.
//!
//! The engine only needs enough of a worker record to satisfy foreign keys,
//! answer existence checks, and resolve language preferences. Everything
//! else about identity lives with the auth collaborator.

use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::model::WorkerId;

/// A registered worker.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub is_superuser: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl super::Db {
    /// Register a worker. Used by the CLI and tests; in a deployment the
    /// identity collaborator populates this table.
    pub async fn create_worker(&self, name: &str, is_superuser: bool) -> Result<Worker> {
        let row: Worker = sqlx::query_as(
            "INSERT INTO workers (name, is_superuser, created_at)
             VALUES ($1, $2, $3)
             RETURNING id, name, is_superuser, created_at",
        )
        .bind(name)
        .bind(is_superuser)
        .bind(chrono::Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn worker_exists(&self, id: WorkerId) -> Result<bool> {
        let row: (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM workers WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    /// Replace a worker's language preferences.
    pub async fn set_worker_languages(&self, id: WorkerId, languages: &[String]) -> Result<()> {
        if !self.worker_exists(id).await? {
            return Err(Error::WorkerNotFound(id));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM worker_languages WHERE worker_id = $1")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;
        for language in normalize(languages) {
            sqlx::query(
                "INSERT INTO worker_languages (worker_id, language) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(id.0)
            .bind(language)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Resolve a worker's language preferences to a normalized set.
    ///
    /// An empty result is a valid, common case: it means the worker takes
    /// tasks in any language, so the claimer must skip filtering entirely
    /// rather than matching nothing.
    pub async fn worker_languages(&self, id: WorkerId) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT language FROM worker_languages WHERE worker_id = $1 ORDER BY language",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;

        let languages: Vec<String> = rows.into_iter().map(|(l,)| l).collect();
        Ok(normalize(&languages))
    }

    pub async fn list_workers(&self, limit: i64) -> Result<Vec<Worker>> {
        let rows: Vec<Worker> = sqlx::query_as(
            "SELECT id, name, is_superuser, created_at FROM workers ORDER BY id LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// Trim, lowercase, deduplicate. The storage representation of preferences
/// (relational, comma-joined, whatever the profile collaborator exposes) is
/// irrelevant past this point; the claimer only sees comparable tokens.
fn normalize(languages: &[String]) -> Vec<String> {
    let set: BTreeSet<String> = languages
        .iter()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
        .collect();
    set.into_iter().collect()
}
