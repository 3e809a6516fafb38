//! Error types for taskpool.

use thiserror::Error;

use crate::model::{Status, TaskId, WorkerId};

#[derive(Debug, Error)]
pub enum Error {
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("worker not found: {0}")]
    WorkerNotFound(WorkerId),

    #[error("worker {0} already has a task in progress")]
    AlreadyInProgress(WorkerId),

    #[error("no available tasks")]
    NoAvailableTasks,

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("invalid task: {0}")]
    InvalidTask(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
