//! Status transition validation.
//!
//! Encodes which transitions are legal, by whom, and what fields must
//! co-change. The validator is pure: it computes the updates accompanying an
//! approved transition and leaves persisting them to the caller, inside the
//! caller's own transaction.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::model::{Status, Task, WorkerId};

/// A requested transition, carrying the inputs that accompany it.
#[derive(Debug, Clone)]
pub enum Transition {
    /// `pending -> in_progress`: bind the task to a worker. Issued by the
    /// claimer or the admin override assigner on the worker's behalf.
    Claim { worker: WorkerId },
    /// `in_progress -> completed`: record the result. Only the current
    /// assignee may complete.
    Complete { actor: WorkerId, result: String },
}

impl Transition {
    pub fn target(&self) -> Status {
        match self {
            Transition::Claim { .. } => Status::InProgress,
            Transition::Complete { .. } => Status::Completed,
        }
    }
}

/// Field updates computed for an approved transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskChanges {
    pub status: Status,
    pub assignee: Option<WorkerId>,
    pub translator: Option<WorkerId>,
    pub result_content: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Validate `transition` against the task's current state.
///
/// Returns the field updates to persist, or `InvalidTransition` /
/// `Forbidden` when the transition table or the actor check rejects it.
pub fn validate(task: &Task, transition: &Transition, now: DateTime<Utc>) -> Result<TaskChanges> {
    let target = transition.target();
    if !task.status.can_transition_to(target) {
        return Err(Error::InvalidTransition {
            from: task.status,
            to: target,
        });
    }

    match transition {
        Transition::Claim { worker } => {
            // Pending rows never carry an assignee (invariant 1).
            if task.assignee.is_some() {
                return Err(Error::InvalidTransition {
                    from: task.status,
                    to: target,
                });
            }
            Ok(TaskChanges {
                status: Status::InProgress,
                assignee: Some(*worker),
                translator: None,
                result_content: None,
                completed_at: None,
            })
        }
        Transition::Complete { actor, result } => {
            if task.assignee != Some(*actor) {
                return Err(Error::Forbidden(
                    "only the current assignee may submit a result",
                ));
            }
            // A completed task must carry a non-empty result (invariant 2).
            if task.kind.rules().result_required && result.trim().is_empty() {
                return Err(Error::InvalidTransition {
                    from: task.status,
                    to: target,
                });
            }
            Ok(TaskChanges {
                status: Status::Completed,
                assignee: task.assignee,
                translator: Some(*actor),
                result_content: Some(result.clone()),
                completed_at: Some(now),
            })
        }
    }
}
