//! Unit tests for the status transition validator. No database required.

use chrono::Utc;
use taskpool::error::Error;
use taskpool::model::{Status, Task, TaskId, TaskKind, WorkerId};
use taskpool::transition::{Transition, validate};
use uuid::Uuid;

fn task(status: Status, assignee: Option<WorkerId>) -> Task {
    Task {
        id: TaskId(1),
        public_id: Uuid::new_v4(),
        created_by: WorkerId(10),
        title: "Product description".to_string(),
        content: "A short text to translate.".to_string(),
        kind: TaskKind::TextTranslation,
        media_url: None,
        source_language: "en".to_string(),
        target_language: Some("es".to_string()),
        assignee,
        translator: None,
        result_content: None,
        status,
        created_at: Utc::now(),
        updated_at: None,
        completed_at: None,
        is_deleted: false,
        deleted_at: None,
    }
}

// ---------------------------------------------------------------------------
// Claim: pending -> in_progress
// ---------------------------------------------------------------------------

#[test]
fn claim_binds_pending_task_to_worker() {
    let now = Utc::now();
    let worker = WorkerId(7);

    let changes = validate(
        &task(Status::Pending, None),
        &Transition::Claim { worker },
        now,
    )
    .unwrap();

    assert_eq!(changes.status, Status::InProgress);
    assert_eq!(changes.assignee, Some(worker));
    assert_eq!(changes.translator, None);
    assert_eq!(changes.result_content, None);
    assert_eq!(changes.completed_at, None);
}

#[test]
fn claim_rejected_on_in_progress_task() {
    let result = validate(
        &task(Status::InProgress, Some(WorkerId(3))),
        &Transition::Claim { worker: WorkerId(7) },
        Utc::now(),
    );

    assert!(matches!(
        result,
        Err(Error::InvalidTransition {
            from: Status::InProgress,
            to: Status::InProgress,
        })
    ));
}

#[test]
fn claim_rejected_on_completed_task() {
    let result = validate(
        &task(Status::Completed, Some(WorkerId(3))),
        &Transition::Claim { worker: WorkerId(7) },
        Utc::now(),
    );

    assert!(matches!(result, Err(Error::InvalidTransition { .. })));
}

#[test]
fn claim_rejected_when_assignee_already_set() {
    // A pending row with an assignee breaks invariant 1; refuse to build on it.
    let result = validate(
        &task(Status::Pending, Some(WorkerId(3))),
        &Transition::Claim { worker: WorkerId(7) },
        Utc::now(),
    );

    assert!(matches!(result, Err(Error::InvalidTransition { .. })));
}

// ---------------------------------------------------------------------------
// Complete: in_progress -> completed
// ---------------------------------------------------------------------------

#[test]
fn complete_sets_result_fields_together() {
    let now = Utc::now();
    let assignee = WorkerId(7);

    let changes = validate(
        &task(Status::InProgress, Some(assignee)),
        &Transition::Complete {
            actor: assignee,
            result: "Una breve descripción.".to_string(),
        },
        now,
    )
    .unwrap();

    assert_eq!(changes.status, Status::Completed);
    assert_eq!(changes.translator, Some(assignee));
    assert_eq!(
        changes.result_content.as_deref(),
        Some("Una breve descripción.")
    );
    assert_eq!(changes.completed_at, Some(now));
}

#[test]
fn complete_by_non_assignee_forbidden() {
    let result = validate(
        &task(Status::InProgress, Some(WorkerId(7))),
        &Transition::Complete {
            actor: WorkerId(8),
            result: "not mine to finish".to_string(),
        },
        Utc::now(),
    );

    assert!(matches!(result, Err(Error::Forbidden(_))));
}

#[test]
fn complete_rejected_on_pending_task() {
    let result = validate(
        &task(Status::Pending, None),
        &Transition::Complete {
            actor: WorkerId(7),
            result: "too early".to_string(),
        },
        Utc::now(),
    );

    assert!(matches!(
        result,
        Err(Error::InvalidTransition {
            from: Status::Pending,
            to: Status::Completed,
        })
    ));
}

#[test]
fn complete_rejected_on_completed_task() {
    let result = validate(
        &task(Status::Completed, Some(WorkerId(7))),
        &Transition::Complete {
            actor: WorkerId(7),
            result: "again".to_string(),
        },
        Utc::now(),
    );

    assert!(matches!(result, Err(Error::InvalidTransition { .. })));
}

#[test]
fn complete_with_empty_result_rejected() {
    let assignee = WorkerId(7);

    for empty in ["", "   ", "\n\t"] {
        let result = validate(
            &task(Status::InProgress, Some(assignee)),
            &Transition::Complete {
                actor: assignee,
                result: empty.to_string(),
            },
            Utc::now(),
        );
        assert!(
            matches!(result, Err(Error::InvalidTransition { .. })),
            "expected rejection for result {empty:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

#[test]
fn status_only_moves_forward() {
    use Status::*;

    assert!(Pending.can_transition_to(InProgress));
    assert!(InProgress.can_transition_to(Completed));

    // No skipping, no going back, no leaving completed.
    assert!(!Pending.can_transition_to(Completed));
    assert!(!InProgress.can_transition_to(Pending));
    assert!(!Completed.can_transition_to(Pending));
    assert!(!Completed.can_transition_to(InProgress));
    assert!(!Pending.can_transition_to(Pending));
    assert!(!Completed.can_transition_to(Completed));

    assert!(Completed.is_terminal());
    assert!(!Pending.is_terminal());
    assert!(!InProgress.is_terminal());
}
