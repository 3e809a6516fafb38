//! Core data model.
//!
//! A task is a unit of work with a lifecycle status: created by a requester,
//! claimed by exactly one worker, completed by its assignee. Actor
//! cross-references (creator, assignee, translator) are plain integer ids;
//! resolving them to full profiles is the boundary's job, not the engine's.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A unit of work tracked by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Row identifier. Assigned at creation, immutable.
    pub id: TaskId,

    /// Stable external handle, safe to hand to collaborators.
    pub public_id: Uuid,

    /// Requester who created the task. Immutable.
    pub created_by: WorkerId,

    pub title: String,

    /// The work payload. For audio tasks this is the briefing text; the
    /// recording itself lives behind `media_url`.
    pub content: String,

    /// What kind of work this is. Determines the per-kind validation rules.
    pub kind: TaskKind,

    pub media_url: Option<String>,

    /// Language the payload is in. Claim-time filtering matches workers'
    /// preferences against this.
    pub source_language: String,

    /// Requested output language. Empty for non-translation kinds.
    pub target_language: Option<String>,

    /// Worker currently holding the task. Set iff status is not pending.
    pub assignee: Option<WorkerId>,

    /// Worker who produced the result. Set on completion, normally equal to
    /// the assignee at submit time.
    pub translator: Option<WorkerId>,

    pub result_content: Option<String>,

    pub status: Status,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Newtype for task row ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(pub i64);

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for worker ids. The engine treats these as opaque; the auth
/// collaborator owns the actual identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub i64);

impl std::fmt::Display for WorkerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a task. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Waiting for a worker. No assignee.
    Pending,
    /// Claimed and bound to exactly one worker.
    InProgress,
    /// Result submitted by the assignee. Terminal.
    Completed,
}

impl Status {
    /// Can transition from self to `to`?
    ///
    /// A task is never reassigned while in progress; there is no edge back
    /// to pending and no edge out of completed.
    pub fn can_transition_to(self, to: Status) -> bool {
        use Status::*;
        matches!((self, to), (Pending, InProgress) | (InProgress, Completed))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Status::Pending),
            "in_progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            other => Err(Error::Other(format!("unknown status: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Task kind
// ---------------------------------------------------------------------------

/// What kind of work a task asks for. Each kind carries its own validation
/// rules, consulted at creation and by the transition validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Translate `content` from the source to the target language.
    TextTranslation,
    /// Transcribe the recording behind `media_url`.
    AudioTranscription,
}

/// Per-kind validation rules.
#[derive(Debug, Clone, Copy)]
pub struct KindRules {
    /// A media URL must be present at creation.
    pub media_required: bool,
    /// A non-empty text result must accompany completion.
    pub result_required: bool,
}

impl TaskKind {
    pub fn rules(self) -> KindRules {
        match self {
            TaskKind::TextTranslation => KindRules {
                media_required: false,
                result_required: true,
            },
            TaskKind::AudioTranscription => KindRules {
                media_required: true,
                result_required: true,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskKind::TextTranslation => "text_translation",
            TaskKind::AudioTranscription => "audio_transcription",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text_translation" => Ok(TaskKind::TextTranslation),
            "audio_transcription" => Ok(TaskKind::AudioTranscription),
            other => Err(Error::Other(format!("unknown task kind: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// An authenticated caller, as supplied per call by the auth collaborator.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: WorkerId,
    pub is_superuser: bool,
}

// ---------------------------------------------------------------------------
// Listing scope
// ---------------------------------------------------------------------------

/// Which slice of the task table a listing covers. The all-tasks scope is
/// meant for superusers; enforcing that is the calling layer's job.
#[derive(Debug, Clone, Copy)]
pub enum ListScope {
    CreatedBy(WorkerId),
    AssignedTo(WorkerId),
    All,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for creating new tasks. The engine's public API for task creation.
pub struct NewTask {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) kind: TaskKind,
    pub(crate) source_language: String,
    pub(crate) target_language: Option<String>,
    pub(crate) media_url: Option<String>,
}

impl NewTask {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        source_language: impl Into<String>,
        kind: TaskKind,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            kind,
            source_language: source_language.into(),
            target_language: None,
            media_url: None,
        }
    }

    pub fn target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = Some(language.into());
        self
    }

    pub fn media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    /// Check structural validity against the per-kind rules.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.title.len() < 2 || self.title.len() > 255 {
            return Err(Error::InvalidTask(
                "title must be between 2 and 255 characters".to_string(),
            ));
        }
        if self.content.is_empty() {
            return Err(Error::InvalidTask("content must not be empty".to_string()));
        }
        if self.source_language.trim().is_empty() {
            return Err(Error::InvalidTask(
                "source language must not be empty".to_string(),
            ));
        }
        if self.kind.rules().media_required && self.media_url.is_none() {
            return Err(Error::InvalidTask(format!(
                "{} tasks require a media URL",
                self.kind
            )));
        }
        Ok(())
    }
}
