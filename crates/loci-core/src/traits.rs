//! Core traits for loci abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability: the note
//! collection and its change feed, and the moderation gate with its
//! remote classifier.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Coordinates, Note};

// =============================================================================
// NOTE BACKEND
// =============================================================================

/// Request for creating a new note.
///
/// Coordinates are taken as a validated pair, so a `NewNote` can only
/// carry an in-range position.
#[derive(Debug, Clone, Serialize)]
pub struct NewNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub owner_id: String,
}

impl NewNote {
    pub fn new(text: Option<String>, position: Coordinates, owner_id: impl Into<String>) -> Self {
        Self {
            text,
            latitude: position.latitude,
            longitude: position.longitude,
            owner_id: owner_id.into(),
        }
    }
}

/// The persisted note collection.
///
/// Implementations: a remote HTTP collection for production, an in-memory
/// collection for tests and embedders.
#[async_trait]
pub trait NoteBackend: Send + Sync {
    /// Fetch all notes ordered by `created_at` descending.
    async fn list_notes(&self) -> Result<Vec<Note>>;

    /// Insert a new note and return the persisted row.
    async fn insert_note(&self, note: NewNote) -> Result<Note>;

    /// Delete a note by id. Backends restrict deletion to the caller's
    /// own rows.
    async fn delete_note(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// CHANGE FEED
// =============================================================================

/// Row-level mutation kind reported by the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeEventType {
    Insert,
    Update,
    Delete,
}

impl ChangeEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeEventType::Insert => "insert",
            ChangeEventType::Update => "update",
            ChangeEventType::Delete => "delete",
        }
    }
}

/// A change notification from the backend. Carries no payload diff; any
/// event means the local cache is stale and must be reloaded in full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event_type: ChangeEventType,
    pub table: String,
}

/// A subscribable change feed over the note collection.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Open a stream of change notifications.
    ///
    /// The stream yields individual events or transport errors and ends
    /// when the backend closes the feed; the consumer decides whether to
    /// resubscribe.
    async fn subscribe(&self) -> Result<BoxStream<'static, Result<ChangeEvent>>>;
}

// =============================================================================
// MODERATION
// =============================================================================

/// Which moderation stage produced a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStage {
    /// Synchronous local heuristics (stage 1).
    Heuristic,
    /// Remote harmful/not-harmful classifier (stage 2).
    Classifier,
}

/// A rejection with its user-facing reason and originating stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
    pub stage: ModerationStage,
}

impl From<Rejection> for Error {
    fn from(r: Rejection) -> Self {
        match r.stage {
            ModerationStage::Heuristic => Error::Validation(r.reason),
            ModerationStage::Classifier => Error::Classification(r.reason),
        }
    }
}

/// Outcome of running the moderation gate over a note text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Verdict {
    Allowed,
    Rejected(Rejection),
}

impl Verdict {
    /// Rejection shorthand.
    pub fn reject(stage: ModerationStage, reason: impl Into<String>) -> Self {
        Verdict::Rejected(Rejection {
            reason: reason.into(),
            stage,
        })
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    /// The rejection reason, if rejected.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Allowed => None,
            Verdict::Rejected(r) => Some(&r.reason),
        }
    }
}

/// Raw verdict from the remote binary classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierVerdict {
    Harmful,
    Safe,
}

/// A remote harmful/not-harmful text classifier.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    /// Classify a note text. Transport, timeout, and parse failures are
    /// returned as errors; callers decide the failure posture (the gate
    /// fails closed).
    async fn classify(&self, text: &str) -> Result<ClassifierVerdict>;

    /// Model identifier, for logging.
    fn model_name(&self) -> String;
}

/// The complete moderation gate.
///
/// Infallible from the caller's perspective: classifier failures are
/// absorbed into a rejected verdict (fail-closed), never surfaced as
/// errors.
#[async_trait]
pub trait NoteValidator: Send + Sync {
    /// Validate a note text, returning the composite verdict.
    async fn validate(&self, text: &str) -> Verdict;
}
