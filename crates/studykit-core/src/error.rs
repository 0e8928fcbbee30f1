//! Error types for content validation, grading, sessions and generation.
//!
//! Validation and generation failures are recoverable at the session
//! boundary. Grading errors mean the caller broke an invariant and are
//! never swallowed.

use thiserror::Error;

use crate::model::ContentKind;

/// Message shown to the user when content could not be produced.
pub const GENERATION_USER_MESSAGE: &str = "Could not generate content, try again.";

/// Message shown when a session cannot start because its content failed to load.
pub const LOAD_FAILED_USER_MESSAGE: &str = "Failed to load content. Try another document.";

/// Generated content does not match the shape expected for its kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{kind} content does not match the expected shape at {path}: {reason}")]
    ShapeMismatch {
        kind: ContentKind,
        path: String,
        reason: String,
    },
}

impl ValidationError {
    pub(crate) fn shape(
        kind: ContentKind,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ValidationError::ShapeMismatch {
            kind,
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            ValidationError::ShapeMismatch { path, .. } => path,
        }
    }
}

/// Grader invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeError {
    #[error("{items} items but {answers} answers")]
    LengthMismatch { items: usize, answers: usize },

    #[error("cannot grade an empty item set")]
    EmptyItemSet,
}

/// Failures while producing content from a document.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider errored or returned nothing.
    #[error("content generation failed: {0:#}")]
    GenerationFailure(anyhow::Error),

    /// The provider answered, but the content was malformed.
    #[error(transparent)]
    ShapeMismatch(#[from] ValidationError),
}

impl GenerationError {
    /// Both failure kinds get the same treatment in front of the user.
    pub fn user_message(&self) -> &'static str {
        GENERATION_USER_MESSAGE
    }
}

/// Errors raised by the test and flashcard session state machines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a session needs at least one item")]
    Empty,

    #[error("item {0} has not been answered")]
    Unanswered(usize),

    #[error("the session has already been submitted")]
    AlreadySubmitted,

    #[error("the session is finished")]
    Finished,

    #[error(transparent)]
    Grade(#[from] GradeError),
}

/// Errors raised by the matching engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchingError {
    #[error("unknown card: {0}")]
    UnknownCard(String),

    #[error("the matching session has not been started")]
    NotStarted,
}
