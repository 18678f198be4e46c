//! Cursor contracts and iteration state

use crate::error::{CursorFailure, Result};
use crate::token::{ChangeDocument, ResumeToken};
use serde::{Deserialize, Serialize};

// ============================================================================
// Consumed Contracts
// ============================================================================

/// A live server-side cursor over change documents
///
/// Implementations own batching and network I/O. Every call may block until
/// the server answers or the transport fails.
pub trait CursorHandle {
    /// Position at the first available document
    fn rewind(&mut self) -> std::result::Result<(), CursorFailure>;

    /// Move past the current document
    fn advance(&mut self) -> std::result::Result<(), CursorFailure>;

    /// Document at the current position, if any
    fn current(&self) -> Option<&ChangeDocument>;

    /// Whether a document is available at the current position
    fn is_valid(&self) -> bool {
        self.current().is_some()
    }

    /// Server cursor id; `0` once the server has closed the cursor
    fn id(&self) -> i64;
}

impl<C: CursorHandle + ?Sized> CursorHandle for Box<C> {
    fn rewind(&mut self) -> std::result::Result<(), CursorFailure> {
        (**self).rewind()
    }

    fn advance(&mut self) -> std::result::Result<(), CursorFailure> {
        (**self).advance()
    }

    fn current(&self) -> Option<&ChangeDocument> {
        (**self).current()
    }

    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }

    fn id(&self) -> i64 {
        (**self).id()
    }
}

/// Opens a fresh cursor positioned strictly after the given token
///
/// `None` is passed when no document has been delivered yet. Errors are
/// propagated to the caller as-is.
pub trait ResumeFactory<C> {
    fn resume(&mut self, token: Option<&ResumeToken>) -> Result<C>;
}

impl<C, F> ResumeFactory<C> for F
where
    F: FnMut(Option<&ResumeToken>) -> Result<C>,
{
    fn resume(&mut self, token: Option<&ResumeToken>) -> Result<C> {
        self(token)
    }
}

// ============================================================================
// Iteration State
// ============================================================================

/// Externally observable stream position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// No successful rewind or advance yet
    #[default]
    NotStarted,
    /// At least one successful rewind or advance
    Positioned,
    /// The server closed the cursor; the stream can no longer resume
    Exhausted,
}

/// Mutable bookkeeping owned by a change stream
#[derive(Debug, Clone, Default)]
pub struct IterationState {
    pub position: Position,
    /// Zero-based index of the current event
    pub key: u64,
    /// Token of the last document delivered
    pub last_resume_token: Option<ResumeToken>,
    pub has_advanced: bool,
}

impl IterationState {
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Exposed Types
// ============================================================================

/// A change event paired with its position in the stream
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub key: u64,
    pub document: ChangeDocument,
}

impl ChangeEvent {
    /// Render the document as relaxed extended JSON
    pub fn to_json(&self) -> serde_json::Value {
        bson::Bson::Document(self.document.clone()).into_relaxed_extjson()
    }
}

/// Counters for a change stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStats {
    /// Distinct changes positioned on; rewinding onto the same change again does not count
    pub events: u64,
    /// Successful cursor swaps after a resumable failure
    pub resumes: u64,
}
