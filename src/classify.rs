//! Resume classification for cursor failures
//!
//! Decides whether a failure raised while fetching from a change stream
//! cursor may be recovered from by reopening the stream at the last resume
//! token. The policy is fixed and checked in order:
//!
//! 1. Connection failures are resumable.
//! 2. Server errors with a code in [`NON_RESUMABLE_CODES`] are fatal.
//! 3. Any other server error is resumable.
//! 4. Everything else is fatal.

use crate::error::CursorFailure;
use serde::{Deserialize, Serialize};

/// The collection was truncated past the cursor's position
pub const CAPPED_POSITION_LOST: i32 = 136;

/// The cursor was killed on the server
pub const CURSOR_KILLED: i32 = 237;

/// The operation or session was interrupted
pub const INTERRUPTED: i32 = 11601;

/// Server error codes that must never trigger a resume
pub const NON_RESUMABLE_CODES: [i32; 3] = [CAPPED_POSITION_LOST, CURSOR_KILLED, INTERRUPTED];

/// Outcome of classifying a cursor failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resumability {
    /// Reopen the stream from the last resume token and retry once
    Resumable,
    /// Propagate the failure to the caller unchanged
    Fatal,
}

impl Resumability {
    pub fn is_resumable(self) -> bool {
        self == Resumability::Resumable
    }
}

impl std::fmt::Display for Resumability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resumability::Resumable => write!(f, "resumable"),
            Resumability::Fatal => write!(f, "fatal"),
        }
    }
}

/// Classify a cursor failure
pub fn classify(failure: &CursorFailure) -> Resumability {
    match failure {
        CursorFailure::Connection { .. } => Resumability::Resumable,
        CursorFailure::Server { code, .. } if NON_RESUMABLE_CODES.contains(code) => {
            Resumability::Fatal
        }
        CursorFailure::Server { .. } => Resumability::Resumable,
        CursorFailure::Local { .. } => Resumability::Fatal,
    }
}

/// Shorthand for `classify(failure).is_resumable()`
pub fn is_resumable(failure: &CursorFailure) -> bool {
    classify(failure).is_resumable()
}
