//! Change stream cursor module
//!
//! Resumable iteration over a server-pushed sequence of change events.
//!
//! # Overview
//!
//! The cursor module provides:
//! - `CursorHandle` - The contract a live server cursor implements
//! - `ResumeFactory` - Opens a fresh cursor after a given resume token
//! - `ChangeStream` - Iterator that resumes once per resumable failure
//! - `ScriptedCursor` - Deterministic cursor for replays and tests
//!
//! # Resume flow
//!
//! ```text
//!  rewind()/advance() ──► cursor fetch ──ok──► housekeeping ──► key, resume token
//!                              │
//!                            error
//!                              │
//!                         classify() ──fatal──► Err(failure)
//!                              │
//!                          resumable
//!                              │
//!               factory(last token) ──► new cursor.rewind() ──► housekeeping
//! ```

mod lifecycle;
mod scripted;
mod stream;
mod types;

pub use lifecycle::ResumeCapability;
pub use scripted::{ScriptedCursor, Step};
pub use stream::{ChangeStream, Events};
pub use types::{ChangeEvent, CursorHandle, IterationState, Position, ResumeFactory, StreamStats};
