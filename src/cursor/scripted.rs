//! Deterministic in-memory cursor
//!
//! Plays back a fixed list of steps. Used by the replay command and tests.

use super::types::CursorHandle;
use crate::error::CursorFailure;
use crate::token::ChangeDocument;
use std::collections::VecDeque;

/// One scripted cursor response
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Deliver a change document
    Event(ChangeDocument),
    /// Return an empty batch
    Idle,
    /// Raise a failure
    Fail(CursorFailure),
    /// The server reports cursor id `0`
    ///
    /// Takes effect together with the event fetched right before it, the way
    /// a server reports a closed cursor alongside its final batch.
    Close,
}

/// Cursor that plays back a script of steps
#[derive(Debug, Clone)]
pub struct ScriptedCursor {
    id: i64,
    steps: VecDeque<Step>,
    current: Option<ChangeDocument>,
    started: bool,
    advanced: bool,
}

impl ScriptedCursor {
    /// Create a cursor with the given server id and script
    pub fn new(id: i64, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            id,
            steps: steps.into_iter().collect(),
            current: None,
            started: false,
            advanced: false,
        }
    }

    /// Create a cursor that delivers the given documents and stays open
    pub fn from_events(id: i64, documents: impl IntoIterator<Item = ChangeDocument>) -> Self {
        Self::new(id, documents.into_iter().map(Step::Event))
    }

    /// Steps not yet played back
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    fn step(&mut self) -> Result<(), CursorFailure> {
        self.current = None;
        loop {
            match self.steps.pop_front() {
                None | Some(Step::Idle) => return Ok(()),
                Some(Step::Event(document)) => {
                    self.current = Some(document);
                    if self.steps.front() == Some(&Step::Close) {
                        self.steps.pop_front();
                        self.id = 0;
                    }
                    return Ok(());
                }
                Some(Step::Fail(failure)) => return Err(failure),
                Some(Step::Close) => self.id = 0,
            }
        }
    }
}

impl CursorHandle for ScriptedCursor {
    fn rewind(&mut self) -> Result<(), CursorFailure> {
        if self.advanced {
            return Err(CursorFailure::local(
                "Cursors cannot rewind after starting iteration",
            ));
        }
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.step()
    }

    fn advance(&mut self) -> Result<(), CursorFailure> {
        self.started = true;
        self.advanced = true;
        self.step()
    }

    fn current(&self) -> Option<&ChangeDocument> {
        self.current.as_ref()
    }

    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_plays_events_in_order() {
        let mut cursor =
            ScriptedCursor::from_events(42, vec![doc! { "n": 1 }, doc! { "n": 2 }]);
        assert!(!cursor.is_valid());

        cursor.rewind().unwrap();
        assert_eq!(cursor.current(), Some(&doc! { "n": 1 }));

        cursor.advance().unwrap();
        assert_eq!(cursor.current(), Some(&doc! { "n": 2 }));

        cursor.advance().unwrap();
        assert!(!cursor.is_valid());
        assert_eq!(cursor.id(), 42);
    }

    #[test]
    fn test_repeated_rewind_before_advance_is_noop() {
        let mut cursor =
            ScriptedCursor::from_events(1, vec![doc! { "n": 1 }, doc! { "n": 2 }]);
        cursor.rewind().unwrap();
        cursor.rewind().unwrap();
        assert_eq!(cursor.current(), Some(&doc! { "n": 1 }));
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn test_rewind_after_advance_fails_locally() {
        let mut cursor = ScriptedCursor::from_events(1, vec![doc! { "n": 1 }]);
        cursor.rewind().unwrap();
        cursor.advance().unwrap();
        assert!(matches!(cursor.rewind(), Err(CursorFailure::Local { .. })));
    }

    #[test]
    fn test_close_applies_with_preceding_event() {
        let mut cursor = ScriptedCursor::new(
            9,
            vec![Step::Event(doc! { "n": 1 }), Step::Close, Step::Event(doc! { "n": 2 })],
        );
        cursor.rewind().unwrap();
        assert_eq!(cursor.id(), 0);
        assert!(cursor.is_valid());

        cursor.advance().unwrap();
        assert_eq!(cursor.current(), Some(&doc! { "n": 2 }));
    }

    #[test]
    fn test_failure_clears_current() {
        let failure = CursorFailure::connection("reset");
        let mut cursor = ScriptedCursor::new(
            3,
            vec![Step::Event(doc! { "n": 1 }), Step::Fail(failure.clone())],
        );
        cursor.rewind().unwrap();
        assert_eq!(cursor.advance(), Err(failure));
        assert!(cursor.current().is_none());
    }

    #[test]
    fn test_idle_yields_no_document() {
        let mut cursor = ScriptedCursor::new(3, vec![Step::Idle, Step::Event(doc! { "n": 1 })]);
        cursor.rewind().unwrap();
        assert!(!cursor.is_valid());
        cursor.advance().unwrap();
        assert!(cursor.is_valid());
    }
}
