//! Resumable change stream
//!
//! Wraps a [`CursorHandle`] and transparently reopens it through a
//! [`ResumeFactory`] when a fetch fails with a resumable error. At most one
//! resume is attempted per failure; a failure on the reopened cursor is
//! returned to the caller.

use super::lifecycle::ResumeCapability;
use super::types::{
    ChangeEvent, CursorHandle, IterationState, Position, ResumeFactory, StreamStats,
};
use crate::classify::classify;
use crate::error::{CursorFailure, Error, Result};
use crate::state::Checkpoint;
use crate::token::{extract_resume_token, ChangeDocument, ResumeToken};
use tracing::{debug, info, warn};

/// Change stream iterator that survives transient cursor failures
#[derive(Debug)]
pub struct ChangeStream<C> {
    cursor: C,
    resume: ResumeCapability<C>,
    state: IterationState,
    /// Token the stream was opened after, used until a document is delivered
    start_token: Option<ResumeToken>,
    stats: StreamStats,
}

impl<C: CursorHandle> ChangeStream<C> {
    /// Create a stream over an already opened cursor
    pub fn new(cursor: C, factory: impl ResumeFactory<C> + 'static) -> Self {
        Self {
            cursor,
            resume: ResumeCapability::armed(factory),
            state: IterationState::new(),
            start_token: None,
            stats: StreamStats::default(),
        }
    }

    /// Open the initial cursor through the factory
    ///
    /// With `start_after` set (e.g. from a stored checkpoint) the stream
    /// continues after that token, and resumes from it until the first
    /// document arrives.
    pub fn open(
        mut factory: impl ResumeFactory<C> + 'static,
        start_after: Option<ResumeToken>,
    ) -> Result<Self> {
        let cursor = factory.resume(start_after.as_ref())?;
        let mut stream = Self::new(cursor, factory);
        stream.start_token = start_after;
        Ok(stream)
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Position at the first available change
    pub fn rewind(&mut self) -> Result<()> {
        match self.cursor.rewind() {
            Ok(()) => self.on_positioned(false, false),
            Err(failure) => self.resume_after(failure, false),
        }
    }

    /// Move to the next change
    pub fn advance(&mut self) -> Result<()> {
        match self.cursor.advance() {
            Ok(()) => self.on_positioned(true, false),
            Err(failure) => self.resume_after(failure, true),
        }
    }

    /// Whether a change is available at the current position
    pub fn is_valid(&self) -> bool {
        self.cursor.is_valid()
    }

    /// The change at the current position
    pub fn current(&self) -> Option<&ChangeDocument> {
        if self.is_valid() {
            self.cursor.current()
        } else {
            None
        }
    }

    /// Index of the current change
    pub fn key(&self) -> Option<u64> {
        self.is_valid().then_some(self.state.key)
    }

    /// Id of the cursor currently held
    pub fn cursor_id(&self) -> i64 {
        self.cursor.id()
    }

    /// Iterate over changes as [`ChangeEvent`]s
    ///
    /// The first pull rewinds a stream that has not started yet and advances
    /// otherwise. `None` means no change is available right now; the
    /// iterator is not fused, so pulling again polls the cursor again. After
    /// an error has been yielded the iterator ends.
    pub fn events(&mut self) -> Events<'_, C> {
        Events {
            stream: self,
            failed: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Token of the last change delivered
    pub fn resume_token(&self) -> Option<&ResumeToken> {
        self.state.last_resume_token.as_ref()
    }

    /// Token the stream was opened after, if any
    pub fn start_token(&self) -> Option<&ResumeToken> {
        self.start_token.as_ref()
    }

    pub fn position(&self) -> Position {
        self.state.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.position == Position::Exhausted
    }

    /// Whether the stream still holds its resume factory
    pub fn can_resume(&self) -> bool {
        self.resume.is_armed()
    }

    pub fn state(&self) -> &IterationState {
        &self.state
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Snapshot the current position for persistence
    pub fn checkpoint(&self, stream: &str) -> Option<Checkpoint> {
        let token = self.state.last_resume_token.clone()?;
        Some(Checkpoint::new(stream, token, self.state.key))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn resume_after(&mut self, failure: CursorFailure, is_advance: bool) -> Result<()> {
        if !classify(&failure).is_resumable() {
            debug!(error = %failure, "Non-resumable change stream error");
            return Err(failure.into());
        }

        let token = self
            .state
            .last_resume_token
            .as_ref()
            .or(self.start_token.as_ref());

        let Some(factory) = self.resume.factory_mut() else {
            debug!(error = %failure, "Change stream exhausted, not resuming");
            return Err(failure.into());
        };

        warn!(
            error = %failure,
            cursor_id = self.cursor.id(),
            has_token = token.is_some(),
            "Resumable change stream error, reopening cursor"
        );

        let cursor = factory.resume(token)?;
        self.cursor = cursor;
        self.stats.resumes += 1;

        self.cursor.rewind()?;
        self.on_positioned(is_advance, true)
    }

    /// `reopened` is set when the cursor was just swapped in by a resume
    fn on_positioned(&mut self, is_advance: bool, reopened: bool) -> Result<()> {
        if self.cursor.id() == 0 {
            self.release_resume_capability();
        }
        if self.state.position == Position::NotStarted {
            self.state.position = Position::Positioned;
        }

        if !self.cursor.is_valid() {
            return Ok(());
        }

        // Rewinding onto the change already delivered is not a new event
        let new_change = is_advance || reopened || !self.state.has_advanced;
        if is_advance && self.state.has_advanced {
            self.state.key += 1;
        }
        self.state.has_advanced = true;

        let document = self.cursor.current().ok_or_else(|| {
            Error::invalid_input("cursor reported a valid position without a document")
        })?;
        let token = extract_resume_token(document)?;
        self.state.last_resume_token = Some(token);
        if new_change {
            self.stats.events += 1;
        }

        debug!(
            key = self.state.key,
            cursor_id = self.cursor.id(),
            "Positioned on change"
        );
        Ok(())
    }

    fn release_resume_capability(&mut self) {
        if self.resume.release() {
            info!(
                events = self.stats.events,
                resumes = self.stats.resumes,
                "Change stream cursor closed by server, releasing resume capability"
            );
        }
        self.state.position = Position::Exhausted;
    }
}

/// Iterator over the changes of a [`ChangeStream`]
pub struct Events<'a, C> {
    stream: &'a mut ChangeStream<C>,
    failed: bool,
}

impl<C: CursorHandle> Iterator for Events<'_, C> {
    type Item = Result<ChangeEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let moved = if self.stream.position() == Position::NotStarted {
            self.stream.rewind()
        } else {
            self.stream.advance()
        };

        if let Err(e) = moved {
            self.failed = true;
            return Some(Err(e));
        }

        let key = self.stream.key()?;
        let document = self.stream.current()?.clone();
        Some(Ok(ChangeEvent { key, document }))
    }
}
