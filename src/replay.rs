//! Scenario replay
//!
//! Drives a [`ChangeStream`] over the scripted cursors of a
//! [`ReplayConfig`], checkpointing after every event.

use crate::config::ReplayConfig;
use crate::cursor::{ChangeEvent, ChangeStream, ScriptedCursor, StreamStats};
use crate::error::{Error, Result};
use crate::state::CheckpointStore;
use crate::token::ResumeToken;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Limits for a replay run
#[derive(Debug, Clone, Copy)]
pub struct ReplayOptions {
    /// Stop after this many events
    pub max_events: Option<usize>,
    /// Stop after this many consecutive polls without an event, not counting
    /// the first poll of a cursor reopened by a resume
    pub max_idle_polls: usize,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            max_events: None,
            max_idle_polls: 1,
        }
    }
}

/// Outcome of a replay run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub stream: String,
    pub stats: StreamStats,
    pub exhausted: bool,
    pub resume_token: Option<ResumeToken>,
}

/// Replay a scenario, passing each event to `on_event`
///
/// The stream starts after the stored checkpoint for the scenario's stream
/// if there is one, else after the scenario's `resume_after` token.
pub fn replay<F>(
    config: &ReplayConfig,
    store: &mut CheckpointStore,
    options: ReplayOptions,
    mut on_event: F,
) -> Result<ReplaySummary>
where
    F: FnMut(&ChangeEvent) -> Result<()>,
{
    config.validate()?;

    let start_after = match store.resume_token(&config.stream) {
        Some(token) => Some(token.clone()),
        None => config.resume_token()?,
    };

    let mut cursors: VecDeque<ScriptedCursor> = config.build_cursors()?.into();
    let factory = move |token: Option<&ResumeToken>| -> Result<ScriptedCursor> {
        debug!(has_token = token.is_some(), remaining = cursors.len(), "Opening scripted cursor");
        cursors
            .pop_front()
            .ok_or_else(|| Error::config("scenario has no cursor left to resume with"))
    };

    let mut stream = ChangeStream::open(factory, start_after)?;
    let mut delivered = 0usize;
    let mut idle_polls = 0usize;

    while options.max_events.map_or(true, |max| delivered < max) {
        let resumes_before = stream.stats().resumes;
        match stream.events().next() {
            Some(event) => {
                let event = event?;
                on_event(&event)?;
                if let Some(checkpoint) = stream.checkpoint(&config.stream) {
                    store.record(checkpoint)?;
                }
                delivered += 1;
                idle_polls = 0;
            }
            None => {
                if stream.is_exhausted() {
                    break;
                }
                // An empty first batch from a reopened cursor is not an idle poll
                if stream.stats().resumes > resumes_before {
                    continue;
                }
                idle_polls += 1;
                if idle_polls >= options.max_idle_polls {
                    break;
                }
            }
        }
    }

    let summary = ReplaySummary {
        stream: config.stream.clone(),
        stats: stream.stats(),
        exhausted: stream.is_exhausted(),
        resume_token: stream.resume_token().cloned(),
    };
    info!(
        stream = %summary.stream,
        events = summary.stats.events,
        resumes = summary.stats.resumes,
        exhausted = summary.exhausted,
        "Replay finished"
    );
    Ok(summary)
}
