//! State types for tracking stream progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::token::ResumeToken;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Position of one change stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Stream name
    pub stream: String,
    /// Token of the last change delivered
    pub resume_token: ResumeToken,
    /// Key of the last change delivered
    #[serde(default)]
    pub key: u64,
    /// When the checkpoint was taken
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Create a checkpoint stamped with the current time
    pub fn new(stream: impl Into<String>, resume_token: ResumeToken, key: u64) -> Self {
        Self {
            stream: stream.into(),
            resume_token,
            key,
            updated_at: Utc::now(),
        }
    }
}

/// Checkpoints for every known stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub streams: HashMap<String, Checkpoint>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the checkpoint for a stream
    pub fn get(&self, stream: &str) -> Option<&Checkpoint> {
        self.streams.get(stream)
    }

    /// Get the resume token for a stream
    pub fn resume_token(&self, stream: &str) -> Option<&ResumeToken> {
        self.get(stream).map(|c| &c.resume_token)
    }

    /// Insert or replace a checkpoint
    pub fn record(&mut self, checkpoint: Checkpoint) {
        self.streams.insert(checkpoint.stream.clone(), checkpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn token(data: &str) -> ResumeToken {
        ResumeToken::new(doc! { "_data": data })
    }

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.streams.is_empty());
        assert!(state.get("orders").is_none());
    }

    #[test]
    fn test_record_replaces_checkpoint() {
        let mut state = State::new();
        state.record(Checkpoint::new("orders", token("a"), 0));
        state.record(Checkpoint::new("orders", token("b"), 1));

        assert_eq!(state.streams.len(), 1);
        assert_eq!(state.resume_token("orders"), Some(&token("b")));
        assert_eq!(state.get("orders").unwrap().key, 1);
    }

    #[test]
    fn test_state_serialization() {
        let mut state = State::new();
        state.record(Checkpoint::new("orders", token("826"), 4));

        let json = serde_json::to_string(&state).unwrap();
        let restored: State = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, state);
    }

    #[test]
    fn test_checkpoint_json_shape() {
        let checkpoint = Checkpoint::new("orders", token("826"), 4);
        let value = serde_json::to_value(&checkpoint).unwrap();

        assert_eq!(value["stream"], "orders");
        assert_eq!(value["resume_token"]["_data"], "826");
        assert_eq!(value["key"], 4);
        assert!(value["updated_at"].is_string());
    }
}
