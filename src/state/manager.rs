//! Checkpoint store implementation
//!
//! Provides file-based checkpoint persistence with atomic writes.

use super::types::{Checkpoint, State};
use crate::error::{Error, Result};
use crate::token::ResumeToken;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Store for persisting and loading checkpoints
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    /// Path to the state file
    path: PathBuf,
    /// Current state (cached)
    state: State,
    /// Whether to save on every update
    auto_save: bool,
}

impl CheckpointStore {
    /// Create a new store with the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: State::new(),
            auto_save: true,
        }
    }

    /// Create a store with auto-save disabled
    pub fn without_auto_save(path: impl AsRef<Path>) -> Self {
        Self {
            auto_save: false,
            ..Self::new(path)
        }
    }

    /// Create an in-memory store (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            state: State::new(),
            auto_save: false,
        }
    }

    /// Create a store from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut store = Self::new(path);
        store.load()?;
        Ok(store)
    }

    /// Create an in-memory store from inline JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let state: State = serde_json::from_str(json)
            .map_err(|e| Error::state(format!("Failed to parse state JSON: {e}")))?;

        Ok(Self {
            state,
            ..Self::in_memory()
        })
    }

    /// Load state from file, replacing the cached state
    ///
    /// A missing file leaves the cached state untouched.
    pub fn load(&mut self) -> Result<()> {
        if self.is_in_memory() || !self.path.exists() {
            return Ok(());
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
        self.state = serde_json::from_str(&contents)
            .map_err(|e| Error::state(format!("Failed to parse state file: {e}")))?;

        Ok(())
    }

    /// Save current state to file
    pub fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }
        self.save_to_file(&self.path)
    }

    /// Save state to a specific file path
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_json_pretty()?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &contents)
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;
        fs::rename(&temp_path, path)
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!(path = %path.display(), streams = self.state.streams.len(), "Saved checkpoints");
        Ok(())
    }

    /// Export state as pretty-printed JSON string
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Get the checkpoint for a stream
    pub fn get(&self, stream: &str) -> Option<&Checkpoint> {
        self.state.get(stream)
    }

    /// Get the resume token for a stream
    pub fn resume_token(&self, stream: &str) -> Option<&ResumeToken> {
        self.state.resume_token(stream)
    }

    /// Record a checkpoint
    pub fn record(&mut self, checkpoint: Checkpoint) -> Result<()> {
        self.state.record(checkpoint);

        if self.auto_save {
            self.save()?;
        }

        Ok(())
    }

    /// Clear state for a specific stream
    pub fn clear_stream(&mut self, stream: &str) -> Result<()> {
        self.state.streams.remove(stream);

        if self.auto_save {
            self.save()?;
        }

        Ok(())
    }

    /// Clear all state
    pub fn clear(&mut self) -> Result<()> {
        self.state = State::new();

        if self.auto_save {
            self.save()?;
        }

        Ok(())
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}
