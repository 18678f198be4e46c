//! State management module
//!
//! Persists resume tokens so a change stream can continue where it left off
//! after a process restart.
//!
//! # Overview
//!
//! The state module provides:
//! - `Checkpoint` - Resume token and key of the last delivered change
//! - `State` - Checkpoints keyed by stream name
//! - `CheckpointStore` - File-based or in-memory persistence

mod manager;
mod types;

pub use manager::CheckpointStore;
pub use types::{Checkpoint, State};
