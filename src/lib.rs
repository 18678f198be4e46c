// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # Solidafy Change Stream
//!
//! A resumable change-stream cursor: iterates over server-pushed change
//! events and transparently reopens the underlying cursor from the last
//! resume token when a fetch fails with a resumable error.
//!
//! ## Features
//!
//! - **Transparent Resume**: One reopen per resumable failure, never a loop
//! - **Fixed Classification**: Connection and most server errors resume; a
//!   small deny-list of server codes and all local errors do not
//! - **Resume Token Tracking**: Validated on every step, exposed for checkpoints
//! - **Explicit Lifecycle**: The resume factory is released once the server
//!   closes the cursor
//! - **Checkpointing**: File-based resume token persistence
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_changestream::{ChangeStream, ResumeToken, Result};
//!
//! fn main() -> Result<()> {
//!     // `open_cursor` reopens the server-side stream after the given token
//!     let mut stream = ChangeStream::open(
//!         |token: Option<&ResumeToken>| open_cursor(&client, token),
//!         None,
//!     )?;
//!
//!     for event in stream.events() {
//!         let event = event?;
//!         println!("{} {}", event.key, event.document);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        ChangeStream                          │
//! │  rewind() advance() is_valid() current() key() cursor_id()   │
//! └──────────────────────────────────────────────────────────────┘
//!          │                    │                      │
//! ┌────────┴───────┬────────────┴─────────┬────────────┴────────┐
//! │  CursorHandle  │     classify()       │    ResumeFactory    │
//! ├────────────────┼──────────────────────┼─────────────────────┤
//! │ rewind/advance │ Resumable / Fatal    │ token → new cursor  │
//! │ current / id   │ deny: 136 237 11601  │ released at id 0    │
//! └────────────────┴──────────────────────┴─────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)] // TODO: Add docs before 1.0 release

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the crate
pub mod error;

/// Resume tokens and extraction
pub mod token;

/// Resumable vs fatal classification of cursor failures
pub mod classify;

/// Cursor contracts and the resumable change stream
pub mod cursor;

/// Checkpoint persistence
pub mod state;

/// Replay scenario configuration
pub mod config;

/// Scenario replay driver
pub mod replay;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use classify::{classify, Resumability};
pub use cursor::{ChangeEvent, ChangeStream, CursorHandle, Position, ResumeFactory};
pub use error::{CursorFailure, Error, Result};
pub use token::{extract_resume_token, resume_token_of, ChangeDocument, ResumeToken};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
