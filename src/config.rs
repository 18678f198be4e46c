//! Replay scenario configuration
//!
//! Scenarios describe a sequence of scripted cursors in YAML. The first
//! cursor is the one the stream opens with; each later cursor is handed out
//! when the stream resumes.
//!
//! ```yaml
//! stream: orders
//! cursors:
//!   - id: 101
//!     steps:
//!       - type: event
//!         document: { _id: { _data: "01" }, operationType: insert }
//!       - type: fail
//!         kind: connection
//!         message: connection reset by peer
//!   - id: 102
//!     steps:
//!       - type: event
//!         document: { _id: { _data: "02" }, operationType: delete }
//!       - type: close
//! ```

use crate::cursor::{ScriptedCursor, Step};
use crate::error::{CursorFailure, Error, Result};
use crate::token::ResumeToken;
use bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

// ============================================================================
// Top-Level Replay Config
// ============================================================================

/// A replay scenario loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Stream name, used as the checkpoint key
    #[serde(default = "default_stream")]
    pub stream: String,

    /// Resume token to open the stream after
    #[serde(default)]
    pub resume_after: Option<Value>,

    /// Cursors in the order they are opened
    #[serde(default)]
    pub cursors: Vec<CursorScript>,
}

fn default_stream() -> String {
    "default".to_string()
}

impl ReplayConfig {
    /// Check the scenario for structural problems
    pub fn validate(&self) -> Result<()> {
        if self.stream.trim().is_empty() {
            return Err(Error::config("stream name must not be empty"));
        }
        if self.cursors.is_empty() {
            return Err(Error::config("scenario must define at least one cursor"));
        }
        if let Some(index) = self.cursors.iter().position(|c| c.id == 0) {
            return Err(Error::config(format!(
                "cursor #{index} has id 0; use a `close` step to model a closed cursor"
            )));
        }
        Ok(())
    }

    /// The configured start token, if any
    pub fn resume_token(&self) -> Result<Option<ResumeToken>> {
        self.resume_after
            .as_ref()
            .map(|value| json_to_document(value, "resume_after").map(ResumeToken::new))
            .transpose()
    }

    /// Build every scripted cursor, in order
    pub fn build_cursors(&self) -> Result<Vec<ScriptedCursor>> {
        self.cursors.iter().map(CursorScript::build).collect()
    }
}

// ============================================================================
// Cursor Scripts
// ============================================================================

/// One scripted cursor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorScript {
    /// Server cursor id reported until a `close` step
    pub id: i64,

    #[serde(default)]
    pub steps: Vec<StepDef>,
}

impl CursorScript {
    pub fn build(&self) -> Result<ScriptedCursor> {
        let steps = self
            .steps
            .iter()
            .map(StepDef::to_step)
            .collect::<Result<Vec<_>>>()?;
        Ok(ScriptedCursor::new(self.id, steps))
    }
}

/// Step definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDef {
    /// Deliver a change document
    Event { document: Value },
    /// Return an empty batch
    Idle,
    /// Raise a cursor failure
    Fail {
        kind: FailureKind,
        #[serde(default)]
        code: Option<i32>,
        #[serde(default)]
        message: Option<String>,
    },
    /// Report cursor id 0
    Close,
}

/// Failure category for a `fail` step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Connection,
    Server,
    Local,
}

impl StepDef {
    pub fn to_step(&self) -> Result<Step> {
        match self {
            StepDef::Event { document } => Ok(Step::Event(json_to_document(document, "event")?)),
            StepDef::Idle => Ok(Step::Idle),
            StepDef::Close => Ok(Step::Close),
            StepDef::Fail {
                kind,
                code,
                message,
            } => {
                let message = message.clone().unwrap_or_else(|| "scripted failure".to_string());
                let failure = match (kind, code) {
                    (FailureKind::Connection, None) => CursorFailure::connection(message),
                    (FailureKind::Connection, Some(code)) => {
                        CursorFailure::connection_with_code(*code, message)
                    }
                    (FailureKind::Server, Some(code)) => CursorFailure::server(*code, message),
                    (FailureKind::Server, None) => {
                        return Err(Error::config("server failures require a `code`"))
                    }
                    (FailureKind::Local, _) => CursorFailure::local(message),
                };
                Ok(Step::Fail(failure))
            }
        }
    }
}

fn json_to_document(value: &Value, what: &str) -> Result<Document> {
    match bson::to_bson(value)? {
        Bson::Document(document) => Ok(document),
        other => Err(Error::config(format!(
            "{what} must be a document, found {:?}",
            other.element_type()
        ))),
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate a replay scenario from a YAML file
pub fn load_replay_config(path: impl AsRef<Path>) -> Result<ReplayConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read scenario file '{}': {}",
            path.display(),
            e
        ))
    })?;
    load_replay_config_from_str(&content)
}

/// Parse and validate a replay scenario from a YAML string
pub fn load_replay_config_from_str(yaml: &str) -> Result<ReplayConfig> {
    let config: ReplayConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}
