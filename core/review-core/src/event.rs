//! Hook input parsing.
//!
//! The host runtime writes one JSON object per invocation:
//!
//! ```json
//! {
//!   "session_id": "5f1c...",
//!   "cwd": "/home/dev/acme-api",
//!   "tool_name": "Edit",
//!   "tool_input": { "file_path": "/home/dev/acme-api/src/lib.rs" },
//!   "transcript_path": "/home/dev/.claude/projects/.../5f1c.jsonl"
//! }
//! ```
//!
//! Unknown fields are ignored; every field is optional at this layer so that a
//! partial payload parses and is then rejected by the gateway, not by serde.

use serde::Deserialize;

use crate::error::{Result, ReviewError};

/// Raw stdin payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
    #[serde(default)]
    pub transcript_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub notebook_path: Option<String>,
}

/// A validated tool-call event. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEvent {
    pub session_id: String,
    pub cwd: String,
    pub tool_name: String,
    pub file_path: String,
    pub transcript_path: Option<String>,
}

/// Parses raw stdin. Returns `Ok(None)` for empty input.
pub fn parse_stdin(raw: &str) -> Result<Option<HookInput>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(raw)
        .map(Some)
        .map_err(|source| ReviewError::Json {
            context: "parse hook input".to_string(),
            source,
        })
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl HookInput {
    /// The edited path: `tool_input.file_path`, else `tool_input.notebook_path`.
    pub fn edited_path(&self) -> Option<String> {
        let tool_input = self.tool_input.as_ref()?;
        non_empty(&tool_input.file_path).or_else(|| non_empty(&tool_input.notebook_path))
    }

    /// Validates the fields the pipeline needs.
    pub fn into_event(self) -> Result<DispatchEvent> {
        let file_path = self
            .edited_path()
            .ok_or_else(|| ReviewError::InputMalformed("missing file path".to_string()))?;
        let session_id = non_empty(&self.session_id)
            .ok_or_else(|| ReviewError::InputMalformed("missing session_id".to_string()))?;
        let cwd = non_empty(&self.cwd)
            .ok_or_else(|| ReviewError::InputMalformed("missing cwd".to_string()))?;
        let tool_name = non_empty(&self.tool_name)
            .ok_or_else(|| ReviewError::InputMalformed("missing tool_name".to_string()))?;

        Ok(DispatchEvent {
            session_id,
            cwd,
            tool_name,
            file_path,
            transcript_path: non_empty(&self.transcript_path),
        })
    }
}
