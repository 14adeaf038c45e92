//! Serialized accumulator state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Per-session accumulator for one hook kind.
///
/// `edit_count` is the raw trigger counter (one per relevant event, repeats
/// included); `edited_files` is the deduplicated set fed into the prompt. So
/// `edit_count >= edited_files.len()`, and both reset together on dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub edit_count: u64,
    #[serde(default)]
    pub edited_files: BTreeSet<String>,
    /// Unix epoch milliseconds of the last successful spawn.
    #[serde(default)]
    pub last_dispatch_at: Option<i64>,
    #[serde(default)]
    pub dispatch_in_progress: bool,
}

impl SessionState {
    /// Zero-value state for a session that has never been seen.
    pub fn fresh(session_id: &str) -> Self {
        SessionState {
            session_id: session_id.to_string(),
            ..Default::default()
        }
    }
}
