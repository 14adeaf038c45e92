//! File-backed session state persistence.
//!
//! # Defensive Design
//!
//! The file may be missing, empty, truncated, hand-edited or written by an
//! older build. [`StateStore::load`] never fails: anything it cannot make sense
//! of becomes a fresh zero-value state, with a warning in the hook log.
//!
//! # Atomic Writes
//!
//! Uses temp file + rename so a reader never sees a half-written file.

use std::io::Write;

use fs_err as fs;
use tempfile::NamedTempFile;

use crate::error::{Result, ReviewError};
use crate::kinds::HookKind;
use crate::storage::StorageConfig;

use super::types::SessionState;

/// Load/save seam between the evaluator and persistence.
pub trait StateStore {
    /// Returns the stored state, or a fresh one if absent or unreadable.
    fn load(&self, kind: HookKind, session_id: &str) -> SessionState;

    /// Replaces the stored state with a single full-file rewrite.
    fn save(&self, kind: HookKind, session_id: &str, state: &SessionState) -> Result<()>;
}

/// One JSON file per `(kind, session)` under [`StorageConfig::state_dir`].
#[derive(Debug, Clone)]
pub struct FileStateStore {
    storage: StorageConfig,
}

impl FileStateStore {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }
}

impl StateStore for FileStateStore {
    fn load(&self, kind: HookKind, session_id: &str) -> SessionState {
        let path = self.storage.session_state_file(kind, session_id);
        if !path.exists() {
            return SessionState::fresh(session_id);
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read state file, starting fresh");
                return SessionState::fresh(session_id);
            }
        };

        if content.trim().is_empty() {
            tracing::warn!(path = %path.display(), "Empty state file, starting fresh");
            return SessionState::fresh(session_id);
        }

        match serde_json::from_str::<SessionState>(&content) {
            Ok(mut state) => {
                if state.session_id.is_empty() {
                    state.session_id = session_id.to_string();
                } else if state.session_id != session_id {
                    // Hand-edited or copied file.
                    tracing::warn!(
                        path = %path.display(),
                        stored = %state.session_id,
                        requested = %session_id,
                        "State file belongs to another session, starting fresh"
                    );
                    return SessionState::fresh(session_id);
                }
                state
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Corrupt state file, starting fresh"
                );
                SessionState::fresh(session_id)
            }
        }
    }

    fn save(&self, kind: HookKind, session_id: &str, state: &SessionState) -> Result<()> {
        let path = self.storage.session_state_file(kind, session_id);
        let write_failed = |details: String| ReviewError::StateWriteFailed {
            path: path.clone(),
            details,
        };

        let mut record = state.clone();
        record.session_id = session_id.to_string();
        let content = serde_json::to_string_pretty(&record).map_err(|source| ReviewError::Json {
            context: "serialize session state".to_string(),
            source,
        })?;

        let parent_dir = path
            .parent()
            .ok_or_else(|| write_failed("state file path has no parent directory".to_string()))?;
        fs::create_dir_all(parent_dir).map_err(|e| write_failed(e.to_string()))?;

        let mut temp_file =
            NamedTempFile::new_in(parent_dir).map_err(|e| write_failed(format!("temp file: {}", e)))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|e| write_failed(format!("write temp file: {}", e)))?;
        temp_file
            .flush()
            .map_err(|e| write_failed(format!("flush temp file: {}", e)))?;
        temp_file
            .persist(&path)
            .map_err(|e| write_failed(e.error.to_string()))?;

        Ok(())
    }
}
