//! Storage configuration and path management.
//!
//! All path decisions live here so tests can point the whole pipeline at a
//! temp directory with [`StorageConfig::with_roots`].
//!
//! ```text
//! ~/.deep-review/
//! ├── state/
//! │   └── {kind}/{session}-{md5}.json   # SessionState, one per (kind, session)
//! └── logs/
//!     ├── review-hook.log         # hook diagnostics
//!     └── {kind}-{ulid}.log       # stdout/stderr of one dispatched agent
//! ```

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, ReviewError};
use crate::kinds::HookKind;
use crate::sanitize;

/// Overrides the data root (default `~/.deep-review`).
pub const HOME_ENV: &str = "DEEP_REVIEW_HOME";

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root directory for our own data (default: ~/.deep-review)
    root: PathBuf,
    /// Root directory for Claude Code data (default: ~/.claude). Read-only.
    claude_root: PathBuf,
}

impl StorageConfig {
    /// Resolves roots from `DEEP_REVIEW_HOME` and the user's home directory.
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().ok_or(ReviewError::HomeDirNotFound)?;
        let root = env::var_os(HOME_ENV)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".deep-review"));
        Ok(Self {
            root,
            claude_root: home.join(".claude"),
        })
    }

    /// Creates a StorageConfig with both roots injected. Used by tests.
    pub fn with_roots(root: PathBuf, claude_root: PathBuf) -> Self {
        Self { root, claude_root }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────────────────────

    /// Directory holding every session file for one hook kind.
    pub fn state_dir(&self, kind: HookKind) -> PathBuf {
        self.root.join("state").join(kind.slug())
    }

    /// Path of the state file for `(kind, session_id)`.
    ///
    /// The session id is reduced to a safe, hash-suffixed file stem first, so
    /// ids like `../../etc` stay inside [`Self::state_dir`].
    pub fn session_state_file(&self, kind: HookKind, session_id: &str) -> PathBuf {
        self.state_dir(kind)
            .join(format!("{}.json", sanitize::file_stem(session_id)))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Logs
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn hook_log_file(&self) -> PathBuf {
        self.logs_dir().join("review-hook.log")
    }

    /// Log file capturing one dispatched agent's output.
    pub fn dispatch_log_file(&self, kind: HookKind, dispatch_id: &str) -> PathBuf {
        self.logs_dir()
            .join(format!("{}-{}.log", kind.slug(), dispatch_id))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Settings (Read-Only)
    // ─────────────────────────────────────────────────────────────────────────────

    /// Claude Code's global settings file.
    pub fn global_settings_file(&self) -> PathBuf {
        self.claude_root.join("settings.json")
    }

    /// Project settings file for a working directory.
    pub fn project_settings_file(cwd: &Path) -> PathBuf {
        cwd.join(".claude").join("settings.json")
    }
}
