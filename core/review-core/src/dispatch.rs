//! Background Dispatcher.
//!
//! Builds the review prompt and launches the headless agent detached:
//!
//! ```text
//! claude -p "<prompt>" --allowedTools Read,Grep,Glob,... \
//!   --permission-mode acceptEdits --output-format text
//!   env: CLAUDE_CODE_TASK_LIST_ID=<queue>  DEEP_REVIEW_CHILD=1
//!   stdin: /dev/null   stdout+stderr: ~/.deep-review/logs/{kind}-{ulid}.log
//! ```
//!
//! The child gets its own process group and is never waited on: once `spawn`
//! returns, the hook is free to exit.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use fs_err as fs;
use ulid::Ulid;

use crate::error::{Result, ReviewError};
use crate::gateway::CHILD_ENV;
use crate::kinds::HookKind;
use crate::sanitize;
use crate::storage::StorageConfig;

/// Overrides the agent executable for every kind.
pub const AGENT_BIN_ENV: &str = "REVIEW_AGENT_BIN";

/// Environment variable the agent reads its target task list from.
pub const QUEUE_ENV: &str = "CLAUDE_CODE_TASK_LIST_ID";

/// Tools the review agent may use. Read-only plus task filing.
pub const ALLOWED_TOOLS: &str = "Read,Grep,Glob,TaskCreate,TaskList,TaskGet,TaskUpdate";

/// Files listed in one prompt; the rest are summarized as a count.
pub const MAX_PROMPT_FILES: usize = 50;

const PROMPT_TEMPLATE: &str = "\
You are a background {kind} reviewer. The files below were edited during a \
coding session that is still in progress. Do not modify any file.

{focus}

Files edited in this session:
{files}

Record every finding as a separate task in the task list \"{queueId}\". Give \
each task a short imperative title, the file and line it concerns, and why it \
matters. Skip findings that already have an open task. If nothing is worth \
reporting, create no tasks.";

/// Everything a dispatcher needs for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub kind: HookKind,
    pub session_id: String,
    pub cwd: String,
    /// Deduplicated edited paths, unsanitized.
    pub files: Vec<String>,
    /// Already sanitized queue id.
    pub queue_id: String,
}

/// Returned as soon as the spawn is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchHandle {
    pub id: String,
    pub pid: Option<u32>,
    pub log_path: Option<PathBuf>,
}

/// Fire-and-forget launch seam. Implementations must not wait for the child.
pub trait Dispatcher {
    fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchHandle>;
}

fn render_file_list(files: &[String]) -> String {
    let mut lines: Vec<String> = files
        .iter()
        .take(MAX_PROMPT_FILES)
        .map(|path| format!("- {}", sanitize::prompt_path(path)))
        .collect();
    if files.len() > MAX_PROMPT_FILES {
        lines.push(format!(
            "- ... and {} more",
            files.len() - MAX_PROMPT_FILES
        ));
    }
    lines.join("\n")
}

/// Fills the template. Both substitutions are sanitized here, whatever the
/// caller already did.
pub fn build_prompt(kind: HookKind, files: &[String], queue_id: &str) -> String {
    let queue_id = sanitize::queue_id(queue_id).unwrap_or_else(|| kind.default_queue_id().to_string());
    PROMPT_TEMPLATE
        .replace("{kind}", kind.slug())
        .replace("{focus}", kind.review_focus())
        .replace("{queueId}", &queue_id)
        .replace("{files}", &render_file_list(files))
}

/// Spawns the real headless agent.
#[derive(Debug, Clone)]
pub struct AgentDispatcher {
    storage: StorageConfig,
    program: String,
}

impl AgentDispatcher {
    pub fn new(storage: StorageConfig, program: impl Into<String>) -> Self {
        Self {
            storage,
            program: program.into(),
        }
    }

    /// `REVIEW_AGENT_BIN` if set, else the configured command.
    pub fn from_env(storage: StorageConfig, configured: &str) -> Self {
        let program = std::env::var(AGENT_BIN_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| configured.to_string());
        Self::new(storage, program)
    }

    /// Opens the per-dispatch log. Output is discarded if that fails.
    fn output_targets(&self, log_path: &Path) -> (Stdio, Stdio, Option<PathBuf>) {
        let opened = log_path
            .parent()
            .map(fs::create_dir_all)
            .transpose()
            .and_then(|_| fs::File::create(log_path))
            .and_then(|file| {
                let (stdout, _) = file.into_parts();
                let stderr = stdout.try_clone()?;
                Ok((stdout, stderr))
            });

        match opened {
            Ok((stdout, stderr)) => (
                Stdio::from(stdout),
                Stdio::from(stderr),
                Some(log_path.to_path_buf()),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Cannot open dispatch log, discarding agent output");
                (Stdio::null(), Stdio::null(), None)
            }
        }
    }
}

impl Dispatcher for AgentDispatcher {
    fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchHandle> {
        let id = Ulid::new().to_string();
        let prompt = build_prompt(request.kind, &request.files, &request.queue_id);
        let log_path = self.storage.dispatch_log_file(request.kind, &id);
        let (stdout, stderr, log_path) = self.output_targets(&log_path);

        let mut cmd = Command::new(&self.program);
        cmd.arg("-p")
            .arg(&prompt)
            .args(["--allowedTools", ALLOWED_TOOLS])
            .args(["--permission-mode", "acceptEdits"])
            .args(["--output-format", "text"])
            .env(QUEUE_ENV, &request.queue_id)
            .env(CHILD_ENV, "1")
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr);

        if Path::new(&request.cwd).is_dir() {
            cmd.current_dir(&request.cwd);
        }

        // Detach from our process group so the agent survives the hook's exit.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().map_err(|source| ReviewError::SpawnFailed {
            program: self.program.clone(),
            source,
        })?;

        tracing::info!(
            dispatch_id = %id,
            session_id = %request.session_id,
            pid = child.id(),
            queue = %request.queue_id,
            "Review agent spawned"
        );

        Ok(DispatchHandle {
            id,
            pid: Some(child.id()),
            log_path,
        })
    }
}
