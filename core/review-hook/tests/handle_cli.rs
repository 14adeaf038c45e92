//! Drives the compiled `review-hook` binary with an isolated HOME.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use review_core::{HookKind, StorageConfig};
use tempfile::TempDir;

const APPROVE: &str = "{\"decision\":\"approve\"}";

struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let home = tempfile::tempdir().expect("Failed to create temp home");
        std::fs::create_dir_all(home.path().join("acme-api")).unwrap();
        Sandbox { home }
    }

    fn project(&self) -> PathBuf {
        self.home.path().join("acme-api")
    }

    fn data_root(&self) -> PathBuf {
        self.home.path().join(".deep-review")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_review-hook"));
        cmd.args(args)
            .env("HOME", self.home.path())
            .env("DEEP_REVIEW_HOME", self.data_root())
            .env_remove("DEEP_REVIEW_CHILD")
            .env_remove("REVIEW_HOOK_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn run(&self, mut cmd: Command, stdin: &str) -> Output {
        let mut child = cmd.spawn().expect("Failed to spawn review-hook");
        child
            .stdin
            .take()
            .unwrap()
            .write_all(stdin.as_bytes())
            .unwrap();
        child.wait_with_output().expect("Failed to wait for review-hook")
    }

    fn handle(&self, kind: &str, stdin: &str, agent: &str) -> Output {
        let mut cmd = self.command(&["handle", kind]);
        cmd.env("REVIEW_AGENT_BIN", agent);
        self.run(cmd, stdin)
    }

    fn edit_event(&self, file: &str) -> String {
        serde_json::json!({
            "session_id": "sess-1",
            "cwd": self.project(),
            "hook_event_name": "PostToolUse",
            "tool_name": "Write",
            "tool_input": { "file_path": self.project().join(file), "content": "x" }
        })
        .to_string()
    }

    fn state_file(&self, kind: &str) -> PathBuf {
        let kind: HookKind = kind.parse().expect("Unknown hook kind");
        StorageConfig::with_roots(self.data_root(), self.home.path().join(".claude"))
            .session_state_file(kind, "sess-1")
    }

    fn state(&self, kind: &str) -> serde_json::Value {
        read_json(&self.state_file(kind))
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("Failed to read state file");
    serde_json::from_str(&content).expect("State file is not JSON")
}

fn assert_approved(output: &Output) {
    assert!(output.status.success(), "exit status: {:?}", output.status);
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), APPROVE);
}

#[test]
fn test_empty_stdin_approves() {
    let sandbox = Sandbox::new();
    let output = sandbox.handle("bug", "", "true");
    assert_approved(&output);
}

#[test]
fn test_garbage_stdin_approves() {
    let sandbox = Sandbox::new();
    let output = sandbox.handle("bug", "{{{ not json", "true");
    assert_approved(&output);
}

#[test]
fn test_unknown_kind_still_approves() {
    let sandbox = Sandbox::new();
    let output = sandbox.handle("perf", &sandbox.edit_event("a.rs"), "true");
    assert_approved(&output);
}

#[test]
fn test_read_tool_leaves_no_state() {
    let sandbox = Sandbox::new();
    let event = serde_json::json!({
        "session_id": "sess-1",
        "cwd": sandbox.project(),
        "tool_name": "Read",
        "tool_input": { "file_path": sandbox.project().join("a.rs") }
    })
    .to_string();

    assert_approved(&sandbox.handle("bug", &event, "true"));
    assert!(!sandbox.state_file("bug").exists());
}

#[cfg(unix)]
#[test]
fn test_third_edit_dispatches_and_resets() {
    let sandbox = Sandbox::new();

    for file in ["a.rs", "b.rs"] {
        assert_approved(&sandbox.handle("bug", &sandbox.edit_event(file), "true"));
    }
    let state = sandbox.state("bug");
    assert_eq!(state["editCount"], 2);
    assert_eq!(state["editedFiles"].as_array().unwrap().len(), 2);

    assert_approved(&sandbox.handle("bug", &sandbox.edit_event("c.rs"), "true"));
    let state = sandbox.state("bug");
    assert_eq!(state["editCount"], 0);
    assert!(state["editedFiles"].as_array().unwrap().is_empty());
    assert!(state["lastDispatchAt"].is_i64());
    assert_eq!(state["dispatchInProgress"], false);

    let logs: Vec<_> = std::fs::read_dir(sandbox.data_root().join("logs"))
        .unwrap()
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("bug-"))
        .collect();
    assert_eq!(logs.len(), 1);
}

#[test]
fn test_missing_agent_keeps_window_open() {
    let sandbox = Sandbox::new();
    let missing = sandbox.home.path().join("no-such-agent");
    let missing = missing.to_str().unwrap();

    for file in ["a.rs", "b.rs", "c.rs"] {
        assert_approved(&sandbox.handle("docs", &sandbox.edit_event(file), missing));
    }

    let state = sandbox.state("docs");
    assert_eq!(state["editCount"], 3);
    assert_eq!(state["editedFiles"].as_array().unwrap().len(), 3);
    assert!(state["lastDispatchAt"].is_null());
}

#[test]
fn test_review_child_edits_are_ignored() {
    let sandbox = Sandbox::new();
    let mut cmd = sandbox.command(&["handle", "bug"]);
    cmd.env("DEEP_REVIEW_CHILD", "1");
    let output = sandbox.run(cmd, &sandbox.edit_event("a.rs"));

    assert_approved(&output);
    assert!(!sandbox.state_file("bug").exists());
}

#[test]
fn test_state_and_reset_commands() {
    let sandbox = Sandbox::new();
    let missing = sandbox.home.path().join("no-such-agent");
    assert_approved(&sandbox.handle("lint", &sandbox.edit_event("a.rs"), missing.to_str().unwrap()));

    let output = sandbox.run(sandbox.command(&["state", "lint", "sess-1"]), "");
    assert!(output.status.success());
    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["editCount"], 1);

    let output = sandbox.run(sandbox.command(&["reset", "lint", "sess-1"]), "");
    assert!(output.status.success());
    assert_eq!(sandbox.state("lint")["editCount"], 0);
}
