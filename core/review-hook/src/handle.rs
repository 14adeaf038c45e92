//! Event handler for Claude Code `PostToolUse` hooks.
//!
//! Reads one JSON event from stdin, runs it through the review engine and
//! prints `{"decision":"approve"}`. Every failure is logged and swallowed: the
//! decision is printed no matter what.

use review_core::{response, HookKind, Outcome, ReviewEngine, StorageConfig};
use std::io::{self, Read};

pub fn run(kind: HookKind) {
    let mut input = String::new();
    match io::stdin().read_to_string(&mut input) {
        Ok(_) => process(kind, &input),
        Err(e) => tracing::warn!(kind = %kind, error = %e, "Failed to read stdin"),
    }
    approve_only();
}

fn process(kind: HookKind, input: &str) {
    let storage = match StorageConfig::from_env() {
        Ok(storage) => storage,
        Err(e) => {
            tracing::warn!(kind = %kind, error = %e, "Cannot resolve storage, skipping event");
            return;
        }
    };

    match ReviewEngine::new(kind, storage).handle_stdin(input) {
        Outcome::Skipped(reason) => {
            tracing::debug!(kind = %kind, reason = %reason, "Event skipped");
        }
        Outcome::Accumulated { edit_count, threshold } => {
            tracing::debug!(kind = %kind, edit_count, threshold, "Edit accumulated");
        }
        Outcome::Dispatched { handle, queue, file_count } => {
            tracing::debug!(
                kind = %kind,
                dispatch = %handle.id,
                queue = %queue.id,
                file_count,
                "Review dispatched"
            );
        }
        Outcome::DispatchFailed { edit_count, error } => {
            tracing::debug!(kind = %kind, edit_count, error = %error, "Review dispatch failed");
        }
    }
}

/// Drains stdin so the host never sees a broken pipe, then approves.
pub fn drain_and_approve() {
    let _ = io::stdin().read_to_end(&mut Vec::new());
    approve_only();
}

fn approve_only() {
    let mut stdout = io::stdout().lock();
    if let Err(e) = response::emit(&mut stdout) {
        tracing::error!(error = %e, "Failed to write hook decision");
    }
}
