//! One hook invocation, end to end.
//!
//! ```text
//! parse → gateway ─┬─ irrelevant ─────────────────────────────→ Skipped
//!                  └─ load → observe ─┬─ below threshold → save → Accumulated
//!                                     └─ fire → resolve queue → dispatch
//!                                           ├─ ok   → reset → save → Dispatched
//!                                           └─ err  → keep  → save → DispatchFailed
//! ```
//!
//! Nothing here returns an error: every path ends in an [`Outcome`] and the
//! caller emits the approve decision regardless.

use std::path::Path;

use chrono::Utc;

use crate::config::DispatchConfig;
use crate::dispatch::{AgentDispatcher, DispatchHandle, DispatchRequest, Dispatcher};
use crate::evaluator::{Decision, ThresholdEvaluator};
use crate::event::{self, DispatchEvent, HookInput};
use crate::gateway::{self, SkipReason};
use crate::identity::{self, ResolvedQueue};
use crate::kinds::HookKind;
use crate::state::{FileStateStore, SessionState, StateStore};
use crate::storage::StorageConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Irrelevant event; state untouched.
    Skipped(SkipReason),
    /// Counted; window still open.
    Accumulated { edit_count: u64, threshold: u64 },
    /// Review agent launched; window reset.
    Dispatched {
        handle: DispatchHandle,
        queue: ResolvedQueue,
        file_count: usize,
    },
    /// Spawn failed; window left open so the next edit retries.
    DispatchFailed { edit_count: u64, error: String },
}

pub struct ReviewEngine {
    kind: HookKind,
    storage: StorageConfig,
    store: Box<dyn StateStore>,
    dispatcher: Option<Box<dyn Dispatcher>>,
    review_child: bool,
}

impl ReviewEngine {
    /// Production wiring: file-backed store, agent resolved per invocation.
    pub fn new(kind: HookKind, storage: StorageConfig) -> Self {
        Self {
            kind,
            store: Box::new(FileStateStore::new(storage.clone())),
            storage,
            dispatcher: None,
            review_child: gateway::is_review_child(),
        }
    }

    pub fn with_store(mut self, store: Box<dyn StateStore>) -> Self {
        self.store = store;
        self
    }

    /// Replaces the agent dispatcher (otherwise built from `agentCommand`).
    pub fn with_dispatcher(mut self, dispatcher: Box<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn with_review_child(mut self, review_child: bool) -> Self {
        self.review_child = review_child;
        self
    }

    /// Entry point for raw stdin.
    pub fn handle_stdin(&self, raw: &str) -> Outcome {
        match event::parse_stdin(raw) {
            Ok(Some(input)) => self.handle_input(input),
            Ok(None) => Outcome::Skipped(SkipReason::EmptyInput),
            Err(e) => Outcome::Skipped(SkipReason::MalformedInput(e.to_string())),
        }
    }

    pub fn handle_input(&self, input: HookInput) -> Outcome {
        if self.review_child {
            return Outcome::Skipped(SkipReason::ReviewChild);
        }
        match input.into_event() {
            Ok(event) => self.handle_event(&event),
            Err(e) => Outcome::Skipped(SkipReason::MalformedInput(e.to_string())),
        }
    }

    pub fn handle_event(&self, event: &DispatchEvent) -> Outcome {
        // Cheap rejection before touching any settings file.
        if !gateway::is_edit_tool(&event.tool_name) {
            return Outcome::Skipped(SkipReason::NotAnEditTool(event.tool_name.clone()));
        }

        let config = DispatchConfig::load(self.kind, &self.storage, Path::new(&event.cwd));
        let label = event
            .transcript_path
            .as_deref()
            .and_then(|path| identity::read_session_title(Path::new(path)));

        if let Err(reason) = gateway::check(event, &config, label.as_deref()) {
            tracing::debug!(kind = %self.kind, session = %event.session_id, reason = %reason, "Skipping event");
            return Outcome::Skipped(reason);
        }

        let mut state = self.store.load(self.kind, &event.session_id);
        if state.dispatch_in_progress {
            tracing::warn!(
                kind = %self.kind,
                session = %event.session_id,
                "Clearing stale in-progress flag from stored state"
            );
            state.dispatch_in_progress = false;
        }

        let evaluator = ThresholdEvaluator::new(config.edit_threshold);
        match evaluator.observe(&mut state, &event.file_path) {
            Decision::Accumulate => {
                self.persist(&event.session_id, &state);
                tracing::debug!(
                    kind = %self.kind,
                    session = %event.session_id,
                    edit_count = state.edit_count,
                    threshold = evaluator.threshold(),
                    "Edit recorded"
                );
                Outcome::Accumulated {
                    edit_count: state.edit_count,
                    threshold: evaluator.threshold(),
                }
            }
            Decision::Fire => self.fire(event, &config, label.as_deref(), state),
        }
    }

    fn fire(
        &self,
        event: &DispatchEvent,
        config: &DispatchConfig,
        label: Option<&str>,
        mut state: SessionState,
    ) -> Outcome {
        let queue = identity::resolve_queue_id(self.kind, config, label, &event.cwd);
        let request = DispatchRequest {
            kind: self.kind,
            session_id: event.session_id.clone(),
            cwd: event.cwd.clone(),
            files: state.edited_files.iter().cloned().collect(),
            queue_id: queue.id.clone(),
        };

        ThresholdEvaluator::begin_dispatch(&mut state);
        let result = match &self.dispatcher {
            Some(dispatcher) => dispatcher.dispatch(&request),
            None => AgentDispatcher::from_env(self.storage.clone(), &config.agent_command)
                .dispatch(&request),
        };

        match result {
            Ok(handle) => {
                ThresholdEvaluator::complete_dispatch(&mut state, Utc::now().timestamp_millis());
                self.persist(&event.session_id, &state);
                tracing::info!(
                    kind = %self.kind,
                    session = %event.session_id,
                    queue = %queue.id,
                    queue_source = ?queue.source,
                    files = request.files.len(),
                    pid = ?handle.pid,
                    log = ?handle.log_path,
                    "Deep review dispatched"
                );
                Outcome::Dispatched {
                    handle,
                    queue,
                    file_count: request.files.len(),
                }
            }
            Err(e) => {
                ThresholdEvaluator::abort_dispatch(&mut state);
                self.persist(&event.session_id, &state);
                tracing::warn!(
                    kind = %self.kind,
                    session = %event.session_id,
                    error = %e,
                    "Deep review dispatch failed, will retry on next edit"
                );
                Outcome::DispatchFailed {
                    edit_count: state.edit_count,
                    error: e.to_string(),
                }
            }
        }
    }

    fn persist(&self, session_id: &str, state: &SessionState) {
        if let Err(e) = self.store.save(self.kind, session_id, state) {
            tracing::warn!(kind = %self.kind, session = %session_id, error = %e, "Failed to save session state");
        }
    }
}
