//! Session State Store.
//!
//! Each hook invocation is a separate process, so the accumulator for a
//! `(kind, session)` pair lives in a JSON file between invocations:
//!
//! ```text
//! invocation N:   load → mutate → save ─┐
//!                                       ▼
//!                       ~/.deep-review/state/{kind}/{session}-{md5}.json
//!                                       │
//! invocation N+1: load ◄────────────────┘
//! ```
//!
//! # Concurrency
//!
//! There is no locking and no compare-and-swap. Two invocations for the same
//! session that overlap can both load the same state, both decide to fire and
//! both save: the result is a double dispatch or a lost update (last writer
//! wins). The host normally serializes tool calls within a session, so this is
//! rare, but it is a real gap. [`StateStore`] is the seam where a lock-holding
//! or CAS-capable implementation would slot in without touching the evaluator.
//!
//! # Retention
//!
//! State files are never deleted. One small file accumulates per session per
//! hook kind.

mod store;
mod types;

pub use store::{FileStateStore, StateStore};
pub use types::SessionState;
