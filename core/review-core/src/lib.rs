//! # review-core
//!
//! Shared logic for the deep-review hook family: one parameterized subsystem
//! behind the test-coverage, lint, file, bug, docs and security reviewers.
//!
//! ## Design Principles
//!
//! - **Stateless process, external state**: every hook invocation is a fresh
//!   process. Coordination between invocations happens only through the
//!   per-session state file ([`state::FileStateStore`]).
//! - **Never block**: the caller always gets an approve decision
//!   ([`response::APPROVE`]), whatever happened on the way.
//! - **Graceful degradation**: missing or corrupt files yield defaults, not errors.
//! - **Fire and forget**: the review agent is spawned detached and never awaited.
//!
//! ## Pipeline
//!
//! ```text
//! stdin → event → gateway ─(irrelevant)──────────────────────────────┐
//!                    │                                                 │
//!                    └→ store.load → evaluator ─(below threshold)→ save ┤
//!                                       │                              │
//!                                       └→ identity → dispatcher → save ┴→ emitter
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use review_core::{HookKind, ReviewEngine, StorageConfig};
//!
//! let engine = ReviewEngine::new(HookKind::Bug, StorageConfig::from_env()?);
//! let outcome = engine.handle_stdin(&input);
//! println!("{}", review_core::response::APPROVE);
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod event;
pub mod gateway;
pub mod identity;
pub mod kinds;
pub mod patterns;
pub mod response;
pub mod sanitize;
pub mod state;
pub mod storage;

pub use config::{ConfigProvider, DispatchConfig};
pub use dispatch::{AgentDispatcher, DispatchHandle, DispatchRequest, Dispatcher};
pub use engine::{Outcome, ReviewEngine};
pub use error::{Result, ReviewError};
pub use event::{DispatchEvent, HookInput};
pub use kinds::HookKind;
pub use state::{FileStateStore, SessionState, StateStore};
pub use storage::StorageConfig;
