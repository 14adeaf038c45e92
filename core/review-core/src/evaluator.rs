//! Threshold Evaluator.
//!
//! Two states per session:
//!
//! ```text
//!                 count >= threshold && !in_progress
//!  Accumulating ─────────────────────────────────────► Dispatching
//!       ▲                                                  │
//!       │   spawn issued: reset count + files, stamp time  │
//!       ├──────────────────────────────────────────────────┤
//!       │   spawn failed: keep count + files               │
//!       └──────────────────────────────────────────────────┘
//! ```
//!
//! Dispatching lasts only as long as the spawn call inside one invocation. The
//! flag is never persisted as `true`, so it stops the same invocation from
//! firing twice but does nothing against a second, concurrent invocation (see
//! [`crate::state`] on concurrency).

use crate::state::SessionState;

pub const MIN_EDIT_THRESHOLD: u64 = 3;
pub const MAX_EDIT_THRESHOLD: u64 = 7;

/// Clamps a configured threshold into `[3, 7]`.
pub fn effective_threshold(configured: i64) -> u64 {
    configured.clamp(MIN_EDIT_THRESHOLD as i64, MAX_EDIT_THRESHOLD as i64) as u64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Accumulating,
    Dispatching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Below threshold (or already dispatching); just persist the new count.
    Accumulate,
    /// Threshold reached; dispatch now.
    Fire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdEvaluator {
    threshold: u64,
}

impl ThresholdEvaluator {
    pub fn new(configured_threshold: i64) -> Self {
        Self {
            threshold: effective_threshold(configured_threshold),
        }
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn phase(state: &SessionState) -> Phase {
        if state.dispatch_in_progress {
            Phase::Dispatching
        } else {
            Phase::Accumulating
        }
    }

    /// Counts one relevant edit and decides whether to fire.
    ///
    /// The count goes up on every call, even for a file already in the set.
    pub fn observe(&self, state: &mut SessionState, file_path: &str) -> Decision {
        state.edit_count = state.edit_count.saturating_add(1);
        if !state.edited_files.contains(file_path) {
            state.edited_files.insert(file_path.to_string());
        }

        if self.should_fire(state) {
            Decision::Fire
        } else {
            Decision::Accumulate
        }
    }

    pub fn should_fire(&self, state: &SessionState) -> bool {
        state.edit_count >= self.threshold && !state.dispatch_in_progress
    }

    /// Enters Dispatching right before the spawn.
    pub fn begin_dispatch(state: &mut SessionState) {
        state.dispatch_in_progress = true;
    }

    /// Spawn issued: open a new window.
    pub fn complete_dispatch(state: &mut SessionState, now_millis: i64) {
        state.edit_count = 0;
        state.edited_files.clear();
        state.last_dispatch_at = Some(now_millis);
        state.dispatch_in_progress = false;
    }

    /// Spawn failed: leave the window open so the next edit retries.
    pub fn abort_dispatch(state: &mut SessionState) {
        state.dispatch_in_progress = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_clamped() {
        for (configured, expected) in [
            (i64::MIN, 3),
            (-4, 3),
            (0, 3),
            (2, 3),
            (3, 3),
            (5, 5),
            (7, 7),
            (8, 7),
            (i64::MAX, 7),
        ] {
            assert_eq!(effective_threshold(configured), expected, "configured={configured}");
        }
    }

    #[test]
    fn test_fires_on_third_distinct_file() {
        let evaluator = ThresholdEvaluator::new(3);
        let mut state = SessionState::fresh("s1");
        assert_eq!(evaluator.observe(&mut state, "/w/a.rs"), Decision::Accumulate);
        assert_eq!(evaluator.observe(&mut state, "/w/b.rs"), Decision::Accumulate);
        assert_eq!(evaluator.observe(&mut state, "/w/c.rs"), Decision::Fire);
        assert_eq!(state.edited_files.len(), 3);
    }

    #[test]
    fn test_count_based_not_distinct_file_based() {
        let evaluator = ThresholdEvaluator::new(3);
        let mut state = SessionState::fresh("s1");
        evaluator.observe(&mut state, "/w/a.rs");
        evaluator.observe(&mut state, "/w/a.rs");
        assert_eq!(evaluator.observe(&mut state, "/w/a.rs"), Decision::Fire);
        assert_eq!(state.edit_count, 3);
        assert_eq!(state.edited_files.len(), 1);
    }

    #[test]
    fn test_duplicates_appear_once() {
        let evaluator = ThresholdEvaluator::new(7);
        let mut state = SessionState::fresh("s1");
        let paths = ["/a", "/b", "/a", "/c", "/b", "/a"];
        for path in paths {
            evaluator.observe(&mut state, path);
        }
        assert_eq!(state.edit_count, paths.len() as u64);
        assert_eq!(
            state.edited_files.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["/a", "/b", "/c"]
        );
    }

    #[test]
    fn test_in_progress_guard_blocks_fire() {
        let evaluator = ThresholdEvaluator::new(3);
        let mut state = SessionState::fresh("s1");
        state.edit_count = 5;
        ThresholdEvaluator::begin_dispatch(&mut state);
        assert_eq!(ThresholdEvaluator::phase(&state), Phase::Dispatching);
        assert_eq!(evaluator.observe(&mut state, "/w/a.rs"), Decision::Accumulate);
    }

    #[test]
    fn test_complete_dispatch_resets_window() {
        let evaluator = ThresholdEvaluator::new(3);
        let mut state = SessionState::fresh("s1");
        for path in ["/a", "/b", "/c"] {
            evaluator.observe(&mut state, path);
        }
        ThresholdEvaluator::begin_dispatch(&mut state);
        ThresholdEvaluator::complete_dispatch(&mut state, 42);

        assert_eq!(state.edit_count, 0);
        assert!(state.edited_files.is_empty());
        assert_eq!(state.last_dispatch_at, Some(42));
        assert_eq!(ThresholdEvaluator::phase(&state), Phase::Accumulating);

        assert_eq!(evaluator.observe(&mut state, "/d"), Decision::Accumulate);
        assert_eq!(state.edit_count, 1);
    }

    #[test]
    fn test_abort_dispatch_keeps_window_open() {
        let evaluator = ThresholdEvaluator::new(3);
        let mut state = SessionState::fresh("s1");
        for path in ["/a", "/b", "/c"] {
            evaluator.observe(&mut state, path);
        }
        ThresholdEvaluator::begin_dispatch(&mut state);
        ThresholdEvaluator::abort_dispatch(&mut state);

        assert_eq!(state.edit_count, 3);
        assert_eq!(state.last_dispatch_at, None);
        assert_eq!(evaluator.observe(&mut state, "/d"), Decision::Fire);
    }
}
