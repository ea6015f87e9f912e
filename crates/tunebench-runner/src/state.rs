// crates/tunebench-runner/src/state.rs
// ============================================================================
// Module: Benchmark Run State
// Description: Run lifecycle states, transitions, and metric records.
// Purpose: Make illegal lifecycle transitions unrepresentable at runtime.
// Dependencies: serde, crate::{error, interfaces}
// ============================================================================

//! ## Overview
//! A run moves strictly forward:
//! `Idle -> Provisioning -> AwaitingReady -> Executing -> Collecting ->
//! Completed`. Any active state may end in `Failed`. `Provisioning`,
//! `AwaitingReady`, and `Executing` may also end in `TimedOut`; `Collecting`
//! only reads local artifacts and never times out. Terminal states accept no
//! further transitions.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::error::StageError;
use crate::interfaces::EnvironmentHandle;

// ============================================================================
// SECTION: Run State
// ============================================================================

/// Benchmark run lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Not started.
    Idle,
    /// Launching the environment.
    Provisioning,
    /// Waiting for the service to accept connections.
    AwaitingReady,
    /// Running the workload.
    Executing,
    /// Parsing the results artifact.
    Collecting,
    /// Metrics collected.
    Completed,
    /// A stage failed.
    Failed,
    /// A bounded wait expired.
    TimedOut,
}

impl RunState {
    /// Returns the snake-case state label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Provisioning => "provisioning",
            Self::AwaitingReady => "awaiting_ready",
            Self::Executing => "executing",
            Self::Collecting => "collecting",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }

    /// Returns true for states that end a run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::TimedOut)
    }

    /// Returns true when `next` is a legal successor of this state.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Provisioning)
                | (Self::Provisioning, Self::AwaitingReady)
                | (Self::AwaitingReady, Self::Executing)
                | (Self::Provisioning | Self::AwaitingReady | Self::Executing, Self::TimedOut)
                | (Self::Executing, Self::Collecting)
                | (Self::Collecting, Self::Completed)
                | (
                    Self::Provisioning | Self::AwaitingReady | Self::Executing | Self::Collecting,
                    Self::Failed
                )
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Metrics
// ============================================================================

/// Named numeric measurements produced by one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsRecord {
    /// Metric values keyed by name.
    values: BTreeMap<String, f64>,
}

impl MetricsRecord {
    /// Builds an empty record.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Inserts or replaces a metric.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Returns a metric value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Returns true when the metric is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates metrics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Returns the number of metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no metric is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// SECTION: Benchmark Run
// ============================================================================

/// One pass through the run lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRun {
    /// Workload identifier.
    workload: String,
    /// Primary environment name.
    environment: String,
    /// Handle of the provisioned environment.
    handle: Option<EnvironmentHandle>,
    /// Current state.
    state: RunState,
    /// States visited, starting with `Idle`.
    history: Vec<RunState>,
    /// Metrics once collected.
    metrics: Option<MetricsRecord>,
}

impl BenchmarkRun {
    /// Starts an idle run.
    #[must_use]
    pub fn new(workload: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            workload: workload.into(),
            environment: environment.into(),
            handle: None,
            state: RunState::Idle,
            history: vec![RunState::Idle],
            metrics: None,
        }
    }

    /// Returns the workload identifier.
    #[must_use]
    pub fn workload(&self) -> &str {
        &self.workload
    }

    /// Returns the primary environment name.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Returns the environment handle once provisioned.
    #[must_use]
    pub const fn handle(&self) -> Option<&EnvironmentHandle> {
        self.handle.as_ref()
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Returns every state visited, in order.
    #[must_use]
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Returns collected metrics.
    #[must_use]
    pub const fn metrics(&self) -> Option<&MetricsRecord> {
        self.metrics.as_ref()
    }

    /// Records the provisioned environment handle.
    pub fn attach(&mut self, handle: EnvironmentHandle) {
        self.handle = Some(handle);
    }

    /// Records collected metrics.
    pub fn record_metrics(&mut self, metrics: MetricsRecord) {
        self.metrics = Some(metrics);
    }

    /// Moves to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::InvalidTransition`] when `next` is not a legal
    /// successor of the current state.
    pub fn transition(&mut self, next: RunState) -> Result<(), StageError> {
        if !self.state.can_transition_to(next) {
            return Err(StageError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.history.push(next);
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test fixtures use explicit asserts and unwraps for clarity."
    )]

    use super::*;

    #[test]
    fn forward_path_reaches_completed() {
        let mut run = BenchmarkRun::new("tpcc", "tunebench-mysql");
        for next in [
            RunState::Provisioning,
            RunState::AwaitingReady,
            RunState::Executing,
            RunState::Collecting,
            RunState::Completed,
        ] {
            run.transition(next).unwrap();
        }
        assert_eq!(run.state(), RunState::Completed);
        assert_eq!(run.history().len(), 6);
    }

    #[test]
    fn skipping_a_stage_is_rejected() {
        let mut run = BenchmarkRun::new("tpcc", "tunebench-mysql");
        let err = run.transition(RunState::Executing).unwrap_err();
        assert!(matches!(
            err,
            StageError::InvalidTransition {
                from: RunState::Idle,
                to: RunState::Executing,
            }
        ));
        assert_eq!(run.state(), RunState::Idle);
    }

    #[test]
    fn waiting_stages_can_time_out() {
        for state in [RunState::Provisioning, RunState::AwaitingReady, RunState::Executing] {
            assert!(state.can_transition_to(RunState::TimedOut));
        }
        assert!(!RunState::Collecting.can_transition_to(RunState::TimedOut));
        assert!(!RunState::Idle.can_transition_to(RunState::TimedOut));
        assert!(!RunState::Idle.can_transition_to(RunState::Failed));
    }

    #[test]
    fn execution_timeout_ends_the_run() {
        let mut run = BenchmarkRun::new("tpcc", "tunebench-mysql");
        for next in [RunState::Provisioning, RunState::AwaitingReady, RunState::Executing] {
            run.transition(next).unwrap();
        }
        run.transition(RunState::TimedOut).unwrap();
        assert!(run.state().is_terminal());
        assert!(run.transition(RunState::Failed).is_err());
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for terminal in [RunState::Completed, RunState::Failed, RunState::TimedOut] {
            assert!(terminal.is_terminal());
            for next in [RunState::Provisioning, RunState::Failed, RunState::Completed] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }
}
