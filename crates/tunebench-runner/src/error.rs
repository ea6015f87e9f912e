// crates/tunebench-runner/src/error.rs
// ============================================================================
// Module: Runner Errors
// Description: Stage, run, and driver construction errors.
// Purpose: Report which lifecycle stage failed and why.
// Dependencies: thiserror, tunebench-core, crate::{interfaces, state}
// ============================================================================

//! ## Overview
//! [`StageError`] describes a failure inside one lifecycle stage.
//! [`RunError`] wraps it with the state that was active when it happened, and
//! separates configuration rejection (nothing provisioned) from stage
//! failures. [`TargetError`] covers driver construction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tunebench_core::DefinitionError;
use tunebench_core::EncodeError;
use tunebench_core::SpaceError;
use tunebench_core::Target;

use crate::interfaces::EnvironmentError;
use crate::interfaces::EnvironmentStatus;
use crate::state::RunState;

// ============================================================================
// SECTION: Stage Errors
// ============================================================================

/// Failure inside a single lifecycle stage.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    /// Environment backend call failed.
    #[error(transparent)]
    Environment(#[from] EnvironmentError),
    /// Environment stopped while it was expected to run.
    #[error("environment {name} stopped unexpectedly ({status})")]
    EnvironmentExited {
        /// Environment name.
        name: String,
        /// Status observed.
        status: EnvironmentStatus,
    },
    /// Service never became ready.
    #[error("environment {name} not ready after {}s", .waited.as_secs())]
    ReadinessTimeout {
        /// Environment name.
        name: String,
        /// Time spent polling.
        waited: Duration,
    },
    /// Graceful shutdown command failed.
    #[error("shutdown of {name} failed with exit code {exit_code}")]
    ShutdownFailed {
        /// Environment name.
        name: String,
        /// Exit code reported.
        exit_code: i64,
    },
    /// Environment kept running after the shutdown request.
    #[error("environment {name} still running after {}s", .waited.as_secs())]
    StopTimeout {
        /// Environment name.
        name: String,
        /// Time spent polling.
        waited: Duration,
    },
    /// Workload process exited with a failure code.
    #[error("workload {workload} failed with exit code {exit_code}")]
    WorkloadFailed {
        /// Workload identifier.
        workload: String,
        /// Exit code reported.
        exit_code: i64,
    },
    /// Expected results artifact is absent.
    #[error("results artifact missing: {}", .path.display())]
    MissingArtifact {
        /// Path searched.
        path: PathBuf,
    },
    /// Results artifact exists but cannot be interpreted.
    #[error("results artifact {} invalid: {reason}", .path.display())]
    InvalidArtifact {
        /// Artifact path.
        path: PathBuf,
        /// Parse failure.
        reason: String,
    },
    /// Host filesystem operation failed.
    #[error("i/o error: {0}")]
    Io(String),
    /// Lifecycle transition not permitted.
    #[error("invalid run transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: RunState,
        /// Requested state.
        to: RunState,
    },
}

impl StageError {
    /// Returns true when the failure is a readiness timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::ReadinessTimeout { .. })
    }
}

// ============================================================================
// SECTION: Run Errors
// ============================================================================

/// Outcome of a failed run or maintenance operation.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `Rejected` and `Encode` are returned before anything is provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Knobs failed validation.
    #[error("configuration rejected: {0}")]
    Rejected(#[source] SpaceError),
    /// Configuration could not be rendered.
    #[error("configuration encoding failed: {0}")]
    Encode(#[from] EncodeError),
    /// A lifecycle stage failed.
    #[error("run failed while {state}: {source}")]
    Stage {
        /// State active when the failure happened.
        state: RunState,
        /// Stage failure.
        #[source]
        source: StageError,
    },
    /// Teardown failed after both graceful and forced attempts.
    #[error("teardown failed: {0}")]
    Teardown(#[source] EnvironmentError),
}

impl RunError {
    /// Returns the state a stage failure originated in.
    #[must_use]
    pub const fn state(&self) -> Option<RunState> {
        match self {
            Self::Stage {
                state,
                ..
            } => Some(*state),
            _ => None,
        }
    }

    /// Returns the validation error for rejected configurations.
    #[must_use]
    pub const fn rejection(&self) -> Option<&SpaceError> {
        match self {
            Self::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Target Errors
// ============================================================================

/// Driver construction errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// Workload not in the target's catalog.
    #[error(
        "workload {workload} is not supported by {target} (supported: {})",
        .supported.join(", ")
    )]
    UnsupportedWorkload {
        /// Target name.
        target: Target,
        /// Requested workload.
        workload: String,
        /// Supported workloads.
        supported: Vec<String>,
    },
    /// Driver does not serve this target.
    #[error("target {target} is not handled by the {driver} driver")]
    WrongTarget {
        /// Requested target.
        target: Target,
        /// Driver label.
        driver: &'static str,
    },
    /// Knob definition failed to load.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    /// Workload catalog failed to load.
    #[error("workload catalog error: {0}")]
    Catalog(String),
}
