// crates/tunebench-core/src/error.rs
// ============================================================================
// Module: Space Errors
// Description: Error types raised by parameter and configuration space updates.
// Purpose: Give callers stable, structured failures for knob validation.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every mutation of a [`crate::ConfigurationSpace`] either succeeds or fails
//! with a [`SpaceError`] and leaves the space untouched. These errors surface
//! before any environment is provisioned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::constraint::ConstraintViolation;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while validating, assigning, or sampling parameter values.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpaceError {
    /// A value falls outside the parameter's legal range.
    #[error("invalid value {value} for parameter {name}: {constraint}")]
    InvalidValue {
        /// Parameter name.
        name: String,
        /// Rendered rejected value.
        value: String,
        /// Human-readable description of the legal range.
        constraint: String,
    },
    /// The named parameter is not part of the space.
    #[error("unknown parameter: {name}")]
    UnknownParameter {
        /// Requested parameter name.
        name: String,
    },
    /// A cross-parameter constraint rejected the staged values.
    #[error(transparent)]
    ConstraintViolation(#[from] ConstraintViolation),
    /// The parameter kind does not support the requested operation.
    #[error("unsupported operation {operation} for parameter {name} of kind {kind}")]
    UnsupportedOperation {
        /// Parameter name.
        name: String,
        /// Parameter kind label.
        kind: String,
        /// Operation that was attempted.
        operation: &'static str,
    },
    /// Rejection sampling exhausted its attempt budget.
    #[error("no constraint-satisfying sample found after {attempts} attempts")]
    ConstraintUnsatisfiable {
        /// Number of whole-space samples drawn.
        attempts: usize,
    },
}
