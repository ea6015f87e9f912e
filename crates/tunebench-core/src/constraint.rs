// crates/tunebench-core/src/constraint.rs
// ============================================================================
// Module: Cross-Parameter Constraints
// Description: Pure predicates over a whole configuration snapshot.
// Purpose: Share one safety rule between explicit updates and sampling.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`SpaceConstraint`] inspects a complete snapshot of parameter values and
//! either accepts it or returns a [`ConstraintViolation`]. Constraints never
//! mutate state; the configuration space evaluates them on staged snapshots
//! before committing updates and while rejection sampling.
//!
//! [`MysqlLogCapacity`] guards the `InnoDB` redo log against both an oversized
//! total log and a log too small for the configured thread concurrency.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::parameter::ParameterValue;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Knob holding the size of one `InnoDB` redo log file in bytes.
pub const INNODB_LOG_FILE_SIZE: &str = "innodb_log_file_size";
/// Knob holding the number of redo log files per group.
pub const INNODB_LOG_FILES_IN_GROUP: &str = "innodb_log_files_in_group";
/// Knob holding the `InnoDB` thread concurrency limit.
pub const INNODB_THREAD_CONCURRENCY: &str = "innodb_thread_concurrency";
/// Upper bound on total redo log capacity (512 GiB).
pub const MYSQL_MAX_LOG_CAPACITY_BYTES: i128 = 512 * 1024 * 1024 * 1024;
/// Redo log bytes required per concurrent thread (200 KiB).
pub const MYSQL_LOG_BYTES_PER_THREAD: i128 = 200 * 1024;

// ============================================================================
// SECTION: Violation
// ============================================================================

/// Failure returned when a snapshot breaks a cross-parameter constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "constraint {constraint} violated: {} (values: {})",
    .violated.join("; "),
    render_values(.values)
)]
pub struct ConstraintViolation {
    /// Constraint name.
    pub constraint: String,
    /// Values of every parameter the constraint reads.
    pub values: BTreeMap<String, ParameterValue>,
    /// Rendered inequalities that failed.
    pub violated: Vec<String>,
}

/// Renders `name=value` pairs for violation messages.
fn render_values(values: &BTreeMap<String, ParameterValue>) -> String {
    values.iter().map(|(name, value)| format!("{name}={value}")).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// SECTION: Constraint Trait
// ============================================================================

/// Pure predicate over a full configuration snapshot.
pub trait SpaceConstraint: fmt::Debug + Send + Sync {
    /// Returns the constraint name.
    fn name(&self) -> &str;

    /// Checks a snapshot of parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintViolation`] when the snapshot breaks the rule.
    fn check(&self, values: &BTreeMap<String, ParameterValue>) -> Result<(), ConstraintViolation>;
}

// ============================================================================
// SECTION: MySQL Log Capacity
// ============================================================================

/// Returns true when the redo log sizing satisfies both capacity rules.
///
/// Rule A: `log_file_size * files_in_group <= 512 GiB`.
/// Rule B: `thread_concurrency * 200 KiB <= log_file_size * files_in_group`.
#[must_use]
pub fn mysql_log_capacity_satisfied(
    log_file_size: i64,
    files_in_group: i64,
    thread_concurrency: i64,
) -> bool {
    violated_rules(log_file_size, files_in_group, thread_concurrency).is_empty()
}

/// Returns the rendered rules broken by the given sizing.
fn violated_rules(log_file_size: i64, files_in_group: i64, thread_concurrency: i64) -> Vec<String> {
    let capacity = i128::from(log_file_size) * i128::from(files_in_group);
    let required = i128::from(thread_concurrency) * MYSQL_LOG_BYTES_PER_THREAD;
    let mut violated = Vec::new();
    if capacity > MYSQL_MAX_LOG_CAPACITY_BYTES {
        violated.push(format!(
            "{INNODB_LOG_FILE_SIZE} * {INNODB_LOG_FILES_IN_GROUP} <= \
             {MYSQL_MAX_LOG_CAPACITY_BYTES}"
        ));
    }
    if required > capacity {
        violated.push(format!(
            "{INNODB_THREAD_CONCURRENCY} * {MYSQL_LOG_BYTES_PER_THREAD} <= \
             {INNODB_LOG_FILE_SIZE} * {INNODB_LOG_FILES_IN_GROUP}"
        ));
    }
    violated
}

/// `InnoDB` redo log capacity rule for MySQL spaces.
///
/// # Invariants
/// - Snapshots missing any of the three knobs, or holding non-integer values
///   for them, are accepted: the rule only constrains spaces that tune all
///   three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MysqlLogCapacity;

impl MysqlLogCapacity {
    /// Constraint name reported in violations.
    pub const NAME: &'static str = "mysql_log_capacity";
}

impl SpaceConstraint for MysqlLogCapacity {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, values: &BTreeMap<String, ParameterValue>) -> Result<(), ConstraintViolation> {
        let read = |name: &str| values.get(name).and_then(ParameterValue::as_integer);
        let (Some(log_file_size), Some(files_in_group), Some(thread_concurrency)) = (
            read(INNODB_LOG_FILE_SIZE),
            read(INNODB_LOG_FILES_IN_GROUP),
            read(INNODB_THREAD_CONCURRENCY),
        ) else {
            return Ok(());
        };
        let violated = violated_rules(log_file_size, files_in_group, thread_concurrency);
        if violated.is_empty() {
            return Ok(());
        }
        let values = [
            (INNODB_LOG_FILE_SIZE, log_file_size),
            (INNODB_LOG_FILES_IN_GROUP, files_in_group),
            (INNODB_THREAD_CONCURRENCY, thread_concurrency),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), ParameterValue::Integer(value)))
        .collect();
        Err(ConstraintViolation {
            constraint: Self::NAME.to_string(),
            values,
            violated,
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
