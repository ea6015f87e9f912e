// crates/tunebench-core/src/encoders/mysql.rs
// ============================================================================
// Module: MySQL Config Encoder
// Description: Renders server knobs as a `[mysqld]` option file.
// Purpose: Refuse to render configurations that break safety constraints.
// Dependencies: crate::space
// ============================================================================

//! ## Overview
//! The option file starts with `[mysqld]` followed by one `key = value` line
//! per knob in name order. Constraints are checked before rendering.

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::EncodeError;
use crate::space::ConfigurationSpace;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Option file section header.
pub const MYSQLD_SECTION: &str = "[mysqld]";

// ============================================================================
// SECTION: Encoder
// ============================================================================

/// MySQL option file renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MysqlEncoder;

impl MysqlEncoder {
    /// Renders the option file contents, newline-terminated.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Constraint`] when the snapshot breaks a
    /// constraint.
    pub fn encode(&self, space: &ConfigurationSpace) -> Result<String, EncodeError> {
        if let Some(violation) = space.constraint_violation() {
            return Err(EncodeError::Constraint(violation));
        }
        let mut contents = String::from(MYSQLD_SECTION);
        contents.push('\n');
        for spec in space.parameters() {
            contents.push_str(spec.name());
            contents.push_str(" = ");
            contents.push_str(&spec.current_value().to_string());
            contents.push('\n');
        }
        Ok(contents)
    }
}
