// crates/tunebench-core/src/encoders/gcc.rs
// ============================================================================
// Module: GCC Flag Encoder
// Description: Renders compiler knobs as GCC `-f` flags.
// Purpose: Translate enum, param, and alignment knobs into one flag string.
// Dependencies: crate::{quaternion, space, parameter}
// ============================================================================

//! ## Overview
//! - Enum knobs without the `Param` scope become `-f<name>` or `-fno-<name>`.
//! - `Param` enum knobs become `-f<name>=<value>`.
//! - `Align` integer knobs index the quaternion table; an empty entry turns
//!   the alignment off with `-fno-<name>`.
//!
//! Other knobs contribute nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::EncodeError;
use crate::parameter::ParameterKind;
use crate::parameter::ParameterScope;
use crate::quaternion::quaternion_at;
use crate::quaternion::quaternion_table;
use crate::space::ConfigurationSpace;

// ============================================================================
// SECTION: Encoder
// ============================================================================

/// GCC flag string renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GccEncoder;

impl GccEncoder {
    /// Renders every knob in name order, space-separated.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::AlignIndexOutOfRange`] when an alignment knob
    /// stores an index outside the quaternion table.
    pub fn encode(&self, space: &ConfigurationSpace) -> Result<String, EncodeError> {
        let mut flags = Vec::with_capacity(space.len());
        for spec in space.parameters() {
            let name = spec.name();
            let value = spec.current_value();
            match spec.kind() {
                ParameterKind::Enum {
                    ..
                } => {
                    if spec.has_scope(&ParameterScope::Param) {
                        flags.push(format!("-f{name}={value}"));
                    } else if value.is_on() {
                        flags.push(format!("-f{name}"));
                    } else {
                        flags.push(format!("-fno-{name}"));
                    }
                }
                ParameterKind::Integer {
                    ..
                } if spec.has_scope(&ParameterScope::Align) => {
                    let index = value.as_integer().unwrap_or(-1);
                    let entry = quaternion_at(index).ok_or_else(|| {
                        EncodeError::AlignIndexOutOfRange {
                            name: name.to_string(),
                            index,
                            len: quaternion_table().len(),
                        }
                    })?;
                    if entry.is_empty() {
                        flags.push(format!("-fno-{name}"));
                    } else {
                        flags.push(format!("-f{name}={entry}"));
                    }
                }
                _ => {}
            }
        }
        Ok(flags.join(" "))
    }
}
