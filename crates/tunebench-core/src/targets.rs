// crates/tunebench-core/src/targets.rs
// ============================================================================
// Module: Benchmark Targets
// Description: Per-target space construction and encoder selection.
// Purpose: Apply target-specific rules when building a configuration space.
// Dependencies: crate::{space, definition, constraint, encoders, quaternion}
// ============================================================================

//! ## Overview
//! A [`Target`] names one tunable system. Building its space applies the
//! target's fixed rules on top of the declarative definition:
//! - GCC alignment knobs get `max = table length - 1`, overriding whatever
//!   bound the definition declares.
//! - MySQL spaces carry the `InnoDB` redo log capacity constraint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::constraint::MysqlLogCapacity;
use crate::definition::DefinitionError;
use crate::definition::SpaceDefinition;
use crate::encoders::Encoder;
use crate::encoders::GccEncoder;
use crate::encoders::LlvmEncoder;
use crate::encoders::MysqlEncoder;
use crate::parameter::ParameterScope;
use crate::quaternion::ALIGN_FLAGS;
use crate::quaternion::quaternion_max_index;
use crate::space::ConfigurationSpace;

// ============================================================================
// SECTION: Target
// ============================================================================

/// Tunable benchmark target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// GCC compiler.
    Gcc,
    /// LLVM compiler.
    Llvm,
    /// MySQL server.
    Mysql,
}

impl Target {
    /// Returns the lowercase target label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Llvm => "llvm",
            Self::Mysql => "mysql",
        }
    }

    /// Returns true for compiler targets.
    #[must_use]
    pub const fn is_compiler(self) -> bool {
        matches!(self, Self::Gcc | Self::Llvm)
    }

    /// Returns the default encoder for the target.
    #[must_use]
    pub const fn encoder(self) -> Encoder {
        match self {
            Self::Gcc => Encoder::Gcc(GccEncoder),
            Self::Llvm => Encoder::Llvm(LlvmEncoder::new()),
            Self::Mysql => Encoder::Mysql(MysqlEncoder),
        }
    }

    /// Builds the target's configuration space from a definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the definition is invalid or a GCC
    /// alignment default does not fit the quaternion table.
    pub fn build_space(
        self,
        definition: &SpaceDefinition,
    ) -> Result<ConfigurationSpace, DefinitionError> {
        let space = ConfigurationSpace::from_definition(definition)?;
        match self {
            Self::Gcc => gcc_space(space),
            Self::Llvm => Ok(space),
            Self::Mysql => Ok(space.with_constraint(Arc::new(MysqlLogCapacity))),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rebinds alignment knob bounds to the quaternion table.
fn gcc_space(mut space: ConfigurationSpace) -> Result<ConfigurationSpace, DefinitionError> {
    let max = quaternion_max_index();
    let align: Vec<String> = space
        .parameters()
        .filter(|spec| {
            spec.kind().is_integer()
                && (spec.has_scope(&ParameterScope::Align) || ALIGN_FLAGS.contains(&spec.name()))
        })
        .map(|spec| spec.name().to_string())
        .collect();
    for name in align {
        space.override_integer_max(&name, max)?;
    }
    Ok(space)
}
