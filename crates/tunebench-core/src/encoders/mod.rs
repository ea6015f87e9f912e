// crates/tunebench-core/src/encoders/mod.rs
// ============================================================================
// Module: Configuration Encoders
// Description: Closed set of renderers from space snapshots to target syntax.
// Purpose: Produce flag strings and config files from a configuration space.
// Dependencies: thiserror, crate::{space, constraint}
// ============================================================================

//! ## Overview
//! Encoders are pure: they read a [`ConfigurationSpace`] and return a fresh
//! [`EncodedConfiguration`] without touching the space. [`Encoder`] is the
//! single capability callers hold; its variants cover GCC flags, LLVM pass
//! lists, and MySQL `.cnf` files.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod gcc;
mod llvm;
mod mysql;

// ============================================================================
// SECTION: Imports
// ============================================================================

pub use gcc::GccEncoder;
pub use llvm::LlvmEncoder;
pub use mysql::MysqlEncoder;
use thiserror::Error;

use crate::constraint::ConstraintViolation;
use crate::space::ConfigurationSpace;

// ============================================================================
// SECTION: Encoded Output
// ============================================================================

/// Text rendered from a space snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedConfiguration {
    /// Space-separated command-line flags.
    Flags(String),
    /// Full configuration file contents.
    ConfigFile(String),
}

impl EncodedConfiguration {
    /// Returns the rendered text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Flags(text) | Self::ConfigFile(text) => text,
        }
    }

    /// Consumes the output and returns the rendered text.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::Flags(text) | Self::ConfigFile(text) => text,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while rendering a space.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The snapshot breaks a cross-parameter constraint.
    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),
    /// An explicit ordering names a parameter absent from the space.
    #[error("unknown parameter in ordering: {name}")]
    UnknownParameter {
        /// Requested parameter name.
        name: String,
    },
    /// An alignment index falls outside the quaternion table.
    #[error("alignment index {index} for {name} outside table of {len} entries")]
    AlignIndexOutOfRange {
        /// Parameter name.
        name: String,
        /// Stored index.
        index: i64,
        /// Table length.
        len: usize,
    },
}

// ============================================================================
// SECTION: Encoder
// ============================================================================

/// Renderer for one target's surface syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoder {
    /// GCC optimization flags.
    Gcc(GccEncoder),
    /// LLVM pass list.
    Llvm(LlvmEncoder),
    /// MySQL server configuration file.
    Mysql(MysqlEncoder),
}

impl Encoder {
    /// Renders the current values of `space`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] when the variant rejects the snapshot.
    pub fn encode(&self, space: &ConfigurationSpace) -> Result<EncodedConfiguration, EncodeError> {
        match self {
            Self::Gcc(encoder) => encoder.encode(space).map(EncodedConfiguration::Flags),
            Self::Llvm(encoder) => encoder.encode(space).map(EncodedConfiguration::Flags),
            Self::Mysql(encoder) => encoder.encode(space).map(EncodedConfiguration::ConfigFile),
        }
    }
}
