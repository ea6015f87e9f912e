// crates/tunebench-core/src/lib.rs
// ============================================================================
// Module: tunebench Core Library
// Description: Public API surface for the tunable configuration space model.
// Purpose: Expose parameter, space, constraint, and encoder types.
// Dependencies: crate::{parameter, space, constraint, definition, encoders}
// ============================================================================

//! ## Overview
//! tunebench core models the tunable knobs of a benchmark target as a
//! configuration space. Every knob carries a typed legal range, and the space
//! guarantees that no current value ever falls outside it. Encoders render a
//! space snapshot into target-specific surface syntax: GCC flag strings, LLVM
//! pass lists, and MySQL `.cnf` files.
//!
//! The crate performs no I/O beyond optional definition loading and never
//! launches processes; the lifecycle runner consumes it through these types.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod constraint;
pub mod definition;
pub mod encoders;
pub mod error;
pub mod parameter;
pub mod quaternion;
pub mod space;
pub mod targets;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use constraint::ConstraintViolation;
pub use constraint::MysqlLogCapacity;
pub use constraint::SpaceConstraint;
pub use constraint::mysql_log_capacity_satisfied;
pub use definition::DefinitionError;
pub use definition::ParameterDefinition;
pub use definition::SpaceDefinition;
pub use encoders::EncodeError;
pub use encoders::EncodedConfiguration;
pub use encoders::Encoder;
pub use encoders::GccEncoder;
pub use encoders::LlvmEncoder;
pub use encoders::MysqlEncoder;
pub use error::SpaceError;
pub use parameter::ParameterDescription;
pub use parameter::ParameterKind;
pub use parameter::ParameterRange;
pub use parameter::ParameterScope;
pub use parameter::ParameterSpec;
pub use parameter::ParameterValue;
pub use quaternion::format_quaternion;
pub use quaternion::quaternion_table;
pub use space::ConfigurationSpace;
pub use space::DEFAULT_MAX_RANDOM_ATTEMPTS;
pub use targets::Target;
