// crates/tunebench-core/src/parameter.rs
// ============================================================================
// Module: Parameter Model
// Description: Typed tunable parameters with legal ranges and current values.
// Purpose: Enforce that a parameter's current value always satisfies its kind.
// Dependencies: rand, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`ParameterSpec`] couples a knob name with its [`ParameterKind`], an
//! optional [`ParameterScope`] tag, a default, and a current value. The
//! current value is only ever replaced through validation, so every
//! observable value is legal for the parameter's kind.
//!
//! Enum membership accepts values whose rendering matches an allowed value
//! (for example `Text("1")` against `Integer(1)`) and stores the allowed value
//! itself. Integer parameters accept decimal text and store the parsed integer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;

use crate::definition::DefinitionError;
use crate::error::SpaceError;

// ============================================================================
// SECTION: Values
// ============================================================================

/// Value held by a tunable parameter.
///
/// # Invariants
/// - Serialized untagged: integers as JSON numbers, text as JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Integer value.
    Integer(i64),
    /// Text value (enum labels such as `ON`/`OFF`).
    Text(String),
}

impl ParameterValue {
    /// Textual enum value that marks a boolean knob as enabled.
    pub const ON: &'static str = "ON";
    /// Textual enum value that marks a boolean knob as disabled.
    pub const OFF: &'static str = "OFF";

    /// Returns the value as an integer, parsing decimal text when needed.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Returns the value as text when it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Integer(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Returns true when the value is the `ON` label.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.as_text() == Some(Self::ON)
    }

    /// Builds the `ON` label value.
    #[must_use]
    pub fn on() -> Self {
        Self::Text(Self::ON.to_string())
    }

    /// Builds the `OFF` label value.
    #[must_use]
    pub fn off() -> Self {
        Self::Text(Self::OFF.to_string())
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// ============================================================================
// SECTION: Kinds and Scopes
// ============================================================================

/// Legal range of a tunable parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    /// Finite set of allowed values.
    Enum {
        /// Allowed values in declaration order.
        allowed_values: Vec<ParameterValue>,
    },
    /// Inclusive integer range.
    Integer {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// Unrecognized kind carried through from a definition; accepts any value.
    Opaque {
        /// Type label from the definition.
        type_name: String,
    },
}

impl ParameterKind {
    /// Returns the kind label used in descriptions and errors.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Enum {
                ..
            } => "enum",
            Self::Integer {
                ..
            } => "integer",
            Self::Opaque {
                type_name,
            } => type_name,
        }
    }

    /// Returns true for enum kinds.
    #[must_use]
    pub const fn is_enum(&self) -> bool {
        matches!(self, Self::Enum { .. })
    }

    /// Returns true for integer kinds.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Integer { .. })
    }
}

/// Scope tag attached to a parameter by the target that owns it.
///
/// # Invariants
/// - Serialized as its plain label; unknown labels round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParameterScope {
    /// GCC `--param`-style knob rendered as `-f<name>=<value>`.
    Param,
    /// GCC alignment knob encoded through the quaternion table.
    Align,
    /// LLVM analysis pass.
    Analysis,
    /// LLVM transform pass.
    Transform,
    /// Any other label.
    Other(String),
}

impl ParameterScope {
    /// Returns the scope label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Param => "Param",
            Self::Align => "Align",
            Self::Analysis => "Analysis",
            Self::Transform => "Transform",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for ParameterScope {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Param" => Self::Param,
            "Align" => Self::Align,
            "Analysis" => Self::Analysis,
            "Transform" => Self::Transform,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for ParameterScope {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<ParameterScope> for String {
    fn from(value: ParameterScope) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ParameterScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Descriptions
// ============================================================================

/// Legal range reported by [`ParameterSpec::describe`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterRange {
    /// Enumerated allowed values.
    Values {
        /// Allowed values in declaration order.
        values: Vec<ParameterValue>,
    },
    /// Inclusive integer bounds.
    Bounds {
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },
    /// No declared range.
    Unbounded,
}

/// Read-only summary of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescription {
    /// Parameter name.
    pub name: String,
    /// Kind label.
    pub kind: String,
    /// Scope label, when tagged.
    pub scope: Option<String>,
    /// Default value.
    pub default: ParameterValue,
    /// Current value.
    pub current: ParameterValue,
    /// Legal range.
    pub range: ParameterRange,
}

// ============================================================================
// SECTION: Parameter Spec
// ============================================================================

/// A single tunable parameter with its legal range and current value.
///
/// # Invariants
/// - `default_value` and `current_value` always satisfy `kind`.
/// - `current_value` changes only through [`ParameterSpec::set`],
///   [`ParameterSpec::randomize`], or [`ParameterSpec::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Unique parameter name.
    name: String,
    /// Legal range.
    kind: ParameterKind,
    /// Optional scope tag.
    scope: Option<ParameterScope>,
    /// Default value.
    default_value: ParameterValue,
    /// Current value.
    current_value: ParameterValue,
}

impl ParameterSpec {
    /// Builds a parameter whose current value starts at the default.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the kind is malformed (empty enum,
    /// inverted integer bounds) or the default is outside the legal range.
    pub fn new(
        name: impl Into<String>,
        kind: ParameterKind,
        scope: Option<ParameterScope>,
        default_value: ParameterValue,
    ) -> Result<Self, DefinitionError> {
        let name = name.into();
        match &kind {
            ParameterKind::Enum {
                allowed_values,
            } if allowed_values.is_empty() => {
                return Err(DefinitionError::EmptyEnum {
                    name,
                });
            }
            ParameterKind::Integer {
                min,
                max,
            } if min > max => {
                return Err(DefinitionError::InvalidRange {
                    name,
                    min: *min,
                    max: *max,
                });
            }
            _ => {}
        }
        let default_value =
            normalize(&name, &kind, &default_value).map_err(|err| invalid_default(&name, &err))?;
        Ok(Self {
            name,
            kind,
            scope,
            current_value: default_value.clone(),
            default_value,
        })
    }

    /// Builds an `ON`/`OFF` enum parameter.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the default is not `ON` or `OFF`.
    pub fn boolean(
        name: impl Into<String>,
        scope: Option<ParameterScope>,
        default_value: ParameterValue,
    ) -> Result<Self, DefinitionError> {
        Self::new(
            name,
            ParameterKind::Enum {
                allowed_values: vec![ParameterValue::on(), ParameterValue::off()],
            },
            scope,
            default_value,
        )
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameter kind.
    #[must_use]
    pub const fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    /// Returns the scope tag, if any.
    #[must_use]
    pub const fn scope(&self) -> Option<&ParameterScope> {
        self.scope.as_ref()
    }

    /// Returns the default value.
    #[must_use]
    pub const fn default_value(&self) -> &ParameterValue {
        &self.default_value
    }

    /// Returns the current value.
    #[must_use]
    pub const fn current_value(&self) -> &ParameterValue {
        &self.current_value
    }

    /// Returns true when the parameter carries the given scope.
    #[must_use]
    pub fn has_scope(&self, scope: &ParameterScope) -> bool {
        self.scope.as_ref() == Some(scope)
    }

    /// Checks a candidate value against the legal range.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidValue`] when the value is not legal.
    pub fn validate(&self, value: &ParameterValue) -> Result<(), SpaceError> {
        self.normalize(value).map(drop)
    }

    /// Returns the canonical stored form of a legal value.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidValue`] when the value is not legal.
    pub fn normalize(&self, value: &ParameterValue) -> Result<ParameterValue, SpaceError> {
        normalize(&self.name, &self.kind, value)
    }

    /// Validates and assigns a new current value.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::InvalidValue`] and leaves the value unchanged
    /// when the candidate is not legal.
    pub fn set(&mut self, value: &ParameterValue) -> Result<(), SpaceError> {
        self.current_value = self.normalize(value)?;
        Ok(())
    }

    /// Draws a uniformly distributed legal value without assigning it.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::UnsupportedOperation`] for opaque kinds.
    pub fn sample_random<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<ParameterValue, SpaceError> {
        match &self.kind {
            ParameterKind::Enum {
                allowed_values,
            } => {
                allowed_values.choose(rng).cloned().ok_or_else(|| self.unsupported("sample_random"))
            }
            ParameterKind::Integer {
                min,
                max,
            } => Ok(ParameterValue::Integer(rng.gen_range(*min ..= *max))),
            ParameterKind::Opaque {
                ..
            } => Err(self.unsupported("sample_random")),
        }
    }

    /// Assigns a uniformly distributed legal value.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::UnsupportedOperation`] for opaque kinds.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SpaceError> {
        self.current_value = self.sample_random(rng)?;
        Ok(())
    }

    /// Restores the default value.
    pub fn reset(&mut self) {
        self.current_value = self.default_value.clone();
    }

    /// Returns a read-only summary of the parameter.
    #[must_use]
    pub fn describe(&self) -> ParameterDescription {
        let range = match &self.kind {
            ParameterKind::Enum {
                allowed_values,
            } => ParameterRange::Values {
                values: allowed_values.clone(),
            },
            ParameterKind::Integer {
                min,
                max,
            } => ParameterRange::Bounds {
                min: *min,
                max: *max,
            },
            ParameterKind::Opaque {
                ..
            } => ParameterRange::Unbounded,
        };
        ParameterDescription {
            name: self.name.clone(),
            kind: self.kind.label().to_string(),
            scope: self.scope.as_ref().map(ToString::to_string),
            default: self.default_value.clone(),
            current: self.current_value.clone(),
            range,
        }
    }

    /// Replaces the upper bound of an integer parameter.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the parameter is not an integer, the
    /// new bound is below the minimum, or the default no longer fits.
    pub(crate) fn set_integer_max(&mut self, new_max: i64) -> Result<(), DefinitionError> {
        let ParameterKind::Integer {
            min,
            ..
        } = self.kind
        else {
            return Err(DefinitionError::InvalidEntry {
                name: self.name.clone(),
                reason: format!("expected integer kind, found {}", self.kind.label()),
            });
        };
        if new_max < min {
            return Err(DefinitionError::InvalidRange {
                name: self.name.clone(),
                min,
                max: new_max,
            });
        }
        let kind = ParameterKind::Integer {
            min,
            max: new_max,
        };
        normalize(&self.name, &kind, &self.default_value)
            .map_err(|err| invalid_default(&self.name, &err))?;
        self.kind = kind;
        if normalize(&self.name, &self.kind, &self.current_value).is_err() {
            self.reset();
        }
        Ok(())
    }

    /// Builds an unsupported-operation error for this parameter.
    fn unsupported(&self, operation: &'static str) -> SpaceError {
        SpaceError::UnsupportedOperation {
            name: self.name.clone(),
            kind: self.kind.label().to_string(),
            operation,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a value against a kind and returns its canonical form.
fn normalize(
    name: &str,
    kind: &ParameterKind,
    value: &ParameterValue,
) -> Result<ParameterValue, SpaceError> {
    match kind {
        ParameterKind::Enum {
            allowed_values,
        } => {
            let rendered = value.to_string();
            allowed_values
                .iter()
                .find(|allowed| *allowed == value || allowed.to_string() == rendered)
                .cloned()
                .ok_or_else(|| SpaceError::InvalidValue {
                    name: name.to_string(),
                    value: rendered,
                    constraint: format!("must be one of [{}]", render_list(allowed_values)),
                })
        }
        ParameterKind::Integer {
            min,
            max,
        } => {
            let Some(number) = value.as_integer() else {
                return Err(SpaceError::InvalidValue {
                    name: name.to_string(),
                    value: value.to_string(),
                    constraint: "must be an integer".to_string(),
                });
            };
            if number < *min || number > *max {
                return Err(SpaceError::InvalidValue {
                    name: name.to_string(),
                    value: number.to_string(),
                    constraint: format!("must be between {min} and {max}"),
                });
            }
            Ok(ParameterValue::Integer(number))
        }
        ParameterKind::Opaque {
            ..
        } => Ok(value.clone()),
    }
}

/// Maps a default-value validation failure onto a definition error.
fn invalid_default(name: &str, err: &SpaceError) -> DefinitionError {
    DefinitionError::InvalidDefault {
        name: name.to_string(),
        reason: err.to_string(),
    }
}

/// Renders a comma-separated value list.
fn render_list(values: &[ParameterValue]) -> String {
    values.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
