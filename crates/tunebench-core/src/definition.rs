// crates/tunebench-core/src/definition.rs
// ============================================================================
// Module: Space Definitions
// Description: Declarative JSON definitions of tunable parameters.
// Purpose: Load knob catalogs with hard size limits and strict validation.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A space definition is a JSON object keyed by parameter name. Each entry
//! declares `type` (`enum` or `integer`), optional `enum_values`, `min`,
//! `max`, `default`, and `scope`. Entries with any other `type` become opaque
//! parameters. Unknown entry fields are ignored so catalogs may carry
//! documentation alongside the tunable data.
//!
//! Missing defaults fall back to `min` for integers and the first allowed
//! value for enums. Integer bounds are read as 128-bit values so unsigned
//! 64-bit catalog limits load; bounds outside the `i64` range saturate.
//! Definition files are read with a hard size limit and are rejected on
//! malformed JSON or invalid entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::parameter::ParameterKind;
use crate::parameter::ParameterScope;
use crate::parameter::ParameterSpec;
use crate::parameter::ParameterValue;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum definition file size in bytes.
pub const MAX_DEFINITION_BYTES: usize = 8 * 1024 * 1024;
/// Definition type label for enum parameters.
const TYPE_ENUM: &str = "enum";
/// Definition type label for integer parameters.
const TYPE_INTEGER: &str = "integer";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while loading or interpreting a space definition.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// Definition file could not be read.
    #[error("definition io error: {0}")]
    Io(String),
    /// Definition input exceeded the size limit.
    #[error("definition exceeds size limit ({max_bytes} bytes)")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
    },
    /// Definition JSON is malformed.
    #[error("definition parse error: {0}")]
    Parse(String),
    /// Entry is structurally invalid.
    #[error("invalid definition for {name}: {reason}")]
    InvalidEntry {
        /// Parameter name.
        name: String,
        /// Failure description.
        reason: String,
    },
    /// Integer bounds are inverted.
    #[error("invalid range for {name}: min {min} exceeds max {max}")]
    InvalidRange {
        /// Parameter name.
        name: String,
        /// Declared lower bound.
        min: i64,
        /// Declared upper bound.
        max: i64,
    },
    /// Enum declares no allowed values.
    #[error("enum parameter {name} declares no allowed values")]
    EmptyEnum {
        /// Parameter name.
        name: String,
    },
    /// Default value is outside the legal range.
    #[error("invalid default for {name}: {reason}")]
    InvalidDefault {
        /// Parameter name.
        name: String,
        /// Failure description.
        reason: String,
    },
    /// Two parameters share a name.
    #[error("duplicate parameter: {name}")]
    DuplicateParameter {
        /// Duplicated name.
        name: String,
    },
}

// ============================================================================
// SECTION: Definition Model
// ============================================================================

/// Declarative entry for a single parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Type label (`enum`, `integer`, or an opaque label).
    #[serde(rename = "type")]
    pub kind: String,
    /// Allowed values for enum parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<ParameterValue>>,
    /// Inclusive lower bound for integer parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i128>,
    /// Inclusive upper bound for integer parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i128>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParameterValue>,
    /// Scope tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl ParameterDefinition {
    /// Builds an integer entry.
    #[must_use]
    pub fn integer(min: i64, max: i64, default: Option<i64>) -> Self {
        Self {
            kind: TYPE_INTEGER.to_string(),
            enum_values: None,
            min: Some(i128::from(min)),
            max: Some(i128::from(max)),
            default: default.map(ParameterValue::Integer),
            scope: None,
        }
    }

    /// Builds an enum entry.
    #[must_use]
    pub fn enumeration(values: Vec<ParameterValue>, default: Option<ParameterValue>) -> Self {
        Self {
            kind: TYPE_ENUM.to_string(),
            enum_values: Some(values),
            min: None,
            max: None,
            default,
            scope: None,
        }
    }

    /// Builds an `ON`/`OFF` enum entry.
    #[must_use]
    pub fn boolean(default_on: bool) -> Self {
        let default = if default_on { ParameterValue::on() } else { ParameterValue::off() };
        Self::enumeration(vec![ParameterValue::on(), ParameterValue::off()], Some(default))
    }

    /// Returns the entry with the given scope tag.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Converts the entry into a validated parameter.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when required fields are missing, bounds
    /// are inverted, the enum is empty, or the default is illegal.
    pub fn to_spec(&self, name: &str) -> Result<ParameterSpec, DefinitionError> {
        let scope = self.scope.clone().map(ParameterScope::from);
        match self.kind.as_str() {
            TYPE_INTEGER => {
                let min = saturate(self.min.ok_or_else(|| missing(name, "min"))?);
                let max = saturate(self.max.ok_or_else(|| missing(name, "max"))?);
                let default = self.default.clone().unwrap_or(ParameterValue::Integer(min));
                ParameterSpec::new(
                    name,
                    ParameterKind::Integer {
                        min,
                        max,
                    },
                    scope,
                    default,
                )
            }
            TYPE_ENUM => {
                let allowed_values =
                    self.enum_values.clone().ok_or_else(|| missing(name, "enum_values"))?;
                let default = match &self.default {
                    Some(value) => value.clone(),
                    None => allowed_values.first().cloned().ok_or_else(|| {
                        DefinitionError::EmptyEnum {
                            name: name.to_string(),
                        }
                    })?,
                };
                ParameterSpec::new(
                    name,
                    ParameterKind::Enum {
                        allowed_values,
                    },
                    scope,
                    default,
                )
            }
            other => {
                let default = self.default.clone().ok_or_else(|| missing(name, "default"))?;
                ParameterSpec::new(
                    name,
                    ParameterKind::Opaque {
                        type_name: other.to_string(),
                    },
                    scope,
                    default,
                )
            }
        }
    }
}

/// Clamps a declared bound into the `i64` value range.
fn saturate(bound: i128) -> i64 {
    i64::try_from(bound).unwrap_or(if bound < 0 { i64::MIN } else { i64::MAX })
}

/// Builds a missing-field definition error.
fn missing(name: &str, field: &str) -> DefinitionError {
    DefinitionError::InvalidEntry {
        name: name.to_string(),
        reason: format!("missing field {field}"),
    }
}

/// Declarative catalog of parameters keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceDefinition {
    /// Entries keyed by parameter name.
    pub parameters: BTreeMap<String, ParameterDefinition>,
}

impl SpaceDefinition {
    /// Parses a definition from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the input exceeds the size limit or
    /// is not a JSON object of parameter entries.
    pub fn from_json_str(input: &str) -> Result<Self, DefinitionError> {
        if input.len() > MAX_DEFINITION_BYTES {
            return Err(DefinitionError::TooLarge {
                max_bytes: MAX_DEFINITION_BYTES,
            });
        }
        serde_json::from_str(input).map_err(|err| DefinitionError::Parse(err.to_string()))
    }

    /// Reads a definition file with a hard size limit.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when the file cannot be read, exceeds the
    /// size limit, is not UTF-8, or does not parse.
    pub fn from_path(path: &Path) -> Result<Self, DefinitionError> {
        let file = File::open(path).map_err(|err| DefinitionError::Io(err.to_string()))?;
        let limit = u64::try_from(MAX_DEFINITION_BYTES).unwrap_or(u64::MAX).saturating_add(1);
        let mut bytes = Vec::new();
        file.take(limit)
            .read_to_end(&mut bytes)
            .map_err(|err| DefinitionError::Io(err.to_string()))?;
        if bytes.len() > MAX_DEFINITION_BYTES {
            return Err(DefinitionError::TooLarge {
                max_bytes: MAX_DEFINITION_BYTES,
            });
        }
        let text = String::from_utf8(bytes)
            .map_err(|_| DefinitionError::Parse("definition must be utf-8".to_string()))?;
        Self::from_json_str(&text)
    }

    /// Adds or replaces an entry.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, entry: ParameterDefinition) -> Self {
        self.parameters.insert(name.into(), entry);
        self
    }

    /// Converts every entry into a validated parameter, in name order.
    ///
    /// # Errors
    ///
    /// Returns the first [`DefinitionError`] raised by an entry.
    pub fn to_specs(&self) -> Result<Vec<ParameterSpec>, DefinitionError> {
        self.parameters.iter().map(|(name, entry)| entry.to_spec(name)).collect()
    }
}
