// crates/tunebench-core/src/space.rs
// ============================================================================
// Module: Configuration Space
// Description: Name-ordered collection of tunable parameters and constraints.
// Purpose: Provide atomic updates, rejection sampling, and introspection.
// Dependencies: rand, crate::{parameter, constraint, definition}
// ============================================================================

//! ## Overview
//! A [`ConfigurationSpace`] owns every [`ParameterSpec`] of a target, keyed
//! and iterated by name, plus the cross-parameter constraints that apply to
//! the whole snapshot.
//!
//! Updates are staged: [`ConfigurationSpace::set_many`] validates every entry
//! and every constraint against a staged copy and commits only when all of
//! them pass, so a failing call leaves the space exactly as it was.
//! [`ConfigurationSpace::randomize_all`] draws whole-space samples until the
//! constraints hold or the attempt budget runs out.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;

use crate::constraint::ConstraintViolation;
use crate::constraint::SpaceConstraint;
use crate::definition::DefinitionError;
use crate::definition::SpaceDefinition;
use crate::error::SpaceError;
use crate::parameter::ParameterDescription;
use crate::parameter::ParameterScope;
use crate::parameter::ParameterSpec;
use crate::parameter::ParameterValue;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of whole-space samples drawn by `randomize_all`.
pub const DEFAULT_MAX_RANDOM_ATTEMPTS: usize = 1000;

// ============================================================================
// SECTION: Configuration Space
// ============================================================================

/// Tunable parameters of one target plus their cross-parameter constraints.
///
/// # Invariants
/// - Parameter names are unique; iteration is in name order.
/// - Every current value is legal for its parameter at every observable point.
/// - Failed updates and failed randomization leave all values unchanged.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationSpace {
    /// Parameters keyed by name.
    parameters: BTreeMap<String, ParameterSpec>,
    /// Constraints evaluated on every staged update.
    constraints: Vec<Arc<dyn SpaceConstraint>>,
}

impl ConfigurationSpace {
    /// Builds a space from validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateParameter`] when two parameters
    /// share a name.
    pub fn new(parameters: Vec<ParameterSpec>) -> Result<Self, DefinitionError> {
        let mut map = BTreeMap::new();
        for parameter in parameters {
            let name = parameter.name().to_string();
            if map.insert(name.clone(), parameter).is_some() {
                return Err(DefinitionError::DuplicateParameter {
                    name,
                });
            }
        }
        Ok(Self {
            parameters: map,
            constraints: Vec::new(),
        })
    }

    /// Builds a space from a declarative definition.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError`] when any entry is invalid.
    pub fn from_definition(definition: &SpaceDefinition) -> Result<Self, DefinitionError> {
        Self::new(definition.to_specs()?)
    }

    /// Returns the space with an additional constraint attached.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Arc<dyn SpaceConstraint>) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    /// Returns true when the space holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Returns true when the named parameter exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Iterates parameter names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    /// Iterates parameters in name order.
    pub fn parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.values()
    }

    /// Returns the attached constraints.
    #[must_use]
    pub fn constraints(&self) -> &[Arc<dyn SpaceConstraint>] {
        &self.constraints
    }

    /// Returns the named parameter.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::UnknownParameter`] when the name is absent.
    pub fn parameter(&self, name: &str) -> Result<&ParameterSpec, SpaceError> {
        self.parameters.get(name).ok_or_else(|| unknown(name))
    }

    /// Returns the current value of the named parameter.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::UnknownParameter`] when the name is absent.
    pub fn get(&self, name: &str) -> Result<&ParameterValue, SpaceError> {
        self.parameter(name).map(ParameterSpec::current_value)
    }

    /// Returns a snapshot copy of every current value.
    #[must_use]
    pub fn get_all(&self) -> BTreeMap<String, ParameterValue> {
        self.parameters
            .iter()
            .map(|(name, spec)| (name.clone(), spec.current_value().clone()))
            .collect()
    }

    /// Sets one parameter through the staged update path.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError`] when the name is unknown, the value is illegal,
    /// or the resulting snapshot breaks a constraint.
    pub fn set(&mut self, name: &str, value: ParameterValue) -> Result<(), SpaceError> {
        let mut knobs = BTreeMap::new();
        knobs.insert(name.to_string(), value);
        self.set_many(&knobs)
    }

    /// Sets several parameters atomically.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::UnknownParameter`], [`SpaceError::InvalidValue`],
    /// or [`SpaceError::ConstraintViolation`]; on any error no value changes.
    pub fn set_many(&mut self, knobs: &BTreeMap<String, ParameterValue>) -> Result<(), SpaceError> {
        let mut staged = self.get_all();
        for (name, value) in knobs {
            let canonical = self.parameter(name)?.normalize(value)?;
            staged.insert(name.clone(), canonical);
        }
        self.check_values(&staged)?;
        self.commit(&staged)
    }

    /// Restores the named parameter to its default.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::UnknownParameter`] when the name is absent.
    pub fn reset(&mut self, name: &str) -> Result<(), SpaceError> {
        self.parameters.get_mut(name).ok_or_else(|| unknown(name))?.reset();
        Ok(())
    }

    /// Restores every parameter to its default.
    pub fn reset_all(&mut self) {
        for spec in self.parameters.values_mut() {
            spec.reset();
        }
    }

    /// Draws whole-space samples until every constraint holds.
    ///
    /// Returns the number of samples drawn.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::UnsupportedOperation`] when a parameter cannot be
    /// sampled and [`SpaceError::ConstraintUnsatisfiable`] when `max_attempts`
    /// samples all break a constraint. The space is unchanged on error.
    pub fn randomize_all<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        max_attempts: usize,
    ) -> Result<usize, SpaceError> {
        let attempts = max_attempts.max(1);
        for attempt in 1 ..= attempts {
            let mut staged = BTreeMap::new();
            for (name, spec) in &self.parameters {
                staged.insert(name.clone(), spec.sample_random(rng)?);
            }
            if self.first_violation(&staged).is_none() {
                self.commit(&staged)?;
                return Ok(attempt);
            }
        }
        Err(SpaceError::ConstraintUnsatisfiable {
            attempts,
        })
    }

    /// Describes the named parameter.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::UnknownParameter`] when the name is absent.
    pub fn describe(&self, name: &str) -> Result<ParameterDescription, SpaceError> {
        self.parameter(name).map(ParameterSpec::describe)
    }

    /// Describes every parameter, keyed by name.
    #[must_use]
    pub fn describe_all(&self) -> BTreeMap<String, ParameterDescription> {
        self.parameters.iter().map(|(name, spec)| (name.clone(), spec.describe())).collect()
    }

    /// Returns true when the current snapshot satisfies every constraint.
    #[must_use]
    pub fn constraints_satisfied(&self) -> bool {
        self.first_violation(&self.get_all()).is_none()
    }

    /// Returns the first constraint violation of the current snapshot.
    #[must_use]
    pub fn constraint_violation(&self) -> Option<ConstraintViolation> {
        self.first_violation(&self.get_all())
    }

    /// Checks the current snapshot against every constraint.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::ConstraintViolation`] for the first failure.
    pub fn check_constraints(&self) -> Result<(), SpaceError> {
        self.check_values(&self.get_all())
    }

    /// Turns every non-`Param` enum knob that allows `ON` to `ON`.
    ///
    /// Returns the number of knobs switched on.
    ///
    /// # Errors
    ///
    /// Returns [`SpaceError::ConstraintViolation`] when the preset breaks a
    /// constraint; the space is unchanged in that case.
    pub fn set_all_on(&mut self) -> Result<usize, SpaceError> {
        let on = ParameterValue::on();
        let knobs: BTreeMap<String, ParameterValue> = self
            .parameters
            .values()
            .filter(|spec| !spec.has_scope(&ParameterScope::Param))
            .filter(|spec| spec.kind().is_enum() && spec.validate(&on).is_ok())
            .map(|spec| (spec.name().to_string(), on.clone()))
            .collect();
        let count = knobs.len();
        self.set_many(&knobs)?;
        Ok(count)
    }

    /// Replaces the upper bound of an integer parameter.
    pub(crate) fn override_integer_max(
        &mut self,
        name: &str,
        max: i64,
    ) -> Result<(), DefinitionError> {
        match self.parameters.get_mut(name) {
            Some(spec) => spec.set_integer_max(max),
            None => Err(DefinitionError::InvalidEntry {
                name: name.to_string(),
                reason: "parameter not present".to_string(),
            }),
        }
    }

    /// Returns the first constraint broken by a snapshot.
    fn first_violation(
        &self,
        values: &BTreeMap<String, ParameterValue>,
    ) -> Option<ConstraintViolation> {
        self.constraints.iter().find_map(|constraint| constraint.check(values).err())
    }

    /// Checks a snapshot against every constraint.
    fn check_values(&self, values: &BTreeMap<String, ParameterValue>) -> Result<(), SpaceError> {
        match self.first_violation(values) {
            Some(violation) => Err(SpaceError::ConstraintViolation(violation)),
            None => Ok(()),
        }
    }

    /// Assigns a fully validated snapshot.
    fn commit(&mut self, staged: &BTreeMap<String, ParameterValue>) -> Result<(), SpaceError> {
        for (name, value) in staged {
            if let Some(spec) = self.parameters.get_mut(name) {
                spec.set(value)?;
            }
        }
        Ok(())
    }
}

/// Builds an unknown-parameter error.
fn unknown(name: &str) -> SpaceError {
    SpaceError::UnknownParameter {
        name: name.to_string(),
    }
}
