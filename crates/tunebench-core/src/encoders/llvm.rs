// crates/tunebench-core/src/encoders/llvm.rs
// ============================================================================
// Module: LLVM Pass Encoder
// Description: Renders enabled LLVM passes as `-<name>` arguments.
// Purpose: Keep analysis passes ahead of transforms unless an order is given.
// Dependencies: crate::{space, parameter}
// ============================================================================

//! ## Overview
//! Pass order matters to LLVM. Without an explicit order, every enabled
//! `Analysis` pass is emitted before every enabled `Transform` pass, each
//! group in name order. An explicit order is honored verbatim with disabled
//! passes dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::EncodeError;
use crate::parameter::ParameterScope;
use crate::space::ConfigurationSpace;

// ============================================================================
// SECTION: Encoder
// ============================================================================

/// LLVM pass list renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlvmEncoder {
    /// Explicit pass order, when provided by the caller.
    order: Option<Vec<String>>,
}

impl LlvmEncoder {
    /// Builds an encoder using the analysis-then-transform order.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            order: None,
        }
    }

    /// Builds an encoder that emits passes in the given order.
    #[must_use]
    pub const fn with_order(order: Vec<String>) -> Self {
        Self {
            order: Some(order),
        }
    }

    /// Renders enabled passes, space-separated.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::UnknownParameter`] when the explicit order
    /// names a pass that is not in the space.
    pub fn encode(&self, space: &ConfigurationSpace) -> Result<String, EncodeError> {
        let passes: Vec<String> = match &self.order {
            Some(order) => {
                let mut passes = Vec::with_capacity(order.len());
                for name in order {
                    let value = space.get(name).map_err(|_| EncodeError::UnknownParameter {
                        name: name.clone(),
                    })?;
                    if value.is_on() {
                        passes.push(format!("-{name}"));
                    }
                }
                passes
            }
            None => {
                let mut passes = Vec::new();
                for scope in [ParameterScope::Analysis, ParameterScope::Transform] {
                    passes.extend(
                        space
                            .parameters()
                            .filter(|spec| spec.has_scope(&scope) && spec.current_value().is_on())
                            .map(|spec| format!("-{}", spec.name())),
                    );
                }
                passes
            }
        };
        Ok(passes.join(" "))
    }
}
